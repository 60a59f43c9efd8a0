use serde::{Deserialize, Serialize};

/// A directory-backed user identity bound to a request.
///
/// Beyond the stable identifier and username the record is opaque to the
/// authentication decision; hosts with richer user profiles keep them behind
/// their own directory implementation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            display_name: None,
        }
    }
}
