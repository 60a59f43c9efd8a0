pub mod http;
pub mod memory;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::configuration::IdentityConfig;
use crate::identity::Identity;

#[derive(Debug)]
pub enum Error {
    Initialization(String),
    Transport(String),
    InvalidRecord(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Initialization(err) => write!(f, "Directory initialization error: {err}"),
            Error::Transport(err) => write!(f, "Directory transport error: {err}"),
            Error::InvalidRecord(err) => write!(f, "Invalid directory record: {err}"),
        }
    }
}

/// The user directory seam: maps usernames to identity records.
///
/// Implementations may block on network or database I/O; timeout policy is
/// theirs to enforce. Callers are expected to degrade a per-request fault to
/// "unauthenticated" rather than fail the request pipeline.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve `username` to its identity record, `Ok(None)` when the
    /// directory does not know the username.
    async fn lookup_by_username(&self, username: &str) -> Result<Option<Identity>, Error>;
}

#[derive(Clone, Debug, Default, Deserialize)]
pub enum Config {
    #[default]
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "http")]
    Http(http::BackendConfig),
}

impl Config {
    pub fn to_backend(
        &self,
        identities: &HashMap<String, IdentityConfig>,
    ) -> Result<Arc<dyn UserDirectory>, Error> {
        match self {
            Config::Memory => Ok(Arc::new(memory::Backend::new(identities))),
            Config::Http(config) => Ok(Arc::new(http::Backend::new(config)?)),
        }
    }
}
