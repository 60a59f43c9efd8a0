use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::{Error, UserDirectory};
use crate::configuration::IdentityConfig;
use crate::identity::Identity;

/// Directory backend serving the identity records of the configuration's
/// `[identity]` table.
#[derive(Debug)]
pub struct Backend {
    users: HashMap<String, Identity>,
}

fn build_records(identities: &HashMap<String, IdentityConfig>) -> HashMap<String, Identity> {
    let mut records = HashMap::new();
    for (id, config) in identities {
        let identity = Identity {
            id: id.clone(),
            username: config.username.clone(),
            display_name: config.display_name.clone(),
        };
        records.insert(config.username.clone(), identity);
    }
    records
}

impl Backend {
    pub fn new(identities: &HashMap<String, IdentityConfig>) -> Self {
        Self {
            users: build_records(identities),
        }
    }
}

#[async_trait]
impl UserDirectory for Backend {
    async fn lookup_by_username(&self, username: &str) -> Result<Option<Identity>, Error> {
        let identity = self.users.get(username).cloned();
        if identity.is_none() {
            debug!("Username not found in directory");
        }
        Ok(identity)
    }
}
