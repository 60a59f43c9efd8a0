use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

mod error;

pub use error::Error;

use crate::directory;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub directory: directory::Config,
    #[serde(default)]
    pub identity: HashMap<String, IdentityConfig>, // hashmap of identity_id <-> identity record
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProxyConfig {
    /// Also log the raw and decoded assertion cookie values. Decoded
    /// usernames are sensitive, keep this off outside development.
    #[serde(default)]
    pub log_decoded_assertions: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdentityConfig {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Argon2 hash (PHC string) for the credential-based login path.
    /// Identities without one still resolve through the memory directory but
    /// cannot log in with a password.
    #[serde(default)]
    pub password: Option<String>,
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        Ok(toml::from_str(slice)?)
    }
}
