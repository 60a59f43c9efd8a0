use std::collections::HashMap;

use argon2::password_hash::PasswordHashString;
use argon2::{Argon2, PasswordVerifier};
use async_trait::async_trait;
use hyper::http::request::Parts;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{Error, SessionAuthenticator};
use crate::auth::assertion::CookieExt;
use crate::configuration::IdentityConfig;
use crate::identity::Identity;

/// Name of the cookie carrying the native session token.
pub static SESSION_COOKIE_NAME: &str = "_gate_session";

/// Reference implementation of the host authentication mechanism: an
/// in-memory session store keyed by opaque tokens, plus argon2 credential
/// verification against the configured identity table.
///
/// The host opens a session after a successful credential login and puts the
/// returned token in the session cookie of its response; from then on
/// [`SessionAuthenticator::authenticated_identity`] recognizes the request.
pub struct Backend {
    credentials: HashMap<String, PasswordHashString>,
    sessions: RwLock<HashMap<String, Identity>>,
}

fn build_credentials(
    identities: &HashMap<String, IdentityConfig>,
) -> HashMap<String, PasswordHashString> {
    let mut credentials = HashMap::new();
    for config in identities.values() {
        let Some(password) = &config.password else {
            continue;
        };

        let password_hash = match PasswordHashString::new(password) {
            Ok(hash) => hash,
            Err(err) => {
                warn!("Invalid password hash for user {}: {err}", config.username);
                continue;
            }
        };

        credentials.insert(config.username.clone(), password_hash);
    }

    credentials
}

impl Backend {
    pub fn new(identities: &HashMap<String, IdentityConfig>) -> Self {
        Self {
            credentials: build_credentials(identities),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Bind `identity` to a fresh session token and return the token.
    pub async fn open_session(&self, identity: Identity) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone(), identity);
        token
    }

    /// Drop the session for `token`. Unknown tokens are a no-op.
    pub async fn close_session(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    #[instrument(skip(self, secret))]
    fn verify_credentials(&self, username: &str, secret: &str) -> bool {
        let Some(password_hash) = self.credentials.get(username) else {
            debug!("Username not found in credentials");
            return false;
        };

        let password_hash = password_hash.password_hash();

        match Argon2::default().verify_password(secret.as_bytes(), &password_hash) {
            Ok(()) => true,
            Err(error) => {
                debug!("Password verification failed: {error}");
                false
            }
        }
    }
}

#[async_trait]
impl SessionAuthenticator for Backend {
    async fn authenticated_identity(&self, parts: &Parts) -> Result<Option<Identity>, Error> {
        let Some(token) = parts.cookie(SESSION_COOKIE_NAME) else {
            return Ok(None);
        };

        Ok(self.sessions.read().await.get(&token).cloned())
    }

    async fn authenticate_credentials(
        &self,
        identity: &Identity,
        secret: &str,
    ) -> Result<bool, Error> {
        Ok(self.verify_credentials(&identity.username, secret))
    }
}
