use std::sync::{Arc, LazyLock};

use hyper::http::request::Parts;
use prometheus::{register_int_counter_vec, IntCounterVec};
use tracing::{debug, error, instrument, warn};

use super::assertion;
use crate::configuration::ProxyConfig;
use crate::directory::UserDirectory;
use crate::identity::Identity;
use crate::session::{self, SessionAuthenticator};

static AUTH_DECISIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "auth_decisions_total",
        "Total request authentication decisions",
        &["source", "result"]
    )
    .expect("Failed to register auth_decisions metric")
});

/// Per-request authentication decision between the host's session and the
/// reverse proxy's identity assertion.
///
/// Holds no state across requests; safe to share between concurrently
/// handled requests.
pub struct ProxyAuthenticator {
    config: ProxyConfig,
    session: Arc<dyn SessionAuthenticator>,
    directory: Arc<dyn UserDirectory>,
}

impl ProxyAuthenticator {
    pub fn new(
        config: &ProxyConfig,
        session: Arc<dyn SessionAuthenticator>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            config: config.clone(),
            session,
            directory,
        }
    }

    /// Decide which identity, if any, is bound to this request.
    ///
    /// An existing session always wins, even over a mismatching proxy
    /// assertion; without a session the asserted username is resolved
    /// against the directory; with neither, `Ok(None)` tells the host to
    /// start its login flow. Directory faults degrade to `Ok(None)` for the
    /// request; session faults propagate unchanged.
    #[instrument(skip(self, parts), fields(auth_source = tracing::field::Empty))]
    pub async fn authenticate_request(
        &self,
        parts: &Parts,
    ) -> Result<Option<Identity>, session::Error> {
        let asserted_username =
            assertion::proxy_username(parts, self.config.log_decoded_assertions);

        let session_identity = self.session.authenticated_identity(parts).await?;

        let asserted_identity = match &asserted_username {
            Some(username) => self.resolve(username).await,
            None => None,
        };

        match (session_identity, asserted_username) {
            (None, None) => {
                debug!("No session and no proxy assertion");
                tracing::Span::current().record("auth_source", "anonymous");
                Ok(None)
            }
            (Some(identity), asserted_username) => {
                if let Some(username) = asserted_username {
                    if identity.username != username {
                        warn!(
                            "Different user already logged in, keeping session user: {}",
                            identity.username
                        );
                    }
                }
                tracing::Span::current().record("auth_source", "session");
                AUTH_DECISIONS
                    .with_label_values(&["session", "success"])
                    .inc();
                Ok(Some(identity))
            }
            (None, Some(username)) => {
                tracing::Span::current().record("auth_source", "proxy");
                match asserted_identity {
                    Some(identity) => {
                        debug!("Accepted proxy-asserted user {username}");
                        AUTH_DECISIONS.with_label_values(&["proxy", "success"]).inc();
                        Ok(Some(identity))
                    }
                    None => {
                        AUTH_DECISIONS.with_label_values(&["proxy", "failed"]).inc();
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn resolve(&self, username: &str) -> Option<Identity> {
        match self.directory.lookup_by_username(username).await {
            Ok(Some(identity)) => Some(identity),
            Ok(None) => {
                debug!("Proxy-asserted user {username} not found in directory");
                None
            }
            Err(e) => {
                error!("Directory lookup failed for proxy-asserted user: {e}");
                None
            }
        }
    }

    /// Unmodified pass-through to the host's credential check, so existing
    /// credential-based login keeps working beside the proxy path.
    pub async fn authenticate_credentials(
        &self,
        identity: &Identity,
        secret: &str,
    ) -> Result<bool, session::Error> {
        self.session.authenticate_credentials(identity, secret).await
    }
}
