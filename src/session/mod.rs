pub mod native;

use std::fmt;

use async_trait::async_trait;
use hyper::http::request::Parts;

use crate::identity::Identity;

/// Session-layer fault. The decision logic does not suppress these: they
/// surface to the host with whatever failure policy its session mechanism
/// defines.
#[derive(Debug)]
pub enum Error {
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Internal(err) => write!(f, "Session layer error: {err}"),
        }
    }
}

/// The host's native authentication mechanism: session inspection plus the
/// credential check used by non-proxy login paths.
///
/// The host injects its implementation at construction; [`native::Backend`]
/// is the in-process reference implementation.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Identity already bound to this request by the host's session layer,
    /// if any. The host mechanism may perform its own cookie or credential
    /// checks here, unrelated to the proxy assertion.
    async fn authenticated_identity(&self, parts: &Parts) -> Result<Option<Identity>, Error>;

    /// Verify a login secret for `identity`. Pass-through for the host's
    /// credential-based login; the proxy path never calls it.
    async fn authenticate_credentials(
        &self,
        identity: &Identity,
        secret: &str,
    ) -> Result<bool, Error>;
}
