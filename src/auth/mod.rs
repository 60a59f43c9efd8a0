pub mod assertion;
pub mod authenticator;

pub use assertion::{CookieExt, PROXY_COOKIE_NAME};
pub use authenticator::ProxyAuthenticator;
