#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

//! Reverse-proxy request authentication for enterprise applications.
//!
//! An upstream reverse proxy asserts the caller's username in a cookie; this
//! crate decides, per request, whether the identity bound to the request
//! comes from the host's existing session, from the proxy assertion resolved
//! against a user directory, or is absent (in which case the host starts its
//! usual login flow). The host's native paths stay intact: a valid session
//! always wins, and credential-based login passes through untouched.

pub mod auth;
pub mod configuration;
pub mod directory;
pub mod identity;
pub mod secret;
pub mod session;
pub mod tracing_helper;

pub use auth::{CookieExt, ProxyAuthenticator, PROXY_COOKIE_NAME};
pub use configuration::Configuration;
pub use directory::UserDirectory;
pub use identity::Identity;
pub use secret::Secret;
pub use session::SessionAuthenticator;
