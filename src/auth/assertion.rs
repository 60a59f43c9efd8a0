use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hyper::header::COOKIE;
use hyper::http::request::Parts;
use tracing::{debug, warn};

/// Name of the cookie the reverse proxy uses to assert the caller's
/// username.
///
/// The value is standard base64 of the plain username. That encoding is an
/// obfuscation layer, not a security boundary: nothing here verifies a
/// signature, so the deployment must guarantee that only the reverse proxy
/// can reach the application to set this cookie. Where that network
/// isolation cannot be guaranteed, the assertion needs to be signed upstream
/// and verified before it is trusted.
pub static PROXY_COOKIE_NAME: &str = "_oauthproxy";

/// Cookie access on a request's [`Parts`].
pub trait CookieExt {
    /// All `Cookie` header pairs, in header order. Pairs without a `=` are
    /// skipped; only the first `=` splits name from value.
    fn cookies(&self) -> Vec<(String, String)>;

    /// Value of the first cookie whose name matches `name` exactly
    /// (case-sensitive).
    fn cookie(&self, name: &str) -> Option<String>;
}

impl CookieExt for Parts {
    fn cookies(&self) -> Vec<(String, String)> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim_start().split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies()
            .into_iter()
            .find(|(cookie_name, _)| cookie_name == name)
            .map(|(_, value)| value)
    }
}

/// Decode the proxy-asserted username out of `cookies`.
///
/// The decoded string is returned unmodified. A missing cookie yields
/// `None`; an undecodable value is logged at warning level and yields `None`
/// rather than failing the request.
pub fn extract(cookies: &[(String, String)], log_decoded: bool) -> Option<String> {
    let (_, value) = cookies.iter().find(|(name, _)| name == PROXY_COOKIE_NAME)?;

    let decoded = match BASE64_STANDARD.decode(value) {
        Ok(decoded) => decoded,
        Err(error) => {
            warn!("Malformed proxy assertion cookie: {error}");
            return None;
        }
    };

    match String::from_utf8(decoded) {
        Ok(username) => {
            if log_decoded {
                debug!("Proxy assertion cookie value: {value}, decoded: {username}");
            }
            Some(username)
        }
        Err(error) => {
            warn!("Proxy assertion cookie is not valid UTF-8: {error}");
            None
        }
    }
}

/// Extract the proxy-asserted username straight off request [`Parts`].
pub fn proxy_username(parts: &Parts, log_decoded: bool) -> Option<String> {
    extract(&parts.cookies(), log_decoded)
}

#[cfg(test)]
mod tests {
    use hyper::Request;

    use super::*;

    fn request_parts(cookie_headers: &[&str]) -> Parts {
        let mut builder = Request::builder();
        for header in cookie_headers {
            builder = builder.header(COOKIE, *header);
        }
        let request = builder.body(()).unwrap();
        let (parts, ()) = request.into_parts();
        parts
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn test_cookies_single_header() {
        let parts = request_parts(&["a=1; b=2"]);

        let cookies = parts.cookies();
        assert_eq!(cookies, pairs(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_cookies_multiple_headers() {
        let parts = request_parts(&["a=1", "b=2; c=3"]);

        let cookies = parts.cookies();
        assert_eq!(cookies, pairs(&[("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn test_cookies_value_may_contain_equals() {
        let parts = request_parts(&["token=dXNlcg==; a=1"]);

        let cookies = parts.cookies();
        assert_eq!(cookies, pairs(&[("token", "dXNlcg=="), ("a", "1")]));
    }

    #[test]
    fn test_cookies_skips_malformed_pairs() {
        let parts = request_parts(&["no-equals-here; a=1"]);

        let cookies = parts.cookies();
        assert_eq!(cookies, pairs(&[("a", "1")]));
    }

    #[test]
    fn test_cookies_no_header() {
        let parts = request_parts(&[]);

        assert!(parts.cookies().is_empty());
    }

    #[test]
    fn test_cookie_exact_name_match() {
        let parts = request_parts(&["session=1; Session=2"]);

        assert_eq!(parts.cookie("session"), Some("1".to_string()));
        assert_eq!(parts.cookie("Session"), Some("2".to_string()));
        assert_eq!(parts.cookie("SESSION"), None);
    }

    #[test]
    fn test_extract_well_formed_assertion() {
        let encoded = BASE64_STANDARD.encode("carol");
        let cookies = pairs(&[(PROXY_COOKIE_NAME, encoded.as_str())]);

        let username = extract(&cookies, false);
        assert_eq!(username, Some("carol".to_string()));
    }

    #[test]
    fn test_extract_returns_value_unmodified() {
        let encoded = BASE64_STANDARD.encode("  carol \n");
        let cookies = pairs(&[(PROXY_COOKIE_NAME, encoded.as_str())]);

        let username = extract(&cookies, false);
        assert_eq!(username, Some("  carol \n".to_string()));
    }

    #[test]
    fn test_extract_missing_cookie() {
        let cookies = pairs(&[("unrelated", "dXNlcg==")]);

        assert_eq!(extract(&cookies, false), None);
    }

    #[test]
    fn test_extract_empty_cookie_set() {
        assert_eq!(extract(&[], false), None);
    }

    #[test]
    fn test_extract_cookie_name_is_case_sensitive() {
        let encoded = BASE64_STANDARD.encode("carol");
        let cookies = pairs(&[("_OauthProxy", encoded.as_str())]);

        assert_eq!(extract(&cookies, false), None);
    }

    #[test]
    fn test_extract_malformed_base64() {
        let cookies = pairs(&[(PROXY_COOKIE_NAME, "not-valid-base64!!!")]);

        assert_eq!(extract(&cookies, false), None);
    }

    #[test]
    fn test_extract_invalid_utf8_payload() {
        let encoded = BASE64_STANDARD.encode([0xFF, 0xFE, 0xFD]);
        let cookies = pairs(&[(PROXY_COOKIE_NAME, encoded.as_str())]);

        assert_eq!(extract(&cookies, false), None);
    }

    #[test]
    fn test_extract_first_match_wins() {
        let first = BASE64_STANDARD.encode("carol");
        let second = BASE64_STANDARD.encode("dave");
        let cookies = pairs(&[
            (PROXY_COOKIE_NAME, first.as_str()),
            (PROXY_COOKIE_NAME, second.as_str()),
        ]);

        assert_eq!(extract(&cookies, false), Some("carol".to_string()));
    }

    #[test]
    fn test_proxy_username_from_parts() {
        let encoded = BASE64_STANDARD.encode("carol");
        let header = format!("a=1; {PROXY_COOKIE_NAME}={encoded}");
        let parts = request_parts(&[header.as_str()]);

        assert_eq!(proxy_username(&parts, false), Some("carol".to_string()));
    }
}
