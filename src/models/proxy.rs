use serde::{Deserialize, Serialize};

use crate::client::BasicAuth;
use crate::error::{FetchError, Result};

/// Scheme assumed for entries written as `host:port:user:pass`
pub const DEFAULT_SCHEME: &str = "http";

const SCHEME_DELIMITER: &str = "://";

/// Proxy protocol type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks5,
    Socks5h,
}

impl ProxyProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
            ProxyProtocol::Socks5h => "socks5h",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "http" => Some(ProxyProtocol::Http),
            "https" => Some(ProxyProtocol::Https),
            "socks5" => Some(ProxyProtocol::Socks5),
            "socks5h" => Some(ProxyProtocol::Socks5h),
            _ => None,
        }
    }

    pub fn is_socks(&self) -> bool {
        matches!(self, ProxyProtocol::Socks5 | ProxyProtocol::Socks5h)
    }
}

impl std::fmt::Display for ProxyProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed proxy entry: where to connect and how to authenticate.
///
/// Built fresh from a raw line on every selection; nothing caches it.
/// Serializes without the password, so the JSON form is safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyCredential {
    /// `scheme://host:port`
    pub endpoint: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
}

impl ProxyCredential {
    /// Parse a `[scheme://]host:port:username:password` line.
    ///
    /// Only the first four colon-separated segments are used, so a password
    /// containing `:` is cut at its first colon.
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim_end_matches(['\r', '\n']);

        let (scheme, rest) = entry
            .split_once(SCHEME_DELIMITER)
            .unwrap_or((DEFAULT_SCHEME, entry));

        let parts: Vec<&str> = rest.split(':').collect();
        if parts.len() < 4 {
            return Err(FetchError::InvalidProxyFormat(entry.to_string()));
        }

        Ok(Self {
            endpoint: format!("{}://{}:{}", scheme, parts[0], parts[1]),
            username: parts[2].to_string(),
            password: parts[3].to_string(),
        })
    }

    /// Scheme portion of the endpoint
    pub fn scheme(&self) -> &str {
        self.endpoint
            .split_once(SCHEME_DELIMITER)
            .map(|(scheme, _)| scheme)
            .unwrap_or(DEFAULT_SCHEME)
    }

    pub fn protocol(&self) -> Option<ProxyProtocol> {
        ProxyProtocol::from_str(self.scheme())
    }

    /// Basic credentials for the proxy layer, UTF-8 encoded
    pub fn basic_auth(&self) -> BasicAuth {
        BasicAuth::new(&self.username, &self.password)
    }

    /// Consume into the `(endpoint, username, password)` triple
    pub fn into_parts(self) -> (String, String, String) {
        (self.endpoint, self.username, self.password)
    }
}

impl std::fmt::Display for ProxyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (user {})", self.endpoint, self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_scheme() {
        let cred = ProxyCredential::parse("socks5://10.0.0.1:1080:alice:secret").unwrap();
        assert_eq!(
            cred.into_parts(),
            (
                "socks5://10.0.0.1:1080".to_string(),
                "alice".to_string(),
                "secret".to_string()
            )
        );
    }

    #[test]
    fn test_parse_defaults_to_http() {
        let cred = ProxyCredential::parse("proxy.example.com:3128:bob:pw").unwrap();
        assert_eq!(cred.endpoint, "http://proxy.example.com:3128");
        assert_eq!(cred.scheme(), "http");
        assert_eq!(cred.protocol(), Some(ProxyProtocol::Http));
    }

    #[test]
    fn test_parse_tolerates_line_endings() {
        let cred = ProxyCredential::parse("1.2.3.4:80:u:p\r\n").unwrap();
        assert_eq!(cred.password, "p");

        let cred = ProxyCredential::parse("1.2.3.4:80:u:p\n").unwrap();
        assert_eq!(cred.password, "p");
    }

    #[test]
    fn test_parse_ignores_extra_segments() {
        let cred = ProxyCredential::parse("https://h:443:user:pa:ss:word").unwrap();
        assert_eq!(cred.endpoint, "https://h:443");
        assert_eq!(cred.username, "user");
        assert_eq!(cred.password, "pa");
    }

    #[test]
    fn test_parse_rejects_short_entries() {
        for entry in ["", "host", "host:80", "host:80:user", "http://host:80:user"] {
            let err = ProxyCredential::parse(entry).unwrap_err();
            assert!(
                matches!(err, FetchError::InvalidProxyFormat(_)),
                "expected format error for {:?}",
                entry
            );
        }
    }

    #[test]
    fn test_scheme_split_happens_once() {
        // Only the first delimiter separates the scheme.
        let cred = ProxyCredential::parse("http://a://b:1:u:p").unwrap();
        assert_eq!(cred.scheme(), "http");
        assert_eq!(cred.endpoint, "http://a://b");
        assert_eq!(cred.username, "1");
        assert_eq!(cred.password, "u");
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!(ProxyProtocol::from_str("SOCKS5"), Some(ProxyProtocol::Socks5));
        assert_eq!(ProxyProtocol::from_str("socks5h"), Some(ProxyProtocol::Socks5h));
        assert_eq!(ProxyProtocol::from_str("ftp"), None);
        assert!(ProxyProtocol::Socks5h.is_socks());
        assert!(!ProxyProtocol::Https.is_socks());
    }

    #[test]
    fn test_json_form_omits_password() {
        let cred = ProxyCredential::parse("socks5://h:1080:user:hunter2").unwrap();
        let encoded = serde_json::to_string(&cred).unwrap();
        assert_eq!(encoded, r#"{"endpoint":"socks5://h:1080","username":"user"}"#);

        let decoded: ProxyCredential = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.endpoint, cred.endpoint);
        assert_eq!(decoded.username, cred.username);
        assert!(decoded.password.is_empty());
    }

    #[test]
    fn test_display_hides_password() {
        let cred = ProxyCredential::parse("h:1:user:hunter2").unwrap();
        let shown = cred.to_string();
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }
}
