//! Basic credentials for proxy-layer authentication

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::HeaderValue;

use crate::error::{FetchError, Result};

/// Character encoding applied to `login:password` before base64
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl CredentialEncoding {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
        }
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        FetchError::Credentials(format!("{:?} is not representable in latin-1", c))
                    })
                })
                .collect(),
        }
    }
}

/// Username/password pair sent as `Proxy-Authorization: Basic ...`
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    login: String,
    password: String,
    encoding: CredentialEncoding,
}

impl BasicAuth {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_encoding(login, password, CredentialEncoding::Utf8)
    }

    pub fn with_encoding(
        login: impl Into<String>,
        password: impl Into<String>,
        encoding: CredentialEncoding,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            encoding,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn encoding(&self) -> CredentialEncoding {
        self.encoding
    }

    /// Render the full header value, e.g. `Basic dXNlcjpwYXNz`
    pub fn encode(&self) -> Result<String> {
        // A colon in the login would shift the user/password boundary.
        if self.login.contains(':') {
            return Err(FetchError::Credentials(
                "login must not contain ':'".to_string(),
            ));
        }

        let raw = self
            .encoding
            .encode(&format!("{}:{}", self.login, self.password))?;
        Ok(format!("Basic {}", BASE64.encode(raw)))
    }

    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.encode()?)
            .map_err(|e| FetchError::Credentials(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("encoding", &self.encoding)
            .finish()
    }
}
