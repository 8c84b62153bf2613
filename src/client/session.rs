//! Short-lived client sessions
//!
//! A session is one `reqwest::Client` bound to a fixed set of transport options
//! (proxy, proxy auth, default headers and cookies). It is opened for a single
//! request and released when closed or dropped, whichever comes first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use tracing::debug;
use url::Url;

use super::auth::BasicAuth;
use crate::error::{FetchError, Result};
use crate::models::ProxyProtocol;

/// Transport options a session is bound to
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub proxy: Option<String>,
    pub proxy_auth: Option<BasicAuth>,
    pub cookies: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proxy(mut self, endpoint: impl Into<String>) -> Self {
        self.proxy = Some(endpoint.into());
        self
    }

    pub fn proxy_auth(mut self, auth: BasicAuth) -> Self {
        self.proxy_auth = Some(auth);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(format!("bad header name {:?}", name)))?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                FetchError::InvalidHeader(format!("bad value for header {}", name))
            })?;
            map.append(name, value);
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            let value = HeaderValue::from_str(&cookie)
                .map_err(|_| FetchError::InvalidHeader("bad cookie value".to_string()))?;
            map.insert(COOKIE, value);
        }

        Ok(map)
    }

    fn build_proxy(&self, endpoint: &str) -> Result<reqwest::Proxy> {
        let mut url = Url::parse(endpoint)?;
        let protocol = ProxyProtocol::from_str(url.scheme()).ok_or_else(|| {
            FetchError::InvalidProxy(format!("unsupported proxy scheme: {}", url.scheme()))
        })?;

        if protocol.is_socks() {
            // SOCKS handshakes take credentials from the proxy URL itself.
            if let Some(auth) = &self.proxy_auth {
                url.set_username(auth.login())
                    .and_then(|_| url.set_password(Some(auth.password())))
                    .map_err(|_| {
                        FetchError::InvalidProxy(format!("cannot embed credentials in {}", endpoint))
                    })?;
            }
            return Ok(reqwest::Proxy::all(url.as_str())?);
        }

        let proxy = reqwest::Proxy::all(url.as_str())?;
        match &self.proxy_auth {
            Some(auth) => Ok(proxy.custom_http_auth(auth.header_value()?)),
            None => Ok(proxy),
        }
    }

    fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .default_headers(self.default_headers()?)
            // One request per session; nothing to keep warm.
            .pool_max_idle_per_host(0);

        builder = match &self.proxy {
            Some(endpoint) => builder.proxy(self.build_proxy(endpoint)?),
            None => {
                if self.proxy_auth.is_some() {
                    debug!("Proxy auth given without a proxy; ignoring it");
                }
                builder.no_proxy()
            }
        };

        Ok(builder.build()?)
    }
}

/// Counts sessions opened and released
#[derive(Debug, Default)]
pub struct SessionTracker {
    opened: AtomicU64,
    closed: AtomicU64,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> u64 {
        self.opened().saturating_sub(self.closed())
    }
}

/// A client context owned by exactly one request
pub struct Session {
    client: Option<reqwest::Client>,
    tracker: Arc<SessionTracker>,
}

impl Session {
    /// Build the underlying client and register the session with `tracker`
    pub fn open(options: &SessionOptions, tracker: Arc<SessionTracker>) -> Result<Self> {
        let client = options.build_client()?;
        tracker.acquire();
        debug!(
            proxy = options.proxy.as_deref().unwrap_or("none"),
            "Session opened"
        );

        Ok(Self {
            client: Some(client),
            tracker,
        })
    }

    /// Client for issuing requests, `None` once closed
    pub fn client(&self) -> Option<&reqwest::Client> {
        self.client.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    /// Release the client. Returns `true` only for the call that actually released it.
    pub fn close(&mut self) -> bool {
        match self.client.take() {
            Some(client) => {
                drop(client);
                self.tracker.release();
                debug!("Session closed");
                true
            }
            None => false,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
