use serde_json::Value;

use super::auth::BasicAuth;
use super::session::SessionOptions;
use crate::models::{ProxyCredential, RequestMethod, ResponseMode};

/// Everything needed to perform one request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: RequestMethod,
    pub mode: ResponseMode,
    pub proxy: Option<String>,
    pub proxy_auth: Option<BasicAuth>,
    pub cookies: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// JSON payload, only sent with POST
    pub body: Option<Value>,
    /// Treat 4xx/5xx as a failure instead of decoding the body
    pub raise_on_error_status: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, method: RequestMethod, mode: ResponseMode) -> Self {
        Self {
            url: url.into(),
            method,
            mode,
            proxy: None,
            proxy_auth: None,
            cookies: Vec::new(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            raise_on_error_status: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Get, ResponseMode::Structured)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Post, ResponseMode::Structured)
    }

    pub fn mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn proxy(mut self, endpoint: impl Into<String>) -> Self {
        self.proxy = Some(endpoint.into());
        self
    }

    pub fn proxy_auth(mut self, auth: BasicAuth) -> Self {
        self.proxy_auth = Some(auth);
        self
    }

    /// Route through `credential`, authenticating with its username and password
    pub fn via(self, credential: &ProxyCredential) -> Self {
        self.proxy(credential.endpoint.clone())
            .proxy_auth(credential.basic_auth())
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn raise_on_error_status(mut self, raise: bool) -> Self {
        self.raise_on_error_status = raise;
        self
    }

    /// Transport options for the session carrying this request
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            proxy: self.proxy.clone(),
            proxy_auth: self.proxy_auth.clone(),
            cookies: self.cookies.clone(),
            headers: self.headers.clone(),
        }
    }
}
