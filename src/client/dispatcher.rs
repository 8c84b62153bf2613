//! Request execution
//!
//! `HttpClient::fetch` drives one request through
//! `Idle -> SessionOpen -> RequestSent -> {Decoded | Failed} -> SessionClosed`.
//! Failures come back as `Err` after being logged once; nothing panics past
//! this boundary, and the session is released on every path including
//! cancellation (the `Session` drop guard covers a dropped future).

use std::error::Error as StdError;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, instrument, warn};

use super::auth::{BasicAuth, CredentialEncoding};
use super::request::FetchRequest;
use super::session::{Session, SessionOptions, SessionTracker};
use crate::error::{FetchError, Result};
use crate::models::{RequestMethod, ResponseBody, ResponseMode};

/// Async HTTP helper: session configuration plus request execution
#[derive(Clone, Default)]
pub struct HttpClient {
    tracker: Arc<SessionTracker>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credentials for basic auth at the proxy layer
    pub fn build_auth(
        username: impl Into<String>,
        password: impl Into<String>,
        encoding: CredentialEncoding,
    ) -> BasicAuth {
        BasicAuth::with_encoding(username, password, encoding)
    }

    /// Open a session bound to `options`; release it with [`HttpClient::close`] or by dropping it
    pub fn open_session(&self, options: &SessionOptions) -> Result<Session> {
        Session::open(options, self.tracker.clone())
    }

    /// Release a session if there is one
    pub fn close(&self, session: Option<Session>) {
        if let Some(mut session) = session {
            session.close();
        }
    }

    /// Perform one request and decode the body per `request.mode`
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn fetch(&self, request: FetchRequest) -> Result<ResponseBody> {
        let result = match self.open_session(&request.session_options()) {
            Ok(mut session) => {
                let result = match session.client() {
                    Some(client) => Self::execute(client, &request).await,
                    None => Err(FetchError::SessionClosed),
                };
                session.close();
                result
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!(
                error = %e,
                chain = %error_chain(e),
                retryable = e.is_retryable(),
                "Request failed"
            );
        }

        result
    }

    /// Sessions currently open
    pub fn active_sessions(&self) -> u64 {
        self.tracker.active()
    }

    pub fn sessions_opened(&self) -> u64 {
        self.tracker.opened()
    }

    pub fn sessions_closed(&self) -> u64 {
        self.tracker.closed()
    }

    async fn execute(client: &reqwest::Client, request: &FetchRequest) -> Result<ResponseBody> {
        let mut builder = match request.method {
            RequestMethod::Get => client.get(&request.url),
            RequestMethod::Post => client.post(&request.url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        match (request.method, &request.body) {
            (RequestMethod::Post, Some(body)) => builder = builder.json(body),
            (RequestMethod::Get, Some(_)) => warn!("Ignoring JSON body on GET request"),
            _ => {}
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Response received");

        if request.raise_on_error_status && (status.is_client_error() || status.is_server_error())
        {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        Self::decode(request.mode, response).await
    }

    async fn decode(mode: ResponseMode, response: reqwest::Response) -> Result<ResponseBody> {
        match mode {
            ResponseMode::Text => Ok(ResponseBody::Text(response.text().await?)),
            ResponseMode::Structured => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if !is_json_content_type(&content_type) {
                    return Err(FetchError::UnexpectedContentType { content_type });
                }

                let bytes = response.bytes().await?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(ResponseBody::Empty);
                }
                Ok(ResponseBody::Structured(serde_json::from_slice(&bytes)?))
            }
        }
    }
}

/// `application/json` or any `application/*+json`, parameters ignored
fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.strip_prefix("application/") {
        Some(subtype) => subtype == "json" || subtype.ends_with("+json"),
        None => false,
    }
}

/// Render an error and all of its sources, outermost first.
///
/// A cause whose text the chain already carries (a `#[from]` variant that
/// formats its source) is not repeated.
fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !chain.contains(&text) {
            chain.push_str(": ");
            chain.push_str(&text);
        }
        source = cause.source();
    }
    chain
}
