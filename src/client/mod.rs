//! Request dispatch
//!
//! Two capability groups share one `HttpClient`:
//! - session configuration: `build_auth`, `open_session`, `close`
//! - request execution: `fetch`

pub mod auth;
pub mod dispatcher;
pub mod request;
pub mod session;

pub use auth::{BasicAuth, CredentialEncoding};
pub use dispatcher::HttpClient;
pub use request::FetchRequest;
pub use session::{Session, SessionOptions, SessionTracker};
