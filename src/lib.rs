//! Fetchproxy - one-shot HTTP requests through rotating proxies
//!
//! ## Features
//!
//! - Proxy lists in `[scheme://]host:port:username:password` form, picked at random
//! - Injectable selection strategy for deterministic tests
//! - GET/POST with headers, cookies, query parameters and JSON bodies
//! - Responses decoded as JSON or returned as text
//! - One session per request, released on every exit path

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;

pub use client::{BasicAuth, CredentialEncoding, FetchRequest, HttpClient};
pub use config::Config;
pub use error::{FetchError, Result};
pub use models::{ProxyCredential, RequestMethod, ResponseBody, ResponseMode};
pub use proxy::{ProxyPool, ProxySelector, RandomSelector};
