//! Proxy selection
//!
//! This module provides:
//! - Loading proxy lists from line-oriented files
//! - Pluggable selection strategies (random by default)
//! - Parsing the chosen entry into a `ProxyCredential`

pub mod pool;
pub mod selector;

pub use pool::ProxyPool;
pub use selector::{ProxySelector, RandomSelector};
