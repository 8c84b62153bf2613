//! Proxy list loading and selection

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::selector::{ProxySelector, RandomSelector};
use crate::error::{FetchError, Result};
use crate::models::ProxyCredential;

/// Ordered list of raw proxy entries plus the strategy used to pick among them
pub struct ProxyPool {
    entries: Vec<String>,
    selector: Arc<dyn ProxySelector>,
}

impl ProxyPool {
    /// Read a proxy list file, one entry per line.
    ///
    /// A missing file is fatal: without proxies there is nothing to route through.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!(
                    "Create {} and put proxies in it, one per line",
                    path.display()
                );
                return Err(FetchError::ConfigurationMissing {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let pool = Self::from_entries(contents.lines());
        debug!("Loaded {} proxies from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Build a pool from in-memory entries. Blank lines are dropped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut skipped = 0usize;
        let entries: Vec<String> = entries
            .into_iter()
            .map(Into::into)
            .filter(|line| {
                let keep = !line.trim().is_empty();
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .collect();

        if skipped > 0 {
            warn!("Skipped {} blank proxy lines", skipped);
        }

        Self {
            entries,
            selector: Arc::new(RandomSelector::new()),
        }
    }

    /// Replace the selection strategy
    pub fn with_selector(mut self, selector: Arc<dyn ProxySelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Pick one entry and parse it into a fresh credential
    pub fn pick_random(&self) -> Result<ProxyCredential> {
        let entry = self
            .selector
            .select(self.entries.len())
            .and_then(|idx| self.entries.get(idx))
            .ok_or(FetchError::NoProxiesAvailable)?;

        ProxyCredential::parse(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn strategy_name(&self) -> &'static str {
        self.selector.strategy_name()
    }
}
