//! Read-through cache of loaded site tables.
//!
//! Sources are treated as immutable for the lifetime of a cache, so a
//! repeated request for the same `(site, path)` hands back the table read
//! the first time. The cache is an ordinary value owned by the caller;
//! dropping or clearing it is the only way entries go away.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::csv_source::{self, SiteTable};
use crate::logging::{self, Stage};
use crate::model::{Site, SourceError};

#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<(Site, PathBuf), Arc<SiteTable>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `(site, path)`, loading it on first use.
    ///
    /// Failures are not cached: the next call retries the read.
    pub fn get_or_load(&mut self, site: Site, path: &Path) -> Result<Arc<SiteTable>, SourceError> {
        let key = (site, path.to_path_buf());
        if let Some(table) = self.entries.get(&key) {
            logging::debug(
                Stage::Cache,
                Some(site),
                &format!("hit for {}", path.display()),
            );
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(csv_source::load_site(site, path)?);
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop every cached table of one site. Returns how many were dropped.
    pub fn invalidate(&mut self, site: Site) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(s, _), _| *s != site);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            logging::debug(
                Stage::Cache,
                Some(site),
                &format!("invalidated {} entries", dropped),
            );
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, site: Site, path: &Path) -> bool {
        self.entries.contains_key(&(site, path.to_path_buf()))
    }
}
