//! Source ingestion.
//!
//! Submodules:
//! - `csv_source` — parses one site's export into a `SiteTable`.
//! - `cache` — read-through `SourceCache` keyed by site and path.
//!
//! `load_sites` loads every configured source through a cache and applies
//! the caller's `LoadPolicy` to failures.

pub mod cache;
pub mod csv_source;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

pub use cache::SourceCache;
pub use csv_source::{LoadReport, SiteTable, load_site, parse_site_csv};

use crate::logging;
use crate::model::{Site, SourceError};

/// Where one site's raw data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSource {
    pub site: Site,
    pub path: PathBuf,
}

impl SiteSource {
    pub fn new(site: Site, path: impl Into<PathBuf>) -> Self {
        SiteSource {
            site,
            path: path.into(),
        }
    }
}

/// What to do when a source fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Stop at the first failure.
    #[default]
    Abort,
    /// Keep every table that loaded and report the failures.
    Partial,
}

/// Tables that loaded, in source order, and the failures that were tolerated.
#[derive(Debug)]
pub struct LoadOutcome {
    pub tables: Vec<Arc<SiteTable>>,
    pub failures: Vec<SourceError>,
}

impl LoadOutcome {
    pub fn loaded_sites(&self) -> Vec<Site> {
        self.tables.iter().map(|t| t.site).collect()
    }
}

/// Load every source through `cache`.
///
/// Under `LoadPolicy::Abort` the first failure is returned as the error.
/// Under `LoadPolicy::Partial` failures are collected and never affect
/// another site's table.
pub fn load_sites(
    cache: &mut SourceCache,
    sources: &[SiteSource],
    policy: LoadPolicy,
) -> Result<LoadOutcome, SourceError> {
    let mut outcome = LoadOutcome {
        tables: Vec::with_capacity(sources.len()),
        failures: Vec::new(),
    };

    for source in sources {
        match cache.get_or_load(source.site, &source.path) {
            Ok(table) => outcome.tables.push(table),
            Err(e) => {
                logging::log_source_failure("load", &e);
                match policy {
                    LoadPolicy::Abort => return Err(e),
                    LoadPolicy::Partial => outcome.failures.push(e),
                }
            }
        }
    }

    logging::log_load_summary(sources.len(), outcome.tables.len(), outcome.failures.len());
    Ok(outcome)
}
