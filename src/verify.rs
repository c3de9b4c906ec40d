//! Source verification.
//!
//! Checks every configured source before a run: does the file exist, does
//! its header carry the columns the loader needs, and does it hold any data
//! rows. Readings are not parsed. Use this when setting up a data
//! directory to find out which exports are missing or stale.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::ingest::SiteSource;
use crate::logging::{self, Stage};
use crate::model::{CLEANING_COLUMN, Channel, Site, TIMESTAMP_COLUMN};
use crate::sites;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<SourceVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

/// Registry details of the station behind a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDetails {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationDetails {
    fn for_site(site: Site) -> Option<Self> {
        sites::find_site(site).map(|info| StationDetails {
            name: info.station.to_string(),
            description: info.description.to_string(),
            latitude: info.latitude,
            longitude: info.longitude,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVerification {
    pub site: Site,
    pub station: Option<StationDetails>,
    pub path: PathBuf,
    pub status: VerificationStatus,
    pub file_exists: bool,
    pub columns_found: Vec<String>,
    /// Required columns absent from the header.
    pub missing_required: Vec<String>,
    /// Supplementary channel columns absent from the header.
    pub missing_optional: Vec<String>,
    pub data_rows: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Every column present and at least one data row.
    Success,
    /// Loadable, but optional columns are missing or there are no rows.
    PartialSuccess,
    /// The loader would reject this source.
    Failed,
}

/// Columns the loader refuses to work without.
pub fn required_columns() -> Vec<&'static str> {
    let mut columns = vec![TIMESTAMP_COLUMN, CLEANING_COLUMN];
    columns.extend(
        Channel::ALL
            .iter()
            .filter(|c| c.is_core())
            .map(|c| c.column()),
    );
    columns
}

fn optional_columns() -> Vec<&'static str> {
    Channel::ALL
        .iter()
        .filter(|c| !c.is_core())
        .map(|c| c.column())
        .collect()
}

// ============================================================================
// Per-source check
// ============================================================================

pub fn verify_source(site: Site, path: &Path) -> SourceVerification {
    let mut result = SourceVerification {
        site,
        station: StationDetails::for_site(site),
        path: path.to_path_buf(),
        status: VerificationStatus::Failed,
        file_exists: false,
        columns_found: Vec::new(),
        missing_required: Vec::new(),
        missing_optional: Vec::new(),
        data_rows: 0,
        error_message: None,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            result.error_message = Some("File not found".to_string());
            return result;
        }
        Err(e) => {
            result.file_exists = path.exists();
            result.error_message = Some(format!("Cannot open: {}", e));
            return result;
        }
    };
    result.file_exists = true;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    match reader.headers() {
        Ok(headers) => {
            result.columns_found = headers
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}').to_string())
                .collect();
        }
        Err(e) => {
            result.error_message = Some(format!("Header unreadable: {}", e));
            return result;
        }
    }

    let has = |name: &str| result.columns_found.iter().any(|c| c == name);
    result.missing_required = required_columns()
        .into_iter()
        .filter(|c| !has(c))
        .map(String::from)
        .collect();
    result.missing_optional = optional_columns()
        .into_iter()
        .filter(|c| !has(c))
        .map(String::from)
        .collect();

    // Malformed records are the loader's concern; only count what parses.
    result.data_rows = reader.records().filter(Result::is_ok).count();

    result.status = if !result.missing_required.is_empty() {
        result.error_message = Some(format!(
            "Missing required columns: {}",
            result.missing_required.join(", ")
        ));
        VerificationStatus::Failed
    } else if result.missing_optional.is_empty() && result.data_rows > 0 {
        VerificationStatus::Success
    } else {
        VerificationStatus::PartialSuccess
    };

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_verification(sources: &[SiteSource]) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results: Vec::with_capacity(sources.len()),
        summary: VerificationSummary {
            total: sources.len(),
            ..VerificationSummary::default()
        },
    };

    for source in sources {
        let result = verify_source(source.site, &source.path);
        let site = Some(source.site);

        match result.status {
            VerificationStatus::Success => {
                let station = result.station.as_ref().map_or("unregistered", |s| s.name.as_str());
                logging::info(
                    Stage::Verify,
                    site,
                    &format!("OK ({} rows, station {})", result.data_rows, station),
                );
                report.summary.working += 1;
            }
            VerificationStatus::PartialSuccess => {
                let detail = if result.data_rows == 0 {
                    "no data rows".to_string()
                } else {
                    format!("missing optional: {:?}", result.missing_optional)
                };
                logging::warn(Stage::Verify, site, &format!("Partial ({})", detail));
                report.summary.working += 1;
            }
            VerificationStatus::Failed => {
                logging::error(
                    Stage::Verify,
                    site,
                    &format!(
                        "FAILED: {} ({})",
                        result.error_message.as_deref().unwrap_or("Unknown"),
                        source.path.display()
                    ),
                );
                report.summary.failed += 1;
            }
        }

        report.results.push(result);
    }

    report
}

impl VerificationReport {
    /// Share of sources that can be loaded, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.summary.total > 0 {
            (self.summary.working as f64 / self.summary.total as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        logging::info(
            Stage::Verify,
            None,
            &format!(
                "{}/{} sources working ({} failed), success rate {:.1}%",
                self.summary.working,
                self.summary.total,
                self.summary.failed,
                self.success_rate()
            ),
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
