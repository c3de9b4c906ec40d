//! Per-site source loader.
//!
//! Reads one cleaned export (delimited text with a `Timestamp` column and
//! one column per channel), validates each cell at the boundary, and
//! returns the site's readings ordered by timestamp.
//!
//! A missing or structurally broken file is a `SourceError` naming the site
//! and path. Problems inside individual rows never are: an unparseable
//! timestamp drops the row, and a malformed or out-of-range cell becomes a
//! missing value for that channel only.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::logging::{self, Stage};
use crate::model::{CLEANING_COLUMN, Channel, Reading, Site, SourceError, TIMESTAMP_COLUMN};

/// Timestamp layouts accepted in the `Timestamp` column. `%.f` also
/// matches an absent fractional part.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// ============================================================================
// Load results
// ============================================================================

/// What happened while reading one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data records seen, excluding the header.
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Records dropped for an undecodable record or timestamp.
    pub skipped_rows: usize,
    /// Cells that were present but malformed or out of range.
    pub nulled_values: usize,
    /// Whether the source was not already in timestamp order.
    pub reordered: bool,
}

/// All readings of one site, ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteTable {
    pub site: Site,
    pub source: PathBuf,
    pub readings: Vec<Reading>,
    pub report: LoadReport,
}

impl SiteTable {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load one site's export from disk.
pub fn load_site(site: Site, path: &Path) -> Result<SiteTable, SourceError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound {
            site,
            path: path.to_path_buf(),
        },
        kind => SourceError::Unreadable {
            site,
            path: path.to_path_buf(),
            kind,
            reason: e.to_string(),
        },
    })?;

    let table = parse_site_csv(site, path, file)?;
    logging::info(
        Stage::Load,
        Some(site),
        &format!(
            "Loaded {} readings from {} ({} skipped, {} values nulled)",
            table.report.loaded_rows,
            path.display(),
            table.report.skipped_rows,
            table.report.nulled_values
        ),
    );
    Ok(table)
}

/// Parse a site export from any reader. `source` is only used to label the
/// table and errors.
pub fn parse_site_csv<R: Read>(
    site: Site,
    source: &Path,
    reader: R,
) -> Result<SiteTable, SourceError> {
    // `flexible(true)` lets short rows through; their trailing cells read as missing.
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| SourceError::Unreadable {
            site,
            path: source.to_path_buf(),
            kind: match e.kind() {
                csv::ErrorKind::Io(io_err) => io_err.kind(),
                _ => io::ErrorKind::InvalidData,
            },
            reason: e.to_string(),
        })?
        .clone();
    let layout = ColumnLayout::from_headers(&headers).map_err(|column| {
        SourceError::MissingColumn {
            site,
            path: source.to_path_buf(),
            column,
        }
    })?;

    let mut report = LoadReport::default();
    let mut readings = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };

        match layout.parse_record(site, &record, &mut report.nulled_values) {
            Some(reading) => readings.push(reading),
            None => report.skipped_rows += 1,
        }
    }

    if !readings.is_sorted_by_key(|r: &Reading| r.timestamp) {
        // Stable, so rows sharing a timestamp keep their file order.
        readings.sort_by_key(|r| r.timestamp);
        report.reordered = true;
        logging::warn(
            Stage::Load,
            Some(site),
            &format!("{} was not in timestamp order; sorted", source.display()),
        );
    }

    report.loaded_rows = readings.len();
    Ok(SiteTable {
        site,
        source: source.to_path_buf(),
        readings,
        report,
    })
}

// ============================================================================
// Column layout
// ============================================================================

/// Header positions of every column the loader reads.
struct ColumnLayout {
    timestamp: usize,
    cleaning: usize,
    channels: Vec<(Channel, Option<usize>)>,
}

impl ColumnLayout {
    /// Fails with the name of the first required column that is absent.
    fn from_headers(headers: &StringRecord) -> Result<Self, &'static str> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
        };

        let timestamp = position(TIMESTAMP_COLUMN).ok_or(TIMESTAMP_COLUMN)?;
        let cleaning = position(CLEANING_COLUMN).ok_or(CLEANING_COLUMN)?;

        let mut channels = Vec::with_capacity(Channel::ALL.len());
        for channel in Channel::ALL {
            let index = position(channel.column());
            if index.is_none() && channel.is_core() {
                return Err(channel.column());
            }
            channels.push((channel, index));
        }

        Ok(ColumnLayout {
            timestamp,
            cleaning,
            channels,
        })
    }

    /// `None` when the row has no usable timestamp.
    fn parse_record(
        &self,
        site: Site,
        record: &StringRecord,
        nulled: &mut usize,
    ) -> Option<Reading> {
        let timestamp = parse_timestamp(record.get(self.timestamp)?)?;
        let mut reading = Reading::empty(site, timestamp);

        for &(channel, index) in &self.channels {
            let raw = index.and_then(|i| record.get(i));
            match parse_channel(channel, raw) {
                Cell::Value(v) => reading.set_value(channel, Some(v)),
                Cell::Empty => {}
                Cell::Invalid => *nulled += 1,
            }
        }

        match parse_cleaning(record.get(self.cleaning)) {
            Cell::Value(flag) => reading.cleaning = Some(flag),
            Cell::Empty => {}
            Cell::Invalid => *nulled += 1,
        }

        Some(reading)
    }
}

// ============================================================================
// Cell parsing
// ============================================================================

#[derive(Debug, PartialEq)]
enum Cell<T> {
    Value(T),
    /// Blank or an explicit missing marker.
    Empty,
    /// Present but malformed or out of range.
    Invalid,
}

fn is_missing_marker(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("null")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("na")
}

/// Parse a timestamp in any accepted layout.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_channel(channel: Channel, raw: Option<&str>) -> Cell<f64> {
    let raw = match raw.map(str::trim) {
        Some(s) if !is_missing_marker(s) => s,
        _ => return Cell::Empty,
    };
    let value = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Cell::Invalid,
    };
    let in_range = match channel {
        Channel::Wd => (0.0..=360.0).contains(&value),
        Channel::Ws | Channel::WsGust => value >= 0.0,
        _ => true,
    };
    if in_range { Cell::Value(value) } else { Cell::Invalid }
}

fn parse_cleaning(raw: Option<&str>) -> Cell<bool> {
    let raw = match raw.map(str::trim) {
        Some(s) if !is_missing_marker(s) => s,
        _ => return Cell::Empty,
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Cell::Value(true),
        "0" | "0.0" | "false" | "no" => Cell::Value(false),
        _ => Cell::Invalid,
    }
}

// ============================================================================
// Tests
// ============================================================================
