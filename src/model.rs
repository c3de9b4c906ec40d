//! Core data types for the solar site monitoring service.
//!
//! This module defines the shared domain model imported by all other modules:
//! site identifiers, measurement channels, the typed `Reading` record, and the
//! error types surfaced by the loader, configuration and pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

/// A physical monitoring location contributing one data source.
///
/// Ordering follows declaration order; grouped outputs are emitted in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Site {
    Benin,
    #[serde(rename = "Sierra Leone")]
    SierraLeone,
    Togo,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Benin, Site::SierraLeone, Site::Togo];

    /// Display label, as shown to the selection UI.
    pub fn label(self) -> &'static str {
        match self {
            Site::Benin => "Benin",
            Site::SierraLeone => "Sierra Leone",
            Site::Togo => "Togo",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Site {
    type Err = ConfigError;

    /// Accepts "Sierra Leone", "SierraLeone" and "sierra_leone", in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "benin" => Ok(Site::Benin),
            "sierraleone" => Ok(Site::SierraLeone),
            "togo" => Ok(Site::Togo),
            _ => Err(ConfigError::UnknownSite(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// A numeric measurement column of a site source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Global horizontal irradiance, W/m².
    Ghi,
    /// Direct normal irradiance, W/m².
    Dni,
    /// Diffuse horizontal irradiance, W/m².
    Dhi,
    ModA,
    ModB,
    /// Ambient temperature, °C.
    Tamb,
    /// Relative humidity, %.
    Rh,
    /// Wind speed, m/s.
    Ws,
    WsGust,
    /// Wind direction, degrees from north.
    Wd,
    /// Barometric pressure, hPa.
    Bp,
    Precipitation,
    TModA,
    TModB,
}

impl Channel {
    pub const ALL: [Channel; 14] = [
        Channel::Ghi,
        Channel::Dni,
        Channel::Dhi,
        Channel::ModA,
        Channel::ModB,
        Channel::Tamb,
        Channel::Rh,
        Channel::Ws,
        Channel::WsGust,
        Channel::Wd,
        Channel::Bp,
        Channel::Precipitation,
        Channel::TModA,
        Channel::TModB,
    ];

    pub const IRRADIANCE: [Channel; 3] = [Channel::Ghi, Channel::Dni, Channel::Dhi];

    pub const MODULE: [Channel; 2] = [Channel::ModA, Channel::ModB];

    /// Header name of the channel in a source file.
    pub fn column(self) -> &'static str {
        match self {
            Channel::Ghi => "GHI",
            Channel::Dni => "DNI",
            Channel::Dhi => "DHI",
            Channel::ModA => "ModA",
            Channel::ModB => "ModB",
            Channel::Tamb => "Tamb",
            Channel::Rh => "RH",
            Channel::Ws => "WS",
            Channel::WsGust => "WSgust",
            Channel::Wd => "WD",
            Channel::Bp => "BP",
            Channel::Precipitation => "Precipitation",
            Channel::TModA => "TModA",
            Channel::TModB => "TModB",
        }
    }

    /// Core channels must be present in every source header; the rest are
    /// optional and read as missing when absent.
    pub fn is_core(self) -> bool {
        matches!(
            self,
            Channel::Ghi
                | Channel::Dni
                | Channel::Dhi
                | Channel::ModA
                | Channel::ModB
                | Channel::Tamb
                | Channel::Rh
                | Channel::Ws
                | Channel::Wd
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Header name of the timestamp column.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Header name of the cleaning-event flag column.
pub const CLEANING_COLUMN: &str = "Cleaning";

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One sensor observation, validated at the ingestion boundary.
///
/// Every channel is optional: `None` means the cell was empty, malformed or
/// out of range. Aggregates skip `None` for that channel only.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub site: Site,
    /// Timezone-naive, as recorded in the source.
    pub timestamp: NaiveDateTime,
    pub ghi: Option<f64>,
    pub dni: Option<f64>,
    pub dhi: Option<f64>,
    pub mod_a: Option<f64>,
    pub mod_b: Option<f64>,
    pub tamb: Option<f64>,
    pub rh: Option<f64>,
    pub ws: Option<f64>,
    pub ws_gust: Option<f64>,
    pub wd: Option<f64>,
    pub bp: Option<f64>,
    pub precipitation: Option<f64>,
    pub t_mod_a: Option<f64>,
    pub t_mod_b: Option<f64>,
    /// Whether a sensor-cleaning event was logged for this reading.
    pub cleaning: Option<bool>,
}

impl Reading {
    /// A reading with every channel missing.
    pub fn empty(site: Site, timestamp: NaiveDateTime) -> Self {
        Reading {
            site,
            timestamp,
            ghi: None,
            dni: None,
            dhi: None,
            mod_a: None,
            mod_b: None,
            tamb: None,
            rh: None,
            ws: None,
            ws_gust: None,
            wd: None,
            bp: None,
            precipitation: None,
            t_mod_a: None,
            t_mod_b: None,
            cleaning: None,
        }
    }

    pub fn value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Ghi => self.ghi,
            Channel::Dni => self.dni,
            Channel::Dhi => self.dhi,
            Channel::ModA => self.mod_a,
            Channel::ModB => self.mod_b,
            Channel::Tamb => self.tamb,
            Channel::Rh => self.rh,
            Channel::Ws => self.ws,
            Channel::WsGust => self.ws_gust,
            Channel::Wd => self.wd,
            Channel::Bp => self.bp,
            Channel::Precipitation => self.precipitation,
            Channel::TModA => self.t_mod_a,
            Channel::TModB => self.t_mod_b,
        }
    }

    pub fn set_value(&mut self, channel: Channel, value: Option<f64>) {
        let slot = match channel {
            Channel::Ghi => &mut self.ghi,
            Channel::Dni => &mut self.dni,
            Channel::Dhi => &mut self.dhi,
            Channel::ModA => &mut self.mod_a,
            Channel::ModB => &mut self.mod_b,
            Channel::Tamb => &mut self.tamb,
            Channel::Rh => &mut self.rh,
            Channel::Ws => &mut self.ws,
            Channel::WsGust => &mut self.ws_gust,
            Channel::Wd => &mut self.wd,
            Channel::Bp => &mut self.bp,
            Channel::Precipitation => &mut self.precipitation,
            Channel::TModA => &mut self.t_mod_a,
            Channel::TModB => &mut self.t_mod_b,
        };
        *slot = value;
    }

    /// Builder-style variant of [`Reading::set_value`].
    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        self.set_value(channel, Some(value));
        self
    }

    pub fn with_cleaning(mut self, cleaning: bool) -> Self {
        self.cleaning = Some(cleaning);
        self
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A site's raw data could not be located or parsed.
///
/// Always carries the offending site and source reference so the caller can
/// decide between aborting and continuing with the remaining sites.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source for {site} not found: {}", .path.display())]
    NotFound { site: Site, path: PathBuf },

    #[error("source for {site} unreadable ({}): {reason}", .path.display())]
    Unreadable {
        site: Site,
        path: PathBuf,
        /// `InvalidData` when the bytes were read but could not be decoded.
        kind: std::io::ErrorKind,
        reason: String,
    },

    #[error("source for {site} is missing column '{column}' ({})", .path.display())]
    MissingColumn {
        site: Site,
        path: PathBuf,
        column: &'static str,
    },
}

impl SourceError {
    pub fn site(&self) -> Site {
        match self {
            SourceError::NotFound { site, .. }
            | SourceError::Unreadable { site, .. }
            | SourceError::MissingColumn { site, .. } => *site,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceError::NotFound { path, .. }
            | SourceError::Unreadable { path, .. }
            | SourceError::MissingColumn { path, .. } => path,
        }
    }
}

/// Errors raised while reading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown site: '{0}'")]
    UnknownSite(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Errors that stop a pipeline run before any view is built.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
