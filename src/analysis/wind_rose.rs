//! Wind rose binning.
//!
//! Directions fall into 16 compass sectors of 22.5° centred on their
//! heading, so `N` covers [348.75°, 360°] and [0°, 11.25°). A value on a
//! boundary belongs to the sector that starts there. Speeds fall into six
//! bands, right-open except the unbounded top band.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::model::{Reading, Site};
use crate::table::Table;

const SECTOR_WIDTH: f64 = 22.5;

// ---------------------------------------------------------------------------
// Sectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl Sector {
    /// Clockwise from north.
    pub const ALL: [Sector; 16] = [
        Sector::N,
        Sector::Nne,
        Sector::Ne,
        Sector::Ene,
        Sector::E,
        Sector::Ese,
        Sector::Se,
        Sector::Sse,
        Sector::S,
        Sector::Ssw,
        Sector::Sw,
        Sector::Wsw,
        Sector::W,
        Sector::Wnw,
        Sector::Nw,
        Sector::Nnw,
    ];

    /// Sector of a direction in degrees. `None` outside [0, 360] or for
    /// non-finite input; 360 is the same heading as 0.
    pub fn from_degrees(degrees: f64) -> Option<Sector> {
        if !degrees.is_finite() || !(0.0..=360.0).contains(&degrees) {
            return None;
        }
        let shifted = degrees + SECTOR_WIDTH / 2.0;
        let index = (shifted / SECTOR_WIDTH).floor() as usize % Sector::ALL.len();
        Some(Sector::ALL[index])
    }

    pub fn label(self) -> &'static str {
        match self {
            Sector::N => "N",
            Sector::Nne => "NNE",
            Sector::Ne => "NE",
            Sector::Ene => "ENE",
            Sector::E => "E",
            Sector::Ese => "ESE",
            Sector::Se => "SE",
            Sector::Sse => "SSE",
            Sector::S => "S",
            Sector::Ssw => "SSW",
            Sector::Sw => "SW",
            Sector::Wsw => "WSW",
            Sector::W => "W",
            Sector::Wnw => "WNW",
            Sector::Nw => "NW",
            Sector::Nnw => "NNW",
        }
    }

    /// Heading at the centre of the sector.
    pub fn center_degrees(self) -> f64 {
        self as usize as f64 * SECTOR_WIDTH
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Speed bands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpeedBand {
    /// [0, 2)
    Calm,
    /// [2, 4)
    Light,
    /// [4, 6)
    Moderate,
    /// [6, 8)
    Fresh,
    /// [8, 10)
    Strong,
    /// [10, ∞)
    Gale,
}

impl SpeedBand {
    pub const ALL: [SpeedBand; 6] = [
        SpeedBand::Calm,
        SpeedBand::Light,
        SpeedBand::Moderate,
        SpeedBand::Fresh,
        SpeedBand::Strong,
        SpeedBand::Gale,
    ];

    /// Band of a wind speed in m/s. `None` for negative or non-finite input.
    pub fn from_speed(speed: f64) -> Option<SpeedBand> {
        if speed.is_nan() || speed < 0.0 {
            return None;
        }
        let band = if speed < 2.0 {
            SpeedBand::Calm
        } else if speed < 4.0 {
            SpeedBand::Light
        } else if speed < 6.0 {
            SpeedBand::Moderate
        } else if speed < 8.0 {
            SpeedBand::Fresh
        } else if speed < 10.0 {
            SpeedBand::Strong
        } else {
            SpeedBand::Gale
        };
        Some(band)
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedBand::Calm => "0-2",
            SpeedBand::Light => "2-4",
            SpeedBand::Moderate => "4-6",
            SpeedBand::Fresh => "6-8",
            SpeedBand::Strong => "8-10",
            SpeedBand::Gale => ">10",
        }
    }
}

impl fmt::Display for SpeedBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Wind rose
// ---------------------------------------------------------------------------

/// Occurrence counts per (sector, speed band) for one site. Sparse: only
/// pairs that occurred are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct WindRose {
    pub site: Site,
    pub bins: BTreeMap<(Sector, SpeedBand), usize>,
}

impl WindRose {
    pub fn count(&self, sector: Sector, band: SpeedBand) -> usize {
        self.bins.get(&(sector, band)).copied().unwrap_or(0)
    }

    /// Rows that landed in a bin.
    pub fn total(&self) -> usize {
        self.bins.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Columns `sector`, `speed_band`, `count`, in compass then band order.
    pub fn to_table(&self) -> Table {
        let mut out = Table::new(["sector", "speed_band", "count"]);
        for (&(sector, band), &count) in &self.bins {
            out.push_row(vec![
                Value::String(sector.to_string()),
                Value::String(band.to_string()),
                Value::from(count),
            ]);
        }
        out
    }
}

/// Bin the rows of one site. Rows missing a valid direction or speed are
/// not counted; rows of other sites are ignored.
pub fn wind_rose<'a, I>(site: Site, rows: I) -> WindRose
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut bins = BTreeMap::new();
    for row in rows.into_iter().filter(|r| r.site == site) {
        let sector = row.wd.and_then(Sector::from_degrees);
        let band = row.ws.and_then(SpeedBand::from_speed);
        if let (Some(sector), Some(band)) = (sector, band) {
            *bins.entry((sector, band)).or_insert(0) += 1;
        }
    }
    WindRose { site, bins }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
