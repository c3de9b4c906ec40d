//! Site registry for the solar monitoring service.
//!
//! Defines the canonical list of monitoring stations, along with their
//! metadata and the default file name of each station's cleaned export.
//! This is the single source of truth for site metadata; other modules
//! should reference sites from here rather than hardcoding file names.

use std::path::{Path, PathBuf};

use crate::model::Site;

// ---------------------------------------------------------------------------
// Site metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitoring station.
pub struct SiteInfo {
    pub site: Site,
    /// Name of the station the site's sensors belong to.
    pub station: &'static str,
    /// Human-readable description of the station.
    pub description: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// File name of the cleaned export inside the data directory.
    pub default_file: &'static str,
}

/// All monitored sites, in `Site` order.
pub static SITE_REGISTRY: &[SiteInfo] = &[
    SiteInfo {
        site: Site::Benin,
        station: "Malanville",
        description: "Sahelian station on the Niger river border. \
                      Long dry season with a single wet-season dip in GHI.",
        latitude: 11.8617,
        longitude: 3.3833,
        default_file: "benin_clean.csv",
    },
    SiteInfo {
        site: Site::SierraLeone,
        station: "Bumbuna",
        description: "Humid highland station near the Bumbuna dam. \
                      Heavy monsoon cloud cover from June to September.",
        latitude: 9.0444,
        longitude: -11.7350,
        default_file: "sierraleone_clean.csv",
    },
    SiteInfo {
        site: Site::Togo,
        station: "Dapaong",
        description: "Northern savanna station. Harmattan dust lowers DNI \
                      between December and February.",
        latitude: 10.8623,
        longitude: 0.2076,
        default_file: "togo_clean.csv",
    },
];

/// Returns every site in the registry.
pub fn all_sites() -> Vec<Site> {
    SITE_REGISTRY.iter().map(|s| s.site).collect()
}

/// Looks up a site's metadata.
pub fn find_site(site: Site) -> Option<&'static SiteInfo> {
    SITE_REGISTRY.iter().find(|s| s.site == site)
}

/// Path of a site's cleaned export under `data_dir`, or `None` for a site
/// missing from the registry.
pub fn default_source_path(data_dir: &Path, site: Site) -> Option<PathBuf> {
    find_site(site).map(|info| data_dir.join(info.default_file))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
