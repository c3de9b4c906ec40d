//! Service configuration.
//!
//! Read from a TOML file, with every key optional:
//!
//! ```toml
//! data_dir = "dashboard_data"
//! sample_cap = 5000
//! default_sites = ["Benin"]
//! load_policy = "partial"
//! sample_seed = 42
//!
//! [logging]
//! level = "info"
//! file = "solmon.log"
//!
//! [sources]
//! "Sierra Leone" = "/elsewhere/sl.csv"
//! ```
//!
//! `Config::from_env` also reads `.env` and lets `SOLMON_DATA_DIR` and
//! `SOLMON_SAMPLE_CAP` override the file.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::sample::DEFAULT_SAMPLE_CAP;
use crate::ingest::{LoadPolicy, SiteSource};
use crate::logging::{self, LogLevel, Stage};
use crate::model::{ConfigError, Site};
use crate::sites;

pub const CONFIG_PATH_VAR: &str = "SOLMON_CONFIG";
pub const DATA_DIR_VAR: &str = "SOLMON_DATA_DIR";
pub const SAMPLE_CAP_VAR: &str = "SOLMON_SAMPLE_CAP";

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_sample_cap")]
    sample_cap: usize,
    #[serde(default = "default_sites")]
    default_sites: Vec<String>,
    #[serde(default)]
    load_policy: LoadPolicy,
    #[serde(default)]
    sample_seed: Option<u64>,
    #[serde(default)]
    logging: LoggingFile,
    #[serde(default)]
    sources: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingFile {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    console_timestamps: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("dashboard_data")
}

fn default_sample_cap() -> usize {
    DEFAULT_SAMPLE_CAP
}

fn default_sites() -> Vec<String> {
    vec![Site::Benin.label().to_string()]
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the cleaned per-site exports.
    pub data_dir: PathBuf,
    /// Upper bound on the scatter sample; never zero.
    pub sample_cap: usize,
    /// Sites selected when the caller does not choose any.
    pub default_sites: Vec<Site>,
    pub load_policy: LoadPolicy,
    /// Fixed sampling seed; `None` lets the caller pick one.
    pub sample_seed: Option<u64>,
    pub logging: LoggingConfig,
    /// Per-site source paths that replace `data_dir/<default file>`.
    pub source_overrides: BTreeMap<Site, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            sample_cap: DEFAULT_SAMPLE_CAP,
            default_sites: vec![Site::Benin],
            load_policy: LoadPolicy::default(),
            sample_seed: None,
            logging: LoggingConfig::default(),
            source_overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Configuration for the running process.
    ///
    /// Reads `.env` if present, loads the file named by `SOLMON_CONFIG`
    /// (defaults when unset), then applies the `SOLMON_DATA_DIR` and
    /// `SOLMON_SAMPLE_CAP` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Config::default(),
        };
        config.apply_overrides(
            env::var_os(DATA_DIR_VAR).map(PathBuf::from),
            env::var(SAMPLE_CAP_VAR).ok(),
        )?;
        Ok(config)
    }

    fn apply_overrides(
        &mut self,
        data_dir: Option<PathBuf>,
        sample_cap: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = data_dir {
            logging::debug(
                Stage::Config,
                None,
                &format!("data_dir overridden to {}", dir.display()),
            );
            self.data_dir = dir;
        }
        if let Some(raw) = sample_cap {
            let cap = raw.trim().parse::<usize>().map_err(|_| {
                ConfigError::Invalid(format!("{} is not a row count: '{}'", SAMPLE_CAP_VAR, raw))
            })?;
            self.sample_cap = validate_sample_cap(cap)?;
        }
        Ok(())
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let default_sites = file
            .default_sites
            .iter()
            .map(|name| name.parse::<Site>())
            .collect::<Result<Vec<_>, _>>()?;

        let source_overrides = file
            .sources
            .into_iter()
            .map(|(name, path)| Ok((name.parse::<Site>()?, path)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let level = match file.logging.level.as_deref() {
            Some(raw) => raw.parse::<LogLevel>()?,
            None => LogLevel::Info,
        };

        Ok(Config {
            data_dir: file.data_dir,
            sample_cap: validate_sample_cap(file.sample_cap)?,
            default_sites,
            load_policy: file.load_policy,
            sample_seed: file.sample_seed,
            logging: LoggingConfig {
                level,
                file: file.logging.file,
                console_timestamps: file.logging.console_timestamps,
            },
            source_overrides,
        })
    }

    /// Source of one site: its override, or the registry file under
    /// `data_dir`.
    pub fn source_path(&self, site: Site) -> Option<PathBuf> {
        match self.source_overrides.get(&site) {
            Some(path) => Some(path.clone()),
            None => sites::default_source_path(&self.data_dir, site),
        }
    }

    /// Sources of every registered site, in site order.
    pub fn sources(&self) -> Vec<SiteSource> {
        sites::all_sites()
            .into_iter()
            .filter_map(|site| self.source_path(site).map(|path| SiteSource::new(site, path)))
            .collect()
    }
}

fn validate_sample_cap(cap: usize) -> Result<usize, ConfigError> {
    if cap == 0 {
        return Err(ConfigError::Invalid("sample_cap must be at least 1".to_string()));
    }
    Ok(cap)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_dir, PathBuf::from("dashboard_data"));
        assert_eq!(config.sample_cap, 5000);
        assert_eq!(config.default_sites, vec![Site::Benin]);
        assert_eq!(config.load_policy, LoadPolicy::Abort);
        assert_eq!(config.sample_seed, None);
    }

    #[test]
    fn test_full_file_is_parsed() {
        let toml = r#"
data_dir = "/data/solar"
sample_cap = 250
default_sites = ["togo", "Sierra Leone"]
load_policy = "partial"
sample_seed = 42

[logging]
level = "warning"
file = "solmon.log"
console_timestamps = true

[sources]
"sierra_leone" = "/elsewhere/sl.csv"
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data/solar"));
        assert_eq!(config.sample_cap, 250);
        assert_eq!(config.default_sites, vec![Site::Togo, Site::SierraLeone]);
        assert_eq!(config.load_policy, LoadPolicy::Partial);
        assert_eq!(config.sample_seed, Some(42));
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.logging.file, Some(PathBuf::from("solmon.log")));
        assert!(config.logging.console_timestamps);
        assert_eq!(
            config.source_overrides.get(&Site::SierraLeone),
            Some(&PathBuf::from("/elsewhere/sl.csv"))
        );
    }

    #[test]
    fn test_unknown_default_site_is_rejected() {
        let err = Config::from_toml_str(r#"default_sites = ["Ghana"]"#).unwrap_err();
        assert!(
            matches!(err, ConfigError::UnknownSite(ref name) if name == "Ghana"),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_unknown_source_override_is_rejected() {
        let toml = "[sources]\nMali = \"mali.csv\"\n";
        assert!(matches!(
            Config::from_toml_str(toml),
            Err(ConfigError::UnknownSite(_))
        ));
    }

    #[test]
    fn test_zero_sample_cap_is_rejected() {
        assert!(matches!(
            Config::from_toml_str("sample_cap = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_load_policy_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml_str(r#"load_policy = "sometimes""#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let toml = "[logging]\nlevel = \"loud\"\n";
        assert!(matches!(
            Config::from_toml_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_sources_use_override_or_registry_file() {
        let mut config = Config {
            data_dir: PathBuf::from("/data"),
            ..Config::default()
        };
        config
            .source_overrides
            .insert(Site::Togo, PathBuf::from("/mnt/togo.csv"));

        let sources = config.sources();
        assert_eq!(
            sources,
            vec![
                SiteSource::new(Site::Benin, "/data/benin_clean.csv"),
                SiteSource::new(Site::SierraLeone, "/data/sierraleone_clean.csv"),
                SiteSource::new(Site::Togo, "/mnt/togo.csv"),
            ]
        );
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = Config::default();
        config
            .apply_overrides(Some(PathBuf::from("/tmp/other")), Some(" 12 ".to_string()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/other"));
        assert_eq!(config.sample_cap, 12);
    }

    #[test]
    fn test_invalid_sample_cap_override_is_rejected() {
        let mut config = Config::default();
        assert!(config.apply_overrides(None, Some("lots".to_string())).is_err());
        assert!(config.apply_overrides(None, Some("0".to_string())).is_err());
        assert_eq!(config.sample_cap, DEFAULT_SAMPLE_CAP);
    }

    #[test]
    fn test_missing_config_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solmon.toml");
        fs::write(&path, "sample_cap = 10\nload_policy = \"partial\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.sample_cap, 10);
        assert_eq!(config.load_policy, LoadPolicy::Partial);
    }
}
