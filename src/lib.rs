//! Solar site monitoring: loads cleaned per-site sensor exports and builds
//! the comparison views of the solar dashboard.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod sites;
pub mod table;
pub mod verify;

pub use config::Config;
pub use model::{Channel, ConfigError, PipelineError, Reading, Site, SourceError};
pub use pipeline::{DashboardOutcome, DashboardRequest, DashboardViews, build_views, run};
