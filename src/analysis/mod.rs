//! Dashboard views computed over a selection of sites.
//!
//! Every aggregate takes a `FilteredTable`, which only exists when the
//! selection has rows, so nothing here ever sees an empty input.
//!
//! Submodules:
//! - `groupings` — merges site tables and filters them by site.
//! - `stats` — shared descriptive statistics over one channel.
//! - `summary` — mean, median and std of the irradiance channels.
//! - `distribution` — box-plot statistics of the irradiance channels.
//! - `cleaning` — module sensor means split by the cleaning flag.
//! - `sample` — bounded, seeded sample for the scatter view.
//! - `daily` — calendar-day means per site.
//! - `wind_rose` — direction sector and speed band counts per site.

pub mod cleaning;
pub mod daily;
pub mod distribution;
pub mod groupings;
pub mod sample;
pub mod stats;
pub mod summary;
pub mod wind_rose;

pub use cleaning::{CleaningImpact, cleaning_impact};
pub use daily::{DailyMean, DailySeries, daily_means};
pub use distribution::{BoxStats, DistributionTable, distributions};
pub use groupings::{EmptySelection, FilteredTable, Selection, UnifiedDataset};
pub use sample::{DEFAULT_SAMPLE_CAP, ScatterSample, bounded_sample};
pub use summary::{Statistic, SummaryTable, summarize};
pub use wind_rose::{Sector, SpeedBand, WindRose, wind_rose};
