//! Dashboard pipeline: load, merge, select, build views.
//!
//! An empty selection stops here with `DashboardOutcome::NothingSelected`
//! and no aggregate runs. Otherwise every view is computed once from the
//! same `FilteredTable`.

use crate::analysis::{
    CleaningImpact, DailySeries, DistributionTable, EmptySelection, ScatterSample, Selection,
    SummaryTable, UnifiedDataset, WindRose, bounded_sample, cleaning_impact, daily_means,
    distributions, summarize, wind_rose,
};
use crate::config::Config;
use crate::ingest::{self, SourceCache};
use crate::logging::{self, Stage};
use crate::model::{PipelineError, Site};
use crate::table::Table;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// What the caller wants to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    /// Selected sites, in display order.
    pub sites: Vec<Site>,
    pub sample_cap: usize,
    pub seed: u64,
}

impl DashboardRequest {
    pub fn new(sites: Vec<Site>, sample_cap: usize, seed: u64) -> Self {
        DashboardRequest {
            sites,
            sample_cap,
            seed,
        }
    }

    /// The configured default selection. `seed` is used when the config
    /// does not fix one.
    pub fn from_config(config: &Config, seed: u64) -> Self {
        DashboardRequest {
            sites: config.default_sites.clone(),
            sample_cap: config.sample_cap,
            seed: config.sample_seed.unwrap_or(seed),
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    /// Selected sites in request order.
    pub selected: Vec<Site>,
    pub summary: SummaryTable,
    pub distribution: DistributionTable,
    pub daily: DailySeries,
    pub sample: ScatterSample,
    pub cleaning: CleaningImpact,
    /// One rose per selected site, in request order.
    pub wind_roses: Vec<WindRose>,
}

impl DashboardViews {
    pub fn wind_rose(&self, site: Site) -> Option<&WindRose> {
        self.wind_roses.iter().find(|r| r.site == site)
    }

    /// Every view as a named table, in dashboard order.
    pub fn tables(&self) -> Vec<(String, Table)> {
        let mut tables = vec![
            ("summary".to_string(), self.summary.to_table()),
            ("distribution".to_string(), self.distribution.to_table()),
            ("daily".to_string(), self.daily.to_table()),
            ("sample".to_string(), self.sample.to_table()),
            ("cleaning".to_string(), self.cleaning.to_table()),
        ];
        for rose in &self.wind_roses {
            tables.push((format!("wind_rose/{}", rose.site), rose.to_table()));
        }
        tables
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardOutcome {
    /// Nothing to aggregate; the reason is shown instead of the views.
    NothingSelected(EmptySelection),
    Views(DashboardViews),
}

impl DashboardOutcome {
    pub fn views(&self) -> Option<&DashboardViews> {
        match self {
            DashboardOutcome::NothingSelected(_) => None,
            DashboardOutcome::Views(views) => Some(views),
        }
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Select the requested sites and compute every view.
pub fn build_views(dataset: &UnifiedDataset, request: &DashboardRequest) -> DashboardOutcome {
    let table = match dataset.filter(&request.sites) {
        Selection::Empty(reason) => return DashboardOutcome::NothingSelected(reason),
        Selection::Rows(table) => table,
    };

    logging::info(
        Stage::Aggregate,
        None,
        &format!("building views over {} rows of {:?}", table.len(), table.sites()),
    );

    let summary = summarize(&table);
    let distribution = distributions(&table);
    let cleaning = cleaning_impact(&table);
    let sample = bounded_sample(&table, request.sample_cap, request.seed);

    let daily = daily_means(&table);
    logging::debug(
        Stage::Resample,
        None,
        &format!("{} site-days", daily.len()),
    );

    let wind_roses: Vec<WindRose> = table
        .sites()
        .iter()
        .map(|&site| {
            let rose = wind_rose(site, table.site_rows(site));
            logging::debug(
                Stage::Wind,
                Some(site),
                &format!("{} rows binned into {} cells", rose.total(), rose.bins.len()),
            );
            rose
        })
        .collect();

    DashboardOutcome::Views(DashboardViews {
        selected: table.sites().to_vec(),
        summary,
        distribution,
        daily,
        sample,
        cleaning,
        wind_roses,
    })
}

/// Load every configured source through `cache`, merge and build views.
///
/// Load failures follow the configured `LoadPolicy`: under `Abort` the
/// first one is returned, under `Partial` the surviving sites are used.
pub fn run(
    config: &Config,
    cache: &mut SourceCache,
    request: &DashboardRequest,
) -> Result<DashboardOutcome, PipelineError> {
    let loaded = ingest::load_sites(cache, &config.sources(), config.load_policy)?;
    let dataset = UnifiedDataset::merge(loaded.tables.iter().map(|t| t.as_ref()));
    Ok(build_views(&dataset, request))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
