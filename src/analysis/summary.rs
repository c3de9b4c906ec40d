//! Cross-site summary statistics of the irradiance channels.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::groupings::FilteredTable;
use super::stats;
use crate::model::{Channel, Site};
use crate::table::{self, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Mean,
    Median,
    Std,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Mean, Statistic::Median, Statistic::Std];

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Std => "std",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mean, median and sample standard deviation of one channel at one site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
}

impl ChannelStats {
    pub fn from_values(values: &[f64]) -> Self {
        ChannelStats {
            mean: stats::mean(values),
            median: stats::median(values),
            std: stats::sample_std(values),
        }
    }

    pub fn get(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
            Statistic::Std => self.std,
        }
    }
}

/// Per-site statistics of GHI, DNI and DHI.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub sites: BTreeMap<Site, BTreeMap<Channel, ChannelStats>>,
}

impl SummaryTable {
    pub fn get(&self, site: Site, channel: Channel, statistic: Statistic) -> Option<f64> {
        self.sites.get(&site)?.get(&channel)?.get(statistic)
    }

    /// One row per site; one column per (channel, statistic), e.g.
    /// `GHI - mean`, each formatted with two decimals.
    pub fn to_table(&self) -> Table {
        let mut columns = vec!["Site".to_string()];
        for channel in Channel::IRRADIANCE {
            for statistic in Statistic::ALL {
                columns.push(format!("{} - {}", channel, statistic));
            }
        }
        let mut out = Table::new(columns);

        for (site, channels) in &self.sites {
            let mut row = vec![Value::String(site.to_string())];
            for channel in Channel::IRRADIANCE {
                let stats = channels.get(&channel).copied().unwrap_or_default();
                for statistic in Statistic::ALL {
                    row.push(table::two_decimals(stats.get(statistic)));
                }
            }
            out.push_row(row);
        }
        out
    }
}

/// Mean, median and sample std of each irradiance channel, per site,
/// ignoring missing values.
pub fn summarize(table: &FilteredTable<'_>) -> SummaryTable {
    let sites = table
        .group_by_site()
        .into_iter()
        .map(|(site, rows)| {
            let channels = Channel::IRRADIANCE
                .into_iter()
                .map(|channel| {
                    let values = stats::channel_values(rows.iter().copied(), channel);
                    (channel, ChannelStats::from_values(&values))
                })
                .collect();
            (site, channels)
        })
        .collect();
    SummaryTable { sites }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::groupings::UnifiedDataset;
    use crate::ingest::{LoadReport, SiteTable};
    use crate::model::Reading;
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use std::path::PathBuf;

    fn site_table(site: Site, ghi: &[Option<f64>]) -> SiteTable {
        let t0 = NaiveDate::from_ymd_opt(2021, 8, 9)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let readings = ghi
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut r = Reading::empty(site, t0 + Duration::minutes(i as i64));
                r.ghi = *v;
                r.dni = v.map(|v| v * 2.0);
                r
            })
            .collect();
        SiteTable {
            site,
            source: PathBuf::new(),
            readings,
            report: LoadReport::default(),
        }
    }

    #[test]
    fn test_ten_twenty_thirty_summarizes_to_twenty_twenty_ten() {
        let tables = [site_table(Site::Benin, &[Some(10.0), Some(20.0), Some(30.0)])];
        let data = UnifiedDataset::merge(&tables);
        let selected = data.filter(&[Site::Benin]).rows().unwrap();
        let summary = summarize(&selected);

        let table = summary.to_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0]["Site"], json!("Benin"));
        assert_eq!(table.rows[0]["GHI - mean"], json!("20.00"));
        assert_eq!(table.rows[0]["GHI - median"], json!("20.00"));
        assert_eq!(table.rows[0]["GHI - std"], json!("10.00"));
        assert_eq!(table.rows[0]["DNI - mean"], json!("40.00"));
    }

    #[test]
    fn test_missing_values_are_ignored() {
        let tables = [site_table(Site::Togo, &[Some(10.0), None, Some(30.0), None])];
        let data = UnifiedDataset::merge(&tables);
        let summary = summarize(&data.filter(&[Site::Togo]).rows().unwrap());
        assert_eq!(summary.get(Site::Togo, Channel::Ghi, Statistic::Mean), Some(20.0));
    }

    #[test]
    fn test_channel_without_values_renders_null_not_zero() {
        let tables = [site_table(Site::Togo, &[Some(1.0)])];
        let data = UnifiedDataset::merge(&tables);
        let summary = summarize(&data.filter(&[Site::Togo]).rows().unwrap());

        // DHI never set; std of a single value is undefined
        assert_eq!(summary.get(Site::Togo, Channel::Dhi, Statistic::Mean), None);
        assert_eq!(summary.get(Site::Togo, Channel::Ghi, Statistic::Std), None);
        let table = summary.to_table();
        assert_eq!(table.rows[0]["DHI - mean"], Value::Null);
        assert_eq!(table.rows[0]["GHI - std"], Value::Null);
        assert_eq!(table.rows[0]["GHI - mean"], json!("1.00"));
    }

    #[test]
    fn test_results_only_for_selected_sites() {
        let tables = [
            site_table(Site::Benin, &[Some(1.0)]),
            site_table(Site::SierraLeone, &[Some(2.0)]),
            site_table(Site::Togo, &[Some(3.0)]),
        ];
        let data = UnifiedDataset::merge(&tables);
        let summary = summarize(&data.filter(&[Site::Togo, Site::Benin]).rows().unwrap());
        let sites: Vec<_> = summary.sites.keys().copied().collect();
        assert_eq!(sites, vec![Site::Benin, Site::Togo]);
    }

    #[test]
    fn test_column_layout() {
        let summary = SummaryTable {
            sites: BTreeMap::new(),
        };
        let table = summary.to_table();
        assert_eq!(table.columns.len(), 1 + 3 * 3);
        assert_eq!(table.columns[1], "GHI - mean");
        assert_eq!(table.columns[9], "DHI - std");
        assert!(table.is_empty());
    }
}
