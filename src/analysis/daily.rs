//! Calendar-day resampling, per site.
//!
//! Buckets are whole days of the naive timestamps; no timezone conversion
//! takes place. Days without rows are absent from the output rather than
//! emitted as empty rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use super::groupings::FilteredTable;
use super::stats;
use crate::model::{CLEANING_COLUMN, Channel, Reading, Site};
use crate::table::{self, Table};

/// Channel means of one site over one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMean {
    pub site: Site,
    pub day: NaiveDate,
    /// Rows that fell in this bucket.
    pub rows: usize,
    /// Channels with at least one value that day.
    pub means: BTreeMap<Channel, f64>,
    /// Share of flagged rows among rows with a cleaning flag.
    pub cleaning: Option<f64>,
}

impl DailyMean {
    pub fn mean(&self, channel: Channel) -> Option<f64> {
        self.means.get(&channel).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    /// Sorted by site, then day.
    pub days: Vec<DailyMean>,
}

impl DailySeries {
    pub fn for_site(&self, site: Site) -> impl Iterator<Item = &DailyMean> {
        self.days.iter().filter(move |d| d.site == site)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Columns `Site`, `Day`, one per channel, then `Cleaning`.
    pub fn to_table(&self) -> Table {
        let mut columns = vec!["Site", "Day"];
        columns.extend(Channel::ALL.iter().map(|c| c.column()));
        columns.push(CLEANING_COLUMN);
        let mut out = Table::new(columns);

        for day in &self.days {
            let mut row = vec![
                Value::String(day.site.to_string()),
                Value::String(day.day.format("%Y-%m-%d").to_string()),
            ];
            row.extend(Channel::ALL.iter().map(|&c| table::number(day.mean(c))));
            row.push(table::number(day.cleaning));
            out.push_row(row);
        }
        out
    }
}

/// Mean of every channel per (site, day), ignoring missing values.
///
/// The output does not depend on the order of the input rows.
pub fn daily_means(table: &FilteredTable<'_>) -> DailySeries {
    let mut buckets: BTreeMap<(Site, NaiveDate), Vec<&Reading>> = BTreeMap::new();
    for &row in table.rows() {
        buckets
            .entry((row.site, row.timestamp.date()))
            .or_default()
            .push(row);
    }

    let days = buckets
        .into_iter()
        .map(|((site, day), rows)| {
            let means = Channel::ALL
                .into_iter()
                .filter_map(|channel| {
                    let values = stats::channel_values(rows.iter().copied(), channel);
                    stats::mean(&values).map(|m| (channel, m))
                })
                .collect();
            let flags: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.cleaning)
                .map(|flag| if flag { 1.0 } else { 0.0 })
                .collect();
            DailyMean {
                site,
                day,
                rows: rows.len(),
                means,
                cleaning: stats::mean(&flags),
            }
        })
        .collect();

    DailySeries { days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::groupings::UnifiedDataset;
    use crate::ingest::{LoadReport, SiteTable};
    use chrono::NaiveDateTime;
    use serde_json::json;
    use std::path::PathBuf;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn site_table(site: Site, rows: Vec<Reading>) -> SiteTable {
        SiteTable {
            site,
            source: PathBuf::new(),
            readings: rows,
            report: LoadReport::default(),
        }
    }

    #[test]
    fn test_buckets_by_calendar_day_per_site() {
        let tables = [
            site_table(
                Site::Benin,
                vec![
                    Reading::empty(Site::Benin, at(1, 0)).with(Channel::Ghi, 0.0),
                    Reading::empty(Site::Benin, at(1, 12)).with(Channel::Ghi, 800.0),
                    Reading::empty(Site::Benin, at(1, 23)).with(Channel::Ghi, 10.0),
                    Reading::empty(Site::Benin, at(2, 12)).with(Channel::Ghi, 600.0),
                ],
            ),
            site_table(
                Site::Togo,
                vec![Reading::empty(Site::Togo, at(1, 12)).with(Channel::Ghi, 500.0)],
            ),
        ];
        let data = UnifiedDataset::merge(&tables);
        let series = daily_means(&data.filter(&Site::ALL).rows().unwrap());

        assert_eq!(series.len(), 3);
        let benin: Vec<_> = series.for_site(Site::Benin).collect();
        assert_eq!(benin.len(), 2);
        assert_eq!(benin[0].day, at(1, 0).date());
        assert_eq!(benin[0].rows, 3);
        assert_eq!(benin[0].mean(Channel::Ghi), Some(270.0));
        assert_eq!(benin[1].mean(Channel::Ghi), Some(600.0));
        assert_eq!(series.days[2].site, Site::Togo);
    }

    #[test]
    fn test_days_without_rows_are_absent() {
        let tables = [site_table(
            Site::Togo,
            vec![
                Reading::empty(Site::Togo, at(1, 12)).with(Channel::Ghi, 1.0),
                Reading::empty(Site::Togo, at(5, 12)).with(Channel::Ghi, 5.0),
            ],
        )];
        let data = UnifiedDataset::merge(&tables);
        let series = daily_means(&data.filter(&[Site::Togo]).rows().unwrap());
        let days: Vec<u32> = series
            .days
            .iter()
            .map(|d| chrono::Datelike::day(&d.day))
            .collect();
        assert_eq!(days, vec![1, 5]);
    }

    #[test]
    fn test_missing_channel_values_are_skipped_per_channel() {
        let tables = [site_table(
            Site::Benin,
            vec![
                Reading::empty(Site::Benin, at(1, 6))
                    .with(Channel::Ghi, 100.0)
                    .with(Channel::Tamb, 20.0),
                Reading::empty(Site::Benin, at(1, 7)).with(Channel::Ghi, 300.0),
            ],
        )];
        let data = UnifiedDataset::merge(&tables);
        let series = daily_means(&data.filter(&[Site::Benin]).rows().unwrap());
        let day = &series.days[0];
        assert_eq!(day.mean(Channel::Ghi), Some(200.0));
        assert_eq!(day.mean(Channel::Tamb), Some(20.0));
        assert_eq!(day.mean(Channel::Rh), None);
    }

    #[test]
    fn test_cleaning_share_is_mean_of_flag() {
        let tables = [site_table(
            Site::Benin,
            vec![
                Reading::empty(Site::Benin, at(1, 1)).with_cleaning(true),
                Reading::empty(Site::Benin, at(1, 2)).with_cleaning(false),
                Reading::empty(Site::Benin, at(1, 3)).with_cleaning(false),
                Reading::empty(Site::Benin, at(1, 4)).with_cleaning(false),
            ],
        )];
        let data = UnifiedDataset::merge(&tables);
        let series = daily_means(&data.filter(&[Site::Benin]).rows().unwrap());
        assert_eq!(series.days[0].cleaning, Some(0.25));
    }

    #[test]
    fn test_table_has_a_column_per_channel() {
        let tables = [site_table(
            Site::Benin,
            vec![Reading::empty(Site::Benin, at(3, 1)).with(Channel::Ws, 2.5)],
        )];
        let data = UnifiedDataset::merge(&tables);
        let table = daily_means(&data.filter(&[Site::Benin]).rows().unwrap()).to_table();
        assert_eq!(table.columns.len(), 2 + Channel::ALL.len() + 1);
        assert_eq!(table.rows[0]["Day"], json!("2021-08-03"));
        assert_eq!(table.rows[0]["WS"], json!(2.5));
        assert_eq!(table.rows[0]["GHI"], Value::Null);
    }
}
