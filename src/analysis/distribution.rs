//! Box-plot distributions of the irradiance channels, per site.
//!
//! Quartiles interpolate linearly between order statistics. Whiskers
//! reach the most extreme values within 1.5 IQR of the box; anything
//! beyond is counted as an outlier.

use serde_json::Value;

use super::groupings::FilteredTable;
use super::stats;
use crate::model::{Channel, Site};
use crate::table::{self, Table};

const WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: usize,
}

impl BoxStats {
    /// `None` when there are no values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = stats::sorted(values);
        let q1 = stats::quantile(&sorted, 0.25)?;
        let median = stats::quantile(&sorted, 0.5)?;
        let q3 = stats::quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| (low_fence..=high_fence).contains(v))
            .collect();
        // The quartiles always lie inside the fences, so both exist.
        let lower_whisker = inside.first().copied().unwrap_or(q1);
        let upper_whisker = inside.last().copied().unwrap_or(q3);
        let outliers = sorted.len() - inside.len();

        Some(BoxStats {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Box statistics for one (site, channel) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub site: Site,
    pub channel: Channel,
    pub stats: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionTable {
    /// Ordered by site, then channel.
    pub entries: Vec<Distribution>,
}

impl DistributionTable {
    pub fn get(&self, site: Site, channel: Channel) -> Option<&BoxStats> {
        self.entries
            .iter()
            .find(|d| d.site == site && d.channel == channel)?
            .stats
            .as_ref()
    }

    pub fn to_table(&self) -> Table {
        let mut out = Table::new([
            "Site",
            "Channel",
            "count",
            "min",
            "q1",
            "median",
            "q3",
            "max",
            "lower_whisker",
            "upper_whisker",
            "outliers",
        ]);
        for entry in &self.entries {
            let mut row = vec![
                Value::String(entry.site.to_string()),
                Value::String(entry.channel.to_string()),
            ];
            match &entry.stats {
                Some(b) => row.extend([
                    Value::from(b.count),
                    table::number(Some(b.min)),
                    table::number(Some(b.q1)),
                    table::number(Some(b.median)),
                    table::number(Some(b.q3)),
                    table::number(Some(b.max)),
                    table::number(Some(b.lower_whisker)),
                    table::number(Some(b.upper_whisker)),
                    Value::from(b.outliers),
                ]),
                None => row.push(Value::from(0)),
            }
            out.push_row(row);
        }
        out
    }
}

/// Distribution of GHI, DNI and DHI for every selected site with rows.
pub fn distributions(table: &FilteredTable<'_>) -> DistributionTable {
    let mut entries = Vec::new();
    for (site, rows) in table.group_by_site() {
        for channel in Channel::IRRADIANCE {
            let values = stats::channel_values(rows.iter().copied(), channel);
            entries.push(Distribution {
                site,
                channel,
                stats: BoxStats::from_values(&values),
            });
        }
    }
    DistributionTable { entries }
}
