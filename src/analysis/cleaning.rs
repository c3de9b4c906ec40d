//! Cleaning impact: module sensor means split by the cleaning flag.

use std::collections::BTreeMap;

use serde_json::Value;

use super::groupings::FilteredTable;
use super::stats;
use crate::model::{Channel, Reading, Site};
use crate::table::{self, Table};

/// Mean ModA and ModB per (site, cleaning flag).
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningImpact {
    pub groups: BTreeMap<(Site, bool), BTreeMap<Channel, Option<f64>>>,
}

impl CleaningImpact {
    pub fn get(&self, site: Site, cleaned: bool, channel: Channel) -> Option<f64> {
        *self.groups.get(&(site, cleaned))?.get(&channel)?
    }

    /// Columns `Site`, `Cleaning`, `ModA`, `ModB`; one row per group.
    pub fn to_table(&self) -> Table {
        let mut columns = vec!["Site", "Cleaning"];
        columns.extend(Channel::MODULE.iter().map(|c| c.column()));
        let mut out = Table::new(columns);

        for ((site, cleaned), means) in &self.groups {
            let mut row = vec![Value::String(site.to_string()), Value::Bool(*cleaned)];
            for channel in Channel::MODULE {
                row.push(table::number(means.get(&channel).copied().flatten()));
            }
            out.push_row(row);
        }
        out
    }
}

/// Group by (site, cleaning flag) and average the module channels,
/// ignoring missing values. Rows without a flag belong to no group.
pub fn cleaning_impact(table: &FilteredTable<'_>) -> CleaningImpact {
    let mut grouped: BTreeMap<(Site, bool), Vec<&Reading>> = BTreeMap::new();
    for &row in table.rows() {
        if let Some(cleaned) = row.cleaning {
            grouped.entry((row.site, cleaned)).or_default().push(row);
        }
    }

    let groups = grouped
        .into_iter()
        .map(|(key, rows)| {
            let means = Channel::MODULE
                .into_iter()
                .map(|channel| {
                    let values = stats::channel_values(rows.iter().copied(), channel);
                    (channel, stats::mean(&values))
                })
                .collect();
            (key, means)
        })
        .collect();
    CleaningImpact { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::groupings::UnifiedDataset;
    use crate::ingest::{LoadReport, SiteTable};
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use std::path::PathBuf;

    fn benin(rows: &[(Option<bool>, Option<f64>)]) -> SiteTable {
        let t0 = NaiveDate::from_ymd_opt(2021, 8, 9)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SiteTable {
            site: Site::Benin,
            source: PathBuf::new(),
            readings: rows
                .iter()
                .enumerate()
                .map(|(i, (flag, mod_a))| {
                    let mut r = Reading::empty(Site::Benin, t0 + Duration::minutes(i as i64));
                    r.cleaning = *flag;
                    r.mod_a = *mod_a;
                    r
                })
                .collect(),
            report: LoadReport::default(),
        }
    }

    #[test]
    fn test_means_split_by_cleaning_flag() {
        let tables = [benin(&[
            (Some(true), Some(5.0)),
            (Some(true), Some(7.0)),
            (Some(false), Some(1.0)),
            (Some(false), Some(3.0)),
        ])];
        let data = UnifiedDataset::merge(&tables);
        let impact = cleaning_impact(&data.filter(&[Site::Benin]).rows().unwrap());

        assert_eq!(impact.groups.len(), 2);
        assert_eq!(impact.get(Site::Benin, true, Channel::ModA), Some(6.0));
        assert_eq!(impact.get(Site::Benin, false, Channel::ModA), Some(2.0));
        assert_eq!(impact.get(Site::Benin, true, Channel::ModB), None);
    }

    #[test]
    fn test_rows_without_flag_are_not_grouped() {
        let tables = [benin(&[(None, Some(100.0)), (Some(false), Some(4.0))])];
        let data = UnifiedDataset::merge(&tables);
        let impact = cleaning_impact(&data.filter(&[Site::Benin]).rows().unwrap());
        assert_eq!(impact.groups.len(), 1);
        assert_eq!(impact.get(Site::Benin, false, Channel::ModA), Some(4.0));
    }

    #[test]
    fn test_table_rows_are_ordered_false_then_true() {
        let tables = [benin(&[(Some(true), Some(5.0)), (Some(false), Some(1.0))])];
        let data = UnifiedDataset::merge(&tables);
        let table = cleaning_impact(&data.filter(&[Site::Benin]).rows().unwrap()).to_table();
        assert_eq!(table.columns, vec!["Site", "Cleaning", "ModA", "ModB"]);
        assert_eq!(table.column("Cleaning"), vec![&json!(false), &json!(true)]);
        assert_eq!(table.rows[1]["ModA"], json!(5.0));
        assert_eq!(table.rows[1]["ModB"], Value::Null);
    }
}
