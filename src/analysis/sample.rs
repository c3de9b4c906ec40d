//! Bounded random sample for scatter exploration.
//!
//! The seed is always explicit; drawing from system entropy is left to the
//! outermost caller.

use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use super::groupings::FilteredTable;
use crate::model::{Channel, Reading};
use crate::table::{self, Table};

/// Default cap on the number of sampled rows.
pub const DEFAULT_SAMPLE_CAP: usize = 5000;

/// Channels rendered for the scatter view: irradiance against ambient
/// temperature, sized by humidity.
pub const SCATTER_CHANNELS: [Channel; 3] = [Channel::Ghi, Channel::Tamb, Channel::Rh];

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSample {
    /// Copies of the sampled rows, in table order.
    pub rows: Vec<Reading>,
    /// Rows available before sampling.
    pub population: usize,
    pub seed: u64,
}

impl ScatterSample {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_table(&self) -> Table {
        let mut columns = vec!["Site", "Timestamp"];
        columns.extend(SCATTER_CHANNELS.iter().map(|c| c.column()));
        let mut out = Table::new(columns);
        for row in &self.rows {
            let mut values = vec![
                Value::String(row.site.to_string()),
                Value::String(format_timestamp(row.timestamp)),
            ];
            values.extend(SCATTER_CHANNELS.iter().map(|&c| table::number(row.value(c))));
            out.push_row(values);
        }
        out
    }
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Draw `min(cap, rows)` rows uniformly without replacement.
///
/// The same table, cap and seed always give the same sample.
pub fn bounded_sample(table: &FilteredTable<'_>, cap: usize, seed: u64) -> ScatterSample {
    let population = table.len();
    let amount = cap.min(population);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut indices = rand::seq::index::sample(&mut rng, population, amount).into_vec();
    indices.sort_unstable();

    ScatterSample {
        rows: indices
            .into_iter()
            .map(|i| table.rows()[i].clone())
            .collect(),
        population,
        seed,
    }
}
