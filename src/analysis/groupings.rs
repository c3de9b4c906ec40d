//! Merging per-site tables and selecting sites.
//!
//! `UnifiedDataset` is the disjoint union of the loaded site tables.
//! `UnifiedDataset::filter` narrows it to the selected sites and returns a
//! `Selection`: either a non-empty `FilteredTable` or an explicit empty
//! signal. Aggregates only accept `FilteredTable`, so they are never run
//! over zero rows.

use std::collections::BTreeMap;

use crate::ingest::SiteTable;
use crate::logging::{self, Stage};
use crate::model::{Reading, Site};

// ---------------------------------------------------------------------------
// Unified dataset
// ---------------------------------------------------------------------------

/// Every reading of every loaded site. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedDataset {
    rows: Vec<Reading>,
    sites: Vec<Site>,
}

impl UnifiedDataset {
    /// Concatenate site tables, keeping each table's row order.
    ///
    /// No deduplication: every input row appears exactly once.
    pub fn merge<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a SiteTable>,
    {
        let mut rows = Vec::new();
        let mut sites = Vec::new();
        for table in tables {
            rows.extend(table.readings.iter().cloned());
            if !sites.contains(&table.site) {
                sites.push(table.site);
            }
        }
        logging::debug(
            Stage::Merge,
            None,
            &format!("merged {} rows from {} sites", rows.len(), sites.len()),
        );
        UnifiedDataset { rows, sites }
    }

    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    /// Sites that contributed a table, in merge order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn site_rows(&self, site: Site) -> impl Iterator<Item = &Reading> {
        self.rows.iter().filter(move |r| r.site == site)
    }

    /// Keep only rows of the `retain` sites, in dataset order.
    ///
    /// Repeated sites in `retain` are ignored after their first occurrence.
    pub fn filter(&self, retain: &[Site]) -> Selection<'_> {
        let mut sites: Vec<Site> = Vec::with_capacity(retain.len());
        for &site in retain {
            if !sites.contains(&site) {
                sites.push(site);
            }
        }

        if sites.is_empty() {
            logging::info(Stage::Filter, None, "no sites selected");
            return Selection::Empty(EmptySelection::NoSitesSelected);
        }

        let rows: Vec<&Reading> = self
            .rows
            .iter()
            .filter(|r| sites.contains(&r.site))
            .collect();

        if rows.is_empty() {
            logging::warn(
                Stage::Filter,
                None,
                &format!("no rows for selected sites {:?}", sites),
            );
            return Selection::Empty(EmptySelection::NoMatchingRows { sites });
        }

        Selection::Rows(FilteredTable { rows, sites })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Why a selection produced nothing to aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptySelection {
    NoSitesSelected,
    /// Sites were selected but none of them has a row in the dataset.
    NoMatchingRows { sites: Vec<Site> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Empty(EmptySelection),
    Rows(FilteredTable<'a>),
}

impl<'a> Selection<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty(_))
    }

    /// Number of selected rows; zero for an empty selection.
    pub fn len(&self) -> usize {
        match self {
            Selection::Empty(_) => 0,
            Selection::Rows(table) => table.len(),
        }
    }

    pub fn rows(self) -> Option<FilteredTable<'a>> {
        match self {
            Selection::Empty(_) => None,
            Selection::Rows(table) => Some(table),
        }
    }
}

/// A non-empty view of the rows of the selected sites.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTable<'a> {
    rows: Vec<&'a Reading>,
    sites: Vec<Site>,
}

impl<'a> FilteredTable<'a> {
    /// Selected rows in dataset order. Never empty.
    pub fn rows(&self) -> &[&'a Reading] {
        &self.rows
    }

    /// Selected sites in request order, including any without rows.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn site_rows(&self, site: Site) -> impl Iterator<Item = &'a Reading> + '_ {
        self.rows.iter().copied().filter(move |r| r.site == site)
    }

    /// Rows grouped by site, in `Site` order. Sites without rows are absent.
    pub fn group_by_site(&self) -> BTreeMap<Site, Vec<&'a Reading>> {
        let mut groups: BTreeMap<Site, Vec<&'a Reading>> = BTreeMap::new();
        for &row in &self.rows {
            groups.entry(row.site).or_default().push(row);
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
