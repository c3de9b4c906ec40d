/// Property tests for the dashboard views
///
/// These tests verify:
/// 1. Daily means and summaries do not depend on row order
/// 2. A wind rose counts exactly the rows with a valid direction and speed
/// 3. Filtering keeps exactly the rows of the selected sites
/// 4. The scatter sample never exceeds its cap or repeats a row

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use solmon_service::analysis::wind_rose::{Sector, SpeedBand};
use solmon_service::analysis::{
    Selection, UnifiedDataset, bounded_sample, daily_means, summarize, wind_rose,
};
use solmon_service::ingest::{LoadReport, SiteTable};
use solmon_service::{Channel, Reading, Site};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn origin() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 8, 9)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn site_strategy() -> impl Strategy<Value = Site> {
    prop_oneof![Just(Site::Benin), Just(Site::SierraLeone), Just(Site::Togo)]
}

/// A reading within a five-day window with arbitrary, possibly missing,
/// GHI and wind values.
fn reading_strategy() -> impl Strategy<Value = Reading> {
    (
        site_strategy(),
        0i64..5 * 24 * 60,
        proptest::option::of(0.0..1200.0f64),
        proptest::option::of(-20.0..380.0f64),
        proptest::option::of(-2.0..25.0f64),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(site, minutes, ghi, wd, ws, cleaning)| {
            let mut r = Reading::empty(site, origin() + Duration::minutes(minutes));
            r.ghi = ghi;
            r.wd = wd;
            r.ws = ws;
            r.cleaning = cleaning;
            r
        })
}

fn tables_from(rows: &[Reading]) -> Vec<SiteTable> {
    Site::ALL
        .iter()
        .map(|&site| SiteTable {
            site,
            source: PathBuf::new(),
            readings: rows.iter().filter(|r| r.site == site).cloned().collect(),
            report: LoadReport::default(),
        })
        .collect()
}

fn rows_and_permutation() -> impl Strategy<Value = (Vec<Reading>, Vec<Reading>)> {
    prop::collection::vec(reading_strategy(), 1..80)
        .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_daily_means_ignore_row_order((rows, shuffled) in rows_and_permutation()) {
        let a = UnifiedDataset::merge(&tables_from(&rows));
        let b = UnifiedDataset::merge(&tables_from(&shuffled));
        let ta = a.filter(&Site::ALL).rows().unwrap();
        let tb = b.filter(&Site::ALL).rows().unwrap();

        prop_assert_eq!(daily_means(&ta), daily_means(&tb));
        prop_assert_eq!(summarize(&ta), summarize(&tb));
    }

    #[test]
    fn prop_wind_rose_total_counts_valid_rows(rows in prop::collection::vec(reading_strategy(), 0..120)) {
        for site in Site::ALL {
            let rose = wind_rose(site, &rows);
            let valid = rows
                .iter()
                .filter(|r| r.site == site)
                .filter(|r| r.wd.and_then(Sector::from_degrees).is_some())
                .filter(|r| r.ws.and_then(SpeedBand::from_speed).is_some())
                .count();
            prop_assert_eq!(rose.total(), valid);
            prop_assert!(rose.bins.values().all(|&c| c > 0));
        }
    }

    #[test]
    fn prop_valid_directions_always_have_a_sector(deg in 0.0..=360.0f64) {
        prop_assert!(Sector::from_degrees(deg).is_some());
    }

    #[test]
    fn prop_filter_keeps_exactly_selected_rows(
        rows in prop::collection::vec(reading_strategy(), 0..80),
        pick in prop::collection::vec(site_strategy(), 0..4),
    ) {
        let data = UnifiedDataset::merge(&tables_from(&rows));
        let expected = rows.iter().filter(|r| pick.contains(&r.site)).count();

        match data.filter(&pick) {
            Selection::Empty(_) => prop_assert_eq!(expected, 0),
            Selection::Rows(table) => {
                prop_assert_eq!(table.len(), expected);
                prop_assert!(table.rows().iter().all(|r| pick.contains(&r.site)));
                prop_assert!(!table.is_empty());
            }
        }
    }

    #[test]
    fn prop_sample_is_bounded_and_distinct(
        rows in prop::collection::vec(reading_strategy(), 1..200),
        cap in 1usize..50,
        seed in any::<u64>(),
    ) {
        let data = UnifiedDataset::merge(&tables_from(&rows));
        let table = data.filter(&Site::ALL).rows().unwrap();
        let sample = bounded_sample(&table, cap, seed);

        prop_assert_eq!(sample.len(), cap.min(table.len()));
        prop_assert_eq!(sample.population, table.len());
        prop_assert_eq!(&sample, &bounded_sample(&table, cap, seed));
    }
}

#[test]
fn test_daily_ghi_matches_hand_computed_mean() {
    let rows: Vec<Reading> = [5.0, 1.0, 3.0]
        .iter()
        .enumerate()
        .map(|(i, &ghi)| {
            Reading::empty(Site::Togo, origin() + Duration::hours(i as i64)).with(Channel::Ghi, ghi)
        })
        .collect();
    let data = UnifiedDataset::merge(&tables_from(&rows));
    let series = daily_means(&data.filter(&[Site::Togo]).rows().unwrap());
    assert_eq!(series.days.len(), 1);
    assert_eq!(series.days[0].mean(Channel::Ghi), Some(3.0));
}
