use std::error::Error;

use solmon_service::analysis::EmptySelection;
use solmon_service::config::Config;
use solmon_service::ingest::SourceCache;
use solmon_service::logging::{self, Stage};
use solmon_service::pipeline::{self, DashboardOutcome, DashboardRequest};
use solmon_service::verify;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    )?;

    let report = verify::run_verification(&config.sources());
    report.log_summary();

    let request = DashboardRequest::from_config(&config, rand::random());
    logging::info(
        Stage::System,
        None,
        &format!("sites {:?}, sample cap {}, seed {}", request.sites, request.sample_cap, request.seed),
    );

    let mut cache = SourceCache::new();
    match pipeline::run(&config, &mut cache, &request)? {
        DashboardOutcome::NothingSelected(EmptySelection::NoSitesSelected) => {
            logging::warn(Stage::System, None, "Please select at least one site.");
        }
        DashboardOutcome::NothingSelected(EmptySelection::NoMatchingRows { sites }) => {
            logging::warn(
                Stage::System,
                None,
                &format!("No readings for {:?}. Check the data directory.", sites),
            );
        }
        DashboardOutcome::Views(views) => {
            let tables: serde_json::Map<String, serde_json::Value> = views
                .tables()
                .into_iter()
                .map(|(name, table)| serde_json::to_value(table).map(|v| (name, v)))
                .collect::<Result<_, _>>()?;
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
    }

    Ok(())
}
