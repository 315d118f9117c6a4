mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::path::Path;

use chrono::Utc;
use clap::Parser;

use common::config::models::Config;
use common::helpers::{get_timeline, FireEmissError};
use common::io::models::output::EmissionOutput;
use fire_emiss::models::output::FireAge;
use fire_emiss::modules::ebb::config::EbbMode;
use fire_emiss::modules::{ebb::averaging_frp, fire_age::estimate_fire_duration};
use fire_emiss::version::LONG_VERSION;
use log::{info, trace, warn};

use crate::common::config::builder::FireEmissConfigBuilder;

#[derive(Parser, Debug)]
#[command(
    version,
    long_version=LONG_VERSION,
    about="Daily smoke emission products from hourly gridded Fire Radiative Power",
    long_about="Aggregates a day of hourly gridded Fire Radiative Power observations into
daily mean FRP, biomass burning emission rates and the age of the detected fires."
)]
struct Args {
    #[arg(
        required = true,
        help = "Forecast cycle in the format YYYYMMDDHH",
        index = 1
    )]
    current_day: String,

    #[arg(required = true, help = "Path to the configuration file", index = 2)]
    config_path: String,
}

fn run(config: &Config) -> Result<(), FireEmissError> {
    let mode = config.mode();
    let current_day = config.current_day();
    let grid = config.grid();

    let timeline = get_timeline(current_day, mode)?;
    info!(
        "Processing {} hours from {} ({})",
        timeline.len(),
        timeline.first().map(|t| t.to_string()).unwrap_or_default(),
        mode
    );

    let handler = config.get_input_handler()?;

    let c = Utc::now();
    let (product, fire_age) = match mode {
        // the two scans are independent read-only passes over the same files
        EbbMode::Daily => {
            let (product, fire_age) = rayon::join(
                || {
                    averaging_frp(
                        mode,
                        &timeline,
                        config.get_properties(),
                        &handler,
                        config.constants(),
                    )
                },
                || estimate_fire_duration(&timeline, current_day, grid, &handler),
            );
            (product?, fire_age?)
        }
        // fire age is only written with the daily fields
        EbbMode::Hourly => {
            let product = averaging_frp(
                mode,
                &timeline,
                config.get_properties(),
                &handler,
                config.constants(),
            )?;
            (product, FireAge::Estimated(grid.zeros()))
        }
    };
    trace!("Aggregation took {} seconds", Utc::now() - c);

    if let FireAge::Degraded(_) = fire_age {
        warn!("Fire age could not be estimated, writing zeros");
    }

    let (hwp, totprcp) = match mode {
        EbbMode::Daily => config.get_ancillary(),
        EbbMode::Hourly => (grid.zeros(), grid.zeros()),
    };

    let (lats, lons) = config.get_coords();
    let output = EmissionOutput::new(grid, lats, lons, &product, &fire_age, &hwp, &totprcp)?;

    let c = Utc::now();
    let file = config.get_output_writer().write(current_day, &output)?;
    trace!("Writing output took {} seconds", Utc::now() - c);
    info!("Emissions file created: {}", file.display());
    Ok(())
}

/// main function
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let current_day = args.current_day;
    let config_path_str = args.config_path;

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    if !Path::new(&config_path_str).is_file() {
        return Err(format!("Config file {} is not a file", config_path_str).into());
    }

    let config_defs = FireEmissConfigBuilder::from_file(&config_path_str)
        .map_err(|err| format!("Failed to load config: {}", err))?;

    let start_time = Utc::now();
    let config = config_defs
        .build(&current_day)
        .map_err(|err| format!("Could not configure run: {}", err))?;
    trace!(
        "Loading static fields took {} seconds",
        Utc::now() - start_time
    );

    run(&config)?;

    let elapsed_time = Utc::now() - start_time;
    info!("Elapsed time: {} seconds", elapsed_time.num_seconds());
    Ok(())
}
