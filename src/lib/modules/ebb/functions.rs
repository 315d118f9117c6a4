use log::{debug, info};

use crate::{
    constants::SECONDS_PER_HOUR,
    error::EmissError,
    models::{
        input::{HourStamp, ObservationHandler},
        output::EmissionProduct,
    },
};

use super::{
    config::{EbbMode, EbbModelConfig, EmissionConstants},
    constants::SINGLE_OBSERVATION_DIVISOR,
    models::{EbbProperties, EbbState, EbbStateElement},
};

/// Emission of one hour already expressed as a rate over the interval
/// [ug m-2 s-1]
pub fn hourly_contribution(
    radiative_energy: f32, // [MJ]
    avg_frp: f32,          // [MW]
    emiss_factor: f32,
    target_area: f32, // [m2]
    constants: &EmissionConstants,
) -> f32 {
    if avg_frp > 0.0 {
        (radiative_energy * emiss_factor * constants.beta * constants.fg_to_ug)
            / (target_area * constants.to_s)
    } else {
        0.0
    }
}

/// Emission of one hour accumulated over the interval,
/// turned into a rate after the daily normalisation [ug m-2]
pub fn daily_contribution(
    radiative_energy: f32, // [MJ]
    avg_frp: f32,          // [MW]
    emiss_factor: f32,
    target_area: f32, // [m2]
    constants: &EmissionConstants,
) -> f32 {
    if avg_frp > 0.0 {
        radiative_energy * emiss_factor * constants.beta * constants.fg_to_ug / target_area
    } else {
        0.0
    }
}

/// Mean of a daily sum over the valid observations.
/// A cell seen only once is divided by two, a cell never seen keeps its sum.
pub fn normalize(total: f32, n_obs: u32) -> f32 {
    match n_obs {
        0 => total,
        1 => total / SINGLE_OBSERVATION_DIVISOR,
        n => total / n as f32,
    }
}

pub fn store_hour_fn(
    state: &mut EbbStateElement,
    radiative_energy: f32,
    avg_frp: f32,
    emiss_factor: f32,
    target_area: f32,
    config: &EbbModelConfig,
) {
    // NaN is no detection either
    if avg_frp > 0.0 {
        state.ebb_total +=
            config.contribution(radiative_energy, avg_frp, emiss_factor, target_area);
        state.frp_total += avg_frp;
        state.n_obs += 1;
    }
}

/// daily mean FRP [MW] and emission rate [ug m-2 s-1] of one cell
pub fn get_output_fn(state: &EbbStateElement) -> (f32, f32) {
    let frp = normalize(state.frp_total, state.n_obs);
    let ebb = normalize(state.ebb_total, state.n_obs) / SECONDS_PER_HOUR;
    (frp, ebb)
}

/// Aggregate the hourly observations of one day into FRP and emission fields.
///
/// In hourly mode every hour-stamp yields one slice of the output stack, hours without
/// data are zero. In daily mode hours without data are skipped and every cell is
/// normalised by its own number of valid observations.
pub fn averaging_frp(
    mode: EbbMode,
    hour_stamps: &[HourStamp],
    props: &EbbProperties,
    handler: &dyn ObservationHandler,
    constants: &EmissionConstants,
) -> Result<EmissionProduct, EmissError> {
    if hour_stamps.is_empty() {
        return Err(EmissError::EmptyTimeline);
    }

    let config = EbbModelConfig::new(mode, *constants);
    let mut state = EbbState::new(props.grid, config);

    for stamp in hour_stamps {
        match handler.get_observation(stamp) {
            Some(observation) => {
                debug!("Processing emissions for {stamp} ({mode})");
                state.store(&observation, props)?;
            }
            None => {
                debug!("No observation for {stamp}");
                state.store_missing();
            }
        }
    }
    info!(
        "Aggregated {} of {} hourly observations ({mode})",
        state.n_files(),
        hour_stamps.len()
    );

    state.output()
}
