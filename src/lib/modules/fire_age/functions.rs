use chrono::NaiveDateTime;
use itertools::Itertools;
use log::{debug, warn};
use ndarray::Array2;

use crate::{
    constants::SECONDS_PER_HOUR,
    error::EmissError,
    models::{
        grid::Grid,
        input::{HourStamp, ObservationHandler},
        output::FireAge,
    },
};

use super::models::FireAgeState;

/// keep the latest hour-stamp with a positive detection
pub fn update_last_detection_fn(last_detected: &mut u64, avg_frp: f32, stamp: u64) {
    if avg_frp > 0.0 && stamp > *last_detected {
        *last_detected = stamp;
    }
}

/// elapsed time in hours, fractional
pub fn hours_since(current: &NaiveDateTime, detected: &NaiveDateTime) -> f32 {
    current.signed_duration_since(*detected).num_seconds() as f32 / SECONDS_PER_HOUR
}

/// Hours since each cell last had a positive FRP within the scanned hour-stamps.
/// Cells without detections get 0. Hour-stamps without data are skipped.
pub fn estimate_fire_duration(
    hour_stamps: &[HourStamp],
    current_time: &str,
    grid: &Grid,
    handler: &dyn ObservationHandler,
) -> Result<FireAge, EmissError> {
    if !hour_stamps.iter().tuple_windows().all(|(a, b)| a < b) {
        warn!("Hour-stamps are not in chronological order");
    }

    let mut state = FireAgeState::new(*grid);
    for stamp in hour_stamps {
        if let Some(observation) = handler.get_observation(stamp) {
            debug!("Date processing for fire duration {stamp}");
            state.store(stamp, &observation)?;
        }
    }
    Ok(state.output(current_time))
}

/// reshape the flattened fire age onto the grid
pub fn save_fire_dur(grid: &Grid, fire_age: &FireAge) -> Result<Array2<f32>, EmissError> {
    fire_age.to_grid(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::input::{HourlyObservation, MemoryObservationHandler};
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    fn stamp(s: &str) -> HourStamp {
        s.parse().expect("valid stamp")
    }

    fn frp_only(frp: Array1<f32>) -> HourlyObservation {
        HourlyObservation::new(Array1::zeros(frp.len()), frp)
    }

    #[test]
    fn last_detection_never_decreases() {
        let mut last = 0;
        update_last_detection_fn(&mut last, 1.0, 2024071503);
        assert_eq!(last, 2024071503);
        update_last_detection_fn(&mut last, 0.0, 2024071505);
        assert_eq!(last, 2024071503);
        update_last_detection_fn(&mut last, 2.0, 2024071501);
        assert_eq!(last, 2024071503);
        update_last_detection_fn(&mut last, 2.0, 2024071506);
        assert_eq!(last, 2024071506);
    }

    #[test]
    fn fire_age_counts_hours_since_last_detection() {
        let grid = Grid::new(1, 3);
        let hours: Vec<HourStamp> = ["2024071423", "2024071500", "2024071501", "2024071502"]
            .iter()
            .map(|s| stamp(s))
            .collect();
        let mut handler = MemoryObservationHandler::new();
        handler.insert(hours[0], frp_only(array![1.0, 2.0, 0.0]));
        handler.insert(hours[2], frp_only(array![3.0, 0.0, 0.0]));
        // hours[1] and hours[3] have no data

        let age = estimate_fire_duration(&hours, "2024071512", &grid, &handler)
            .expect("should estimate");
        assert!(!age.is_degraded());
        let values = age.values();
        assert_relative_eq!(values[0], 11.0);
        // detection on the previous day
        assert_relative_eq!(values[1], 13.0);
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn detection_at_current_time_has_zero_age() {
        let grid = Grid::new(1, 1);
        let now = stamp("2024071512");
        let mut handler = MemoryObservationHandler::new();
        handler.insert(now, frp_only(array![4.0]));

        let age = estimate_fire_duration(&[now], "2024071512", &grid, &handler)
            .expect("should estimate");
        assert_eq!(age, FireAge::Estimated(array![0.0]));
    }

    #[test]
    fn unparsable_current_time_degrades_to_zero() {
        let grid = Grid::new(2, 2);
        let now = stamp("2024071512");
        let mut handler = MemoryObservationHandler::new();
        handler.insert(now, frp_only(array![4.0, 1.0, 0.0, 2.0]));

        let age = estimate_fire_duration(&[now], "yesterday", &grid, &handler)
            .expect("parse failures are not errors");
        assert!(age.is_degraded());
        assert!(age.values().iter().all(|v| *v == 0.0));
        assert_eq!(age.values().len(), 4);
    }

    #[test]
    fn unparsable_detection_time_degrades_to_zero() {
        let grid = Grid::new(1, 1);
        let bogus = stamp("2024133099");
        let mut handler = MemoryObservationHandler::new();
        handler.insert(bogus, frp_only(array![4.0]));

        let age = estimate_fire_duration(&[bogus], "2024071512", &grid, &handler)
            .expect("parse failures are not errors");
        assert_eq!(age, FireAge::Degraded(array![0.0]));
    }

    #[test]
    fn save_fire_dur_reshapes_onto_grid() {
        let grid = Grid::new(2, 2);
        let age = FireAge::Estimated(array![1.0, 2.0, 3.0, 4.0]);
        let field = save_fire_dur(&grid, &age).expect("same size");
        assert_eq!(field, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn mismatched_observation_is_an_error() {
        let grid = Grid::new(2, 2);
        let now = stamp("2024071512");
        let mut handler = MemoryObservationHandler::new();
        handler.insert(now, frp_only(array![4.0]));
        let result = estimate_fire_duration(&[now], "2024071512", &grid, &handler);
        assert!(matches!(result, Err(EmissError::ShapeMismatch { .. })));
    }
}
