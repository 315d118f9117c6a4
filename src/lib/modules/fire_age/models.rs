use log::warn;
use ndarray::{Array1, Zip};

use crate::{
    error::EmissError,
    models::{
        grid::Grid,
        input::{parse_hour_stamp, HourStamp, HourlyObservation},
        output::FireAge,
    },
};

use super::functions::{hours_since, update_last_detection_fn};

/// Most recent detection of every cell, as a numeric hour-stamp (0 = never detected)
#[derive(Debug)]
pub struct FireAgeState {
    pub last_detected: Array1<u64>,
    grid: Grid,
}

impl FireAgeState {
    pub fn new(grid: Grid) -> Self {
        FireAgeState {
            last_detected: Array1::zeros(grid.len()),
            grid,
        }
    }

    pub fn store(
        &mut self,
        stamp: &HourStamp,
        observation: &HourlyObservation,
    ) -> Result<(), EmissError> {
        self.grid.check("avg_frp", &observation.avg_frp)?;
        let stamp = stamp.value();
        Zip::from(&mut self.last_detected)
            .and(&observation.avg_frp)
            .par_for_each(|last, frp| update_last_detection_fn(last, *frp, stamp));
        Ok(())
    }

    /// Hours elapsed between each detection and `current_time` (`YYYYMMDDHH`)
    pub fn output(&self, current_time: &str) -> FireAge {
        let Some(current) = parse_hour_stamp(current_time.trim()) else {
            warn!("Could not parse current time '{current_time}', fire age set to zero");
            return FireAge::Degraded(self.grid.zeros());
        };

        let ages = self
            .last_detected
            .iter()
            .map(|last| {
                if *last == 0 {
                    return Some(0.0);
                }
                let detected = HourStamp::try_from(*last).ok()?.to_datetime()?;
                Some(hours_since(&current, &detected))
            })
            .collect::<Option<Vec<f32>>>();

        match ages {
            Some(ages) => FireAge::Estimated(Array1::from(ages)),
            None => {
                warn!("Could not parse detection times, fire age set to zero");
                FireAge::Degraded(self.grid.zeros())
            }
        }
    }
}
