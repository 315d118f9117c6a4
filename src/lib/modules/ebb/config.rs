use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::{
    constants::{BETA, FG_TO_UG, TO_S},
    functions::{daily_contribution, hourly_contribution},
};

/// Aggregation strategy for one day of hourly observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EbbMode {
    /// keep one slice per hour-stamp
    Hourly,
    /// normalised daily mean
    Daily,
}

impl EbbMode {
    /// legacy numeric switch, `1` selects the hourly stack
    pub fn from_dcycle(ebb_dcycle: i32) -> Self {
        if ebb_dcycle == 1 {
            EbbMode::Hourly
        } else {
            EbbMode::Daily
        }
    }
}

/// Conversion factors applied to the radiative energy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionConstants {
    /// combustion efficiency multiplier
    pub beta: f32,
    /// mass unit conversion
    pub fg_to_ug: f32,
    /// seconds per observation interval
    pub to_s: f32,
}

impl Default for EmissionConstants {
    fn default() -> Self {
        Self {
            beta: BETA,
            fg_to_ug: FG_TO_UG,
            to_s: TO_S,
        }
    }
}

/// configuration structure for model config
/// can be used to store functions and constants
#[derive(Debug, Clone)]
pub struct EbbModelConfig {
    pub mode: EbbMode,
    pub constants: EmissionConstants,
    contribution_fn: fn(f32, f32, f32, f32, &EmissionConstants) -> f32,
}

impl EbbModelConfig {
    pub fn new(mode: EbbMode, constants: EmissionConstants) -> Self {
        let contribution_fn: fn(f32, f32, f32, f32, &EmissionConstants) -> f32 = match mode {
            EbbMode::Hourly => hourly_contribution,
            EbbMode::Daily => daily_contribution,
        };

        EbbModelConfig {
            mode,
            constants,
            contribution_fn,
        }
    }

    /// emission contribution of one cell for one hour
    pub fn contribution(
        &self,
        radiative_energy: f32, // [MJ]
        avg_frp: f32,          // [MW]
        emiss_factor: f32,
        target_area: f32, // [m2]
    ) -> f32 {
        (self.contribution_fn)(
            radiative_energy,
            avg_frp,
            emiss_factor,
            target_area,
            &self.constants,
        )
    }
}
