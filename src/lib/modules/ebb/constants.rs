/// combustion efficiency multiplier
pub const BETA: f32 = 0.3;
/// mass unit conversion to micrograms
pub const FG_TO_UG: f32 = 1e6;
/// seconds in one observation interval
pub const TO_S: f32 = 3600.0;

// a single detection counts as half coverage of the day
pub const SINGLE_OBSERVATION_DIVISOR: f32 = 2.0;
