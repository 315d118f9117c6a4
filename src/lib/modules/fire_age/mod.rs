pub mod functions;
pub mod models;

pub use functions::{estimate_fire_duration, save_fire_dur};
