use std::fmt::Display;

use chrono::{Duration, NaiveDateTime};
use fire_emiss::{
    constants::HOURS_PER_DAY,
    error::EmissError,
    models::input::{parse_hour_stamp, HourStamp},
    modules::ebb::config::EbbMode,
};

/// Hour-stamps scanned for the cycle starting at `current_day` (`YYYYMMDDHH`).
/// The hourly stack covers the next 24 hours, the daily mean the 24 hours
/// ending one hour before the cycle of the previous day.
pub fn get_timeline(current_day: &str, mode: EbbMode) -> Result<Vec<HourStamp>, FireEmissError> {
    let current = parse_hour_stamp(current_day)
        .ok_or_else(|| format!("Could not parse current day '{}'", current_day))?;

    let start = match mode {
        EbbMode::Hourly => current,
        EbbMode::Daily => current - Duration::hours(HOURS_PER_DAY as i64 + 1),
    };
    let timeline = hour_range(&start, HOURS_PER_DAY)?;
    Ok(timeline)
}

fn hour_range(start: &NaiveDateTime, n_hours: usize) -> Result<Vec<HourStamp>, EmissError> {
    (0..n_hours)
        .map(|h| HourStamp::from_datetime(&(*start + Duration::hours(h as i64))))
        .collect()
}

#[derive(Debug)]
pub struct FireEmissError {
    msg: String,
}

impl From<String> for FireEmissError {
    fn from(msg: String) -> Self {
        FireEmissError { msg }
    }
}

impl From<&str> for FireEmissError {
    fn from(msg: &str) -> Self {
        FireEmissError { msg: msg.into() }
    }
}

impl From<EmissError> for FireEmissError {
    fn from(err: EmissError) -> Self {
        FireEmissError {
            msg: err.to_string(),
        }
    }
}

impl From<FireEmissError> for String {
    fn from(value: FireEmissError) -> String {
        value.msg
    }
}

impl Display for FireEmissError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for FireEmissError {}
