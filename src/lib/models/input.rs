use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::{constants::HOUR_STAMP_FORMAT, error::EmissError};

// hour-stamps carry no minutes, they are appended before parsing
const PARSE_FORMAT: &str = "%Y%m%d%H%M";

/// Key of one hourly observation slot, encoded as `YYYYMMDDHH`.
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourStamp(u64);

impl HourStamp {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Slot of a calendar time. Only four-digit years fit in a hour-stamp.
    pub fn from_datetime(time: &NaiveDateTime) -> Result<Self, EmissError> {
        time.format(HOUR_STAMP_FORMAT).to_string().parse()
    }

    /// Calendar time of the slot, `None` if the digits are not a valid hour
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        parse_hour_stamp(&self.to_string())
    }
}

/// parse a `YYYYMMDDHH` string into a calendar time
pub fn parse_hour_stamp(stamp: &str) -> Option<NaiveDateTime> {
    if stamp.len() != 10 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{stamp}00"), PARSE_FORMAT).ok()
}

impl FromStr for HourStamp {
    type Err = EmissError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EmissError::InvalidHourStamp(s.to_owned()));
        }
        s.parse::<u64>()
            .map(HourStamp)
            .map_err(|_| EmissError::InvalidHourStamp(s.to_owned()))
    }
}

impl TryFrom<u64> for HourStamp {
    type Error = EmissError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if !(1_000_000_000..=9_999_999_999).contains(&value) {
            return Err(EmissError::InvalidHourStamp(value.to_string()));
        }
        Ok(HourStamp(value))
    }
}

impl Display for HourStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

/// One hour of gridded fire observations, flattened over the grid
#[derive(Debug, Clone)]
pub struct HourlyObservation {
    /// fire radiative energy [MJ]
    pub radiative_energy: Array1<f32>,
    /// average fire radiative power [MW]
    pub avg_frp: Array1<f32>,
}

impl HourlyObservation {
    pub fn new(radiative_energy: Array1<f32>, avg_frp: Array1<f32>) -> Self {
        Self {
            radiative_energy,
            avg_frp,
        }
    }
}

/// Trait defining the behavior of a source of hourly observations
pub trait ObservationHandler: Sync {
    /// get the observation for the desired hour-stamp,
    /// `None` when no data exists for that slot
    fn get_observation(&self, stamp: &HourStamp) -> Option<HourlyObservation>;
}

/// Observations held in memory, keyed by hour-stamp
#[derive(Debug, Default)]
pub struct MemoryObservationHandler {
    observations: HashMap<HourStamp, HourlyObservation>,
}

impl MemoryObservationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stamp: HourStamp, observation: HourlyObservation) {
        self.observations.insert(stamp, observation);
    }
}

impl ObservationHandler for MemoryObservationHandler {
    fn get_observation(&self, stamp: &HourStamp) -> Option<HourlyObservation> {
        self.observations.get(stamp).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_hour_stamp_ok() {
        let stamp: HourStamp = "2024071512".parse().expect("should parse");
        assert_eq!(stamp.value(), 2024071512);
        assert_eq!(stamp.to_string(), "2024071512");
        let expected = NaiveDate::from_ymd_opt(2024, 7, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date");
        assert_eq!(stamp.to_datetime(), Some(expected));
        assert_eq!(HourStamp::from_datetime(&expected), Ok(stamp));
    }

    #[test]
    fn years_beyond_four_digits_have_no_stamp() {
        let far = NaiveDate::from_ymd_opt(10000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        assert!(matches!(
            HourStamp::from_datetime(&far),
            Err(EmissError::InvalidHourStamp(_))
        ));
    }

    #[test]
    fn parse_hour_stamp_fails_for_malformed_stamp() {
        assert!("20240715".parse::<HourStamp>().is_err());
        assert!("2024071512ab".parse::<HourStamp>().is_err());
        assert!("2024-07-15".parse::<HourStamp>().is_err());
    }

    #[test]
    fn digits_outside_the_calendar_have_no_datetime() {
        let stamp: HourStamp = "2024133099".parse().expect("ten digits");
        assert_eq!(stamp.to_datetime(), None);
        assert_eq!(parse_hour_stamp("not a time"), None);
    }

    #[test]
    fn stamps_order_chronologically() {
        let a: HourStamp = "2024063023".parse().expect("should parse");
        let b: HourStamp = "2024070100".parse().expect("should parse");
        assert!(a < b);
    }
}
