use std::{error::Error, fmt::Display};

/// Structural errors raised by the emission core.
/// Missing hourly data is never reported through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum EmissError {
    /// a field does not match the target grid
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    /// no hour-stamps were supplied
    EmptyTimeline,
    InvalidHourStamp(String),
}

impl EmissError {
    pub fn shape_mismatch(what: &str, expected: usize, found: usize) -> Self {
        EmissError::ShapeMismatch {
            what: what.to_owned(),
            expected,
            found,
        }
    }
}

impl Display for EmissError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmissError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "shape mismatch for {what}: expected {expected} cells, found {found}"
            ),
            EmissError::EmptyTimeline => write!(f, "no hour-stamps to process"),
            EmissError::InvalidHourStamp(stamp) => {
                write!(f, "invalid hour-stamp '{stamp}', expected YYYYMMDDHH")
            }
        }
    }
}

impl Error for EmissError {}
