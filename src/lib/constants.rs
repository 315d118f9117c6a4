/// fill value used for coordinates and undefined cells
pub const NODATAVAL: f32 = -9999.0;

pub const SECONDS_PER_HOUR: f32 = 3600.0;
pub const HOURS_PER_DAY: usize = 24;

/// format of the hour-stamps keying the hourly observations
pub const HOUR_STAMP_FORMAT: &str = "%Y%m%d%H";
