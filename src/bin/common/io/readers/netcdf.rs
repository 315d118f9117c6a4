use std::{error::Error, path::{Path, PathBuf}};

use fire_emiss::models::{
    grid::Grid,
    input::{HourStamp, HourlyObservation, ObservationHandler},
};
use log::{debug, warn};
use ndarray::Array1;
use netcdf::extent::Extents;
use serde_derive::{Deserialize, Serialize};

use crate::common::helpers::FireEmissError;

pub const FRE_VARIABLE: &str = "FRE";
pub const FRP_VARIABLE: &str = "frp_avg_hr";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetCdfObservationConfiguration {
    /// directory holding the interpolated hourly files
    pub path: String,
    /// file name prefix, followed by `{stamp}00_{stamp}59.nc`
    pub prefix: String,
    #[serde(default = "default_fre_name")]
    pub fre_name: String,
    #[serde(default = "default_frp_name")]
    pub frp_name: String,
}

fn default_fre_name() -> String {
    FRE_VARIABLE.into()
}

fn default_frp_name() -> String {
    FRP_VARIABLE.into()
}

impl NetCdfObservationConfiguration {
    pub fn new(path: &str, prefix: &str) -> Self {
        Self {
            path: path.to_owned(),
            prefix: prefix.to_owned(),
            fre_name: default_fre_name(),
            frp_name: default_frp_name(),
        }
    }

    /// file holding the observation of an hour-stamp
    pub fn file_for(&self, stamp: &HourStamp) -> PathBuf {
        Path::new(&self.path).join(format!("{}{stamp}00_{stamp}59.nc", self.prefix))
    }
}

/// read the first time slice of a `(1, rows, cols)` variable, flattened
fn read_first_slice(file: &netcdf::File, variable: &str) -> Result<Array1<f32>, Box<dyn Error>> {
    let var = file
        .variable(variable)
        .ok_or_else(|| format!("Could not find variable '{}'", variable))?;

    let extents: Extents = if var.dimensions().len() == 3 {
        (0usize, .., ..).try_into()?
    } else {
        Extents::All
    };
    let values = var
        .values::<f32, _>(extents)?
        .into_iter()
        .collect::<Array1<f32>>();
    Ok(values)
}

/// Reads the hourly interpolated files, one per hour-stamp
pub struct NetCdfObservationHandler {
    config: NetCdfObservationConfiguration,
}

impl NetCdfObservationHandler {
    pub fn new(config: &NetCdfObservationConfiguration) -> Result<Self, FireEmissError> {
        if !Path::new(&config.path).is_dir() {
            return Err(format!("Input path {} is not a directory", config.path).into());
        }
        Ok(NetCdfObservationHandler {
            config: config.clone(),
        })
    }

    fn read_observation(&self, file: &Path) -> Result<HourlyObservation, Box<dyn Error>> {
        let nc_file = netcdf::open(file)?;
        let radiative_energy = read_first_slice(&nc_file, &self.config.fre_name)?;
        let avg_frp = read_first_slice(&nc_file, &self.config.frp_name)?;
        Ok(HourlyObservation::new(radiative_energy, avg_frp))
    }
}

impl ObservationHandler for NetCdfObservationHandler {
    fn get_observation(&self, stamp: &HourStamp) -> Option<HourlyObservation> {
        let file = self.config.file_for(stamp);
        if !file.is_file() {
            debug!("File {} not found", file.display());
            return None;
        }
        match self.read_observation(&file) {
            Ok(observation) => Some(observation),
            Err(err) => {
                warn!("Error reading file {}: {}", file.display(), err);
                None
            }
        }
    }
}

/// Shape of a 2D variable, used to define the target grid
pub fn read_grid(file: &str, variable: &str) -> Result<Grid, FireEmissError> {
    let nc_file =
        netcdf::open(file).map_err(|err| format!("Cannot open grid file {}: {}", file, err))?;
    let var = nc_file
        .variable(variable)
        .ok_or_else(|| format!("Could not find variable '{}' in {}", variable, file))?;

    let dimensions = var.dimensions();
    let ndims = dimensions.len();
    if ndims < 2 {
        return Err(format!("Variable '{}' must have at least 2 dimensions", variable).into());
    }
    let nrows = dimensions[ndims - 2].len();
    let ncols = dimensions[ndims - 1].len();
    Ok(Grid::new(nrows, ncols))
}

/// Read a static field and check it covers the grid
pub fn read_static_field(
    file: &str,
    variable: &str,
    grid: &Grid,
) -> Result<Array1<f32>, FireEmissError> {
    let nc_file =
        netcdf::open(file).map_err(|err| format!("Cannot open {}: {}", file, err))?;
    let values = read_first_slice(&nc_file, variable)
        .map_err(|err| format!("Error reading variable {} from file {}: {}", variable, file, err))?;
    grid.check(variable, &values)?;
    Ok(values)
}

/// Read an ancillary field, falling back to zeros when it is not available
pub fn read_optional_field(file: Option<&str>, variable: &str, grid: &Grid) -> Array1<f32> {
    let Some(file) = file else {
        warn!("No ancillary file configured, {} set to zero", variable);
        return grid.zeros();
    };
    match read_static_field(file, variable, grid) {
        Ok(values) => values,
        Err(err) => {
            warn!("{}, {} set to zero", err, variable);
            grid.zeros()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_embeds_the_stamp_twice() {
        let config = NetCdfObservationConfiguration::new("/data/intp", "RAVE-HrlyEmiss_");
        let stamp: HourStamp = "2024071512".parse().expect("valid stamp");
        assert_eq!(
            config.file_for(&stamp),
            PathBuf::from("/data/intp/RAVE-HrlyEmiss_202407151200_202407151259.nc")
        );
    }

    #[test]
    fn missing_directory_is_rejected() {
        let config = NetCdfObservationConfiguration::new("/does/not/exist", "x_");
        assert!(NetCdfObservationHandler::new(&config).is_err());
    }

    #[test]
    fn absent_hour_is_none() {
        let dir = std::env::temp_dir();
        let config = NetCdfObservationConfiguration::new(&dir.to_string_lossy(), "no-such-prefix_");
        let handler = NetCdfObservationHandler::new(&config).expect("temp dir exists");
        let stamp: HourStamp = "1999010100".parse().expect("valid stamp");
        assert!(handler.get_observation(&stamp).is_none());
    }
}
