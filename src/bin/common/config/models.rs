use fire_emiss::{
    models::grid::Grid,
    modules::ebb::{
        config::{EbbMode, EmissionConstants},
        models::EbbProperties,
    },
};
use log::info;
use ndarray::Array1;

use crate::common::{
    helpers::FireEmissError,
    io::{
        readers::netcdf::{
            read_grid, read_optional_field, read_static_field, NetCdfObservationConfiguration,
            NetCdfObservationHandler,
        },
        writers::netcdf::NetcdfWriter,
    },
};

use super::builder::{AncillaryConfig, FireEmissConfigBuilder};

/// Run configuration with the static fields loaded
pub struct Config {
    current_day: String,
    mode: EbbMode,
    constants: EmissionConstants,
    properties: EbbProperties,
    lats: Array1<f32>,
    lons: Array1<f32>,
    input_configuration: NetCdfObservationConfiguration,
    output_path: String,
    ancillary: Option<AncillaryConfig>,
}

impl Config {
    pub fn new(
        config_defs: &FireEmissConfigBuilder,
        current_day: &str,
    ) -> Result<Config, FireEmissError> {
        let grid_defs = &config_defs.grid;
        let grid = read_grid(&grid_defs.path, &grid_defs.lat_name)?;
        info!("Target grid: {} x {}", grid.nrows, grid.ncols);

        let lats = read_static_field(&grid_defs.path, &grid_defs.lat_name, &grid)?;
        let lons = read_static_field(&grid_defs.path, &grid_defs.lon_name, &grid)?;
        let target_area = read_static_field(&grid_defs.path, &grid_defs.area_name, &grid)?;
        let emiss_factor = read_static_field(
            &config_defs.vegetation_map,
            &config_defs.emiss_factor_name,
            &grid,
        )?;

        let properties = EbbProperties::new(grid, emiss_factor, target_area)?;

        Ok(Config {
            current_day: current_day.to_owned(),
            mode: config_defs.mode,
            constants: config_defs.constants,
            properties,
            lats,
            lons,
            input_configuration: config_defs.input.clone(),
            output_path: config_defs.output_path.clone(),
            ancillary: config_defs.ancillary.clone(),
        })
    }

    pub fn current_day(&self) -> &str {
        &self.current_day
    }

    pub fn mode(&self) -> EbbMode {
        self.mode
    }

    pub fn constants(&self) -> &EmissionConstants {
        &self.constants
    }

    pub fn get_properties(&self) -> &EbbProperties {
        &self.properties
    }

    pub fn grid(&self) -> &Grid {
        &self.properties.grid
    }

    pub fn get_coords(&self) -> (&Array1<f32>, &Array1<f32>) {
        (&self.lats, &self.lons)
    }

    pub fn get_input_handler(&self) -> Result<NetCdfObservationHandler, FireEmissError> {
        NetCdfObservationHandler::new(&self.input_configuration)
    }

    pub fn get_output_writer(&self) -> NetcdfWriter {
        NetcdfWriter::new(&self.output_path)
    }

    /// hourly wildfire potential and precipitation sum, zero when not available
    pub fn get_ancillary(&self) -> (Array1<f32>, Array1<f32>) {
        let grid = self.grid();
        match &self.ancillary {
            Some(ancillary) => (
                read_optional_field(Some(&ancillary.path), &ancillary.hwp_name, grid),
                read_optional_field(Some(&ancillary.path), &ancillary.totprcp_name, grid),
            ),
            None => (
                read_optional_field(None, "hwp", grid),
                read_optional_field(None, "totprcp", grid),
            ),
        }
    }
}
