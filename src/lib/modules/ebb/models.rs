use log::debug;
use ndarray::{Array1, Array3, Zip};

use crate::{
    error::EmissError,
    models::{grid::Grid, input::HourlyObservation, output::EmissionProduct},
};

use super::{
    config::{EbbMode, EbbModelConfig},
    functions::{get_output_fn, store_hour_fn},
};

// CELLS PROPERTIES
/// Static per-cell fields shared read-only by the aggregation
#[derive(Debug, Clone)]
pub struct EbbProperties {
    pub grid: Grid,
    /// vegetation based emission factor
    pub emiss_factor: Array1<f32>,
    /// cell area [m2]
    pub target_area: Array1<f32>,
}

impl EbbProperties {
    pub fn new(
        grid: Grid,
        emiss_factor: Array1<f32>,
        target_area: Array1<f32>,
    ) -> Result<Self, EmissError> {
        grid.check("emiss_factor", &emiss_factor)?;
        grid.check("target_area", &target_area)?;
        Ok(Self {
            grid,
            emiss_factor,
            target_area,
        })
    }
}

// STATE
#[derive(Debug, Default, Clone, Copy)]
pub struct EbbStateElement {
    /// summed emission contributions
    pub ebb_total: f32,
    /// summed positive FRP [MW]
    pub frp_total: f32,
    /// number of hours with positive FRP
    pub n_obs: u32,
}

/// Accumulators for one day of hourly observations
#[derive(Debug)]
pub struct EbbState {
    pub data: Array1<EbbStateElement>,
    frp_hourly: Vec<Array1<f32>>,
    ebb_hourly: Vec<Array1<f32>>,
    n_files: usize,
    grid: Grid,
    config: EbbModelConfig,
}

impl EbbState {
    pub fn new(grid: Grid, config: EbbModelConfig) -> Self {
        EbbState {
            data: Array1::default(grid.len()),
            frp_hourly: vec![],
            ebb_hourly: vec![],
            n_files: 0,
            grid,
            config,
        }
    }

    /// number of observations folded in so far
    pub fn n_files(&self) -> usize {
        self.n_files
    }

    /// fold one hourly observation into the accumulators
    pub fn store(
        &mut self,
        observation: &HourlyObservation,
        props: &EbbProperties,
    ) -> Result<(), EmissError> {
        self.grid.check("radiative_energy", &observation.radiative_energy)?;
        self.grid.check("avg_frp", &observation.avg_frp)?;
        self.n_files += 1;

        let config = &self.config;
        match config.mode {
            EbbMode::Hourly => {
                let ebb = Zip::from(&observation.radiative_energy)
                    .and(&observation.avg_frp)
                    .and(&props.emiss_factor)
                    .and(&props.target_area)
                    .par_map_collect(|fre, frp, ef, area| {
                        config.contribution(*fre, *frp, *ef, *area)
                    });
                // undefined or non-positive FRP is no detection
                let frp = observation
                    .avg_frp
                    .mapv(|frp| if frp > 0.0 { frp } else { 0.0 });
                self.frp_hourly.push(frp);
                self.ebb_hourly.push(ebb);
            }
            EbbMode::Daily => {
                Zip::from(&mut self.data)
                    .and(&observation.radiative_energy)
                    .and(&observation.avg_frp)
                    .and(&props.emiss_factor)
                    .and(&props.target_area)
                    .par_for_each(|state, fre, frp, ef, area| {
                        store_hour_fn(state, *fre, *frp, *ef, *area, config)
                    });
            }
        }
        Ok(())
    }

    /// account for an hour-stamp without data
    pub fn store_missing(&mut self) {
        match self.config.mode {
            // keep the stack aligned with the hour-stamps
            EbbMode::Hourly => {
                self.frp_hourly.push(self.grid.zeros());
                self.ebb_hourly.push(self.grid.zeros());
            }
            EbbMode::Daily => (),
        }
    }

    pub fn output(&self) -> Result<EmissionProduct, EmissError> {
        let (nrows, ncols) = self.grid.shape();
        match self.config.mode {
            EbbMode::Hourly => {
                let n_hours = self.frp_hourly.len();
                let frp = stack(&self.frp_hourly, (n_hours, nrows, ncols))?;
                let ebb = stack(&self.ebb_hourly, (n_hours, nrows, ncols))?;
                Ok(EmissionProduct::Hourly { frp, ebb })
            }
            EbbMode::Daily => {
                if self.n_files == 0 {
                    debug!("No hourly observations found, returning empty daily fields");
                    return Ok(EmissionProduct::Daily {
                        frp: ndarray::Array2::zeros((nrows, ncols)),
                        ebb: ndarray::Array2::zeros((nrows, ncols)),
                    });
                }
                let (frp, ebb): (Vec<f32>, Vec<f32>) =
                    self.data.iter().map(get_output_fn).unzip();
                let frp = self.grid.to_2d(&Array1::from(frp))?;
                let ebb = self.grid.to_2d(&Array1::from(ebb))?;
                Ok(EmissionProduct::Daily { frp, ebb })
            }
        }
    }
}

fn stack(
    slices: &[Array1<f32>],
    shape: (usize, usize, usize),
) -> Result<Array3<f32>, EmissError> {
    let values: Vec<f32> = slices.iter().flat_map(|s| s.iter().cloned()).collect();
    let n_values = values.len();
    Array3::from_shape_vec(shape, values).map_err(|_| {
        EmissError::shape_mismatch("hourly stack", shape.0 * shape.1 * shape.2, n_values)
    })
}
