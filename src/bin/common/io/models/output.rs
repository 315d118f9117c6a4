use fire_emiss::{
    models::{
        grid::Grid,
        output::{mask_where_no_fire, EmissionProduct, FireAge, OutputVariableName},
    },
    modules::fire_age::save_fire_dur,
};
use ndarray::{Array1, Array2};

use crate::common::helpers::FireEmissError;

/// One variable ready to be written, values in slice-major, row-major order
#[derive(Debug, Clone)]
pub struct OutputField {
    pub name: OutputVariableName,
    pub n_slices: usize,
    pub values: Vec<f32>,
}

impl OutputField {
    fn from_2d(name: OutputVariableName, values: &Array2<f32>) -> Self {
        Self {
            name,
            n_slices: 1,
            values: values.iter().cloned().collect(),
        }
    }
}

/// Everything written to the emission file of one forecast cycle
#[derive(Debug)]
pub struct EmissionOutput {
    pub grid: Grid,
    pub lats: Array2<f32>,
    pub lons: Array2<f32>,
    pub fields: Vec<OutputField>,
}

impl EmissionOutput {
    /// Collect the coordinates and the emission product. In daily mode the fire age
    /// and the ancillary fields are added, the latter masked where there is no fire.
    pub fn new(
        grid: &Grid,
        lats: &Array1<f32>,
        lons: &Array1<f32>,
        product: &EmissionProduct,
        fire_age: &FireAge,
        hwp: &Array1<f32>,
        totprcp: &Array1<f32>,
    ) -> Result<Self, FireEmissError> {
        let lats = grid.to_2d(lats)?;
        let lons = grid.to_2d(lons)?;

        let n_slices = product.n_slices();
        let mut fields = vec![
            OutputField {
                name: product.frp_variable(),
                n_slices,
                values: product.frp_values(),
            },
            OutputField {
                name: product.ebb_variable(),
                n_slices,
                values: product.ebb_values(),
            },
        ];

        if let Some(frp) = product.daily_frp() {
            let fire_age = save_fire_dur(grid, fire_age)?;
            let hwp = mask_where_no_fire(&grid.to_2d(hwp)?, frp)?;
            let totprcp = mask_where_no_fire(&grid.to_2d(totprcp)?, frp)?;
            fields.push(OutputField::from_2d(OutputVariableName::fire_end_hr, &fire_age));
            fields.push(OutputField::from_2d(OutputVariableName::hwp_davg, &hwp));
            fields.push(OutputField::from_2d(OutputVariableName::totprcp_24hrs, &totprcp));
        }

        Ok(Self {
            grid: *grid,
            lats,
            lons,
            fields,
        })
    }

    pub fn n_slices(&self) -> usize {
        self.fields.iter().map(|f| f.n_slices).max().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn coords() -> (Array1<f32>, Array1<f32>) {
        (array![40.0, 40.0, 41.0, 41.0], array![-100.0, -99.0, -100.0, -99.0])
    }

    #[test]
    fn daily_output_masks_ancillary_fields() {
        let grid = Grid::new(2, 2);
        let (lats, lons) = coords();
        let product = EmissionProduct::Daily {
            frp: array![[4.0, 0.0], [0.0, 1.0]],
            ebb: array![[0.1, 0.0], [0.0, 0.2]],
        };
        let fire_age = FireAge::Estimated(array![3.0, 0.0, 0.0, 5.0]);
        let hwp = array![10.0, 20.0, 30.0, 40.0];
        let prcp = array![0.5, 0.5, 0.5, 0.5];

        let output = EmissionOutput::new(&grid, &lats, &lons, &product, &fire_age, &hwp, &prcp)
            .expect("should build");

        let names: Vec<OutputVariableName> = output.fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                OutputVariableName::frp_davg,
                OutputVariableName::ebb_rate,
                OutputVariableName::fire_end_hr,
                OutputVariableName::hwp_davg,
                OutputVariableName::totprcp_24hrs,
            ]
        );
        assert_eq!(output.fields[3].values, vec![10.0, 0.0, 0.0, 40.0]);
        assert_eq!(output.fields[4].values, vec![0.5, 0.0, 0.0, 0.5]);
        assert_eq!(output.lats[[1, 0]], 41.0);
        assert_eq!(output.n_slices(), 1);
    }

    #[test]
    fn hourly_output_has_only_the_stacks() {
        let grid = Grid::new(2, 2);
        let (lats, lons) = coords();
        let product = EmissionProduct::Hourly {
            frp: Array3::zeros((24, 2, 2)),
            ebb: Array3::zeros((24, 2, 2)),
        };
        let fire_age = FireAge::Estimated(grid.zeros());

        let output = EmissionOutput::new(
            &grid,
            &lats,
            &lons,
            &product,
            &fire_age,
            &grid.zeros(),
            &grid.zeros(),
        )
        .expect("should build");

        assert_eq!(output.fields.len(), 2);
        assert_eq!(output.fields[0].name, OutputVariableName::frp_avg_hr);
        assert_eq!(output.fields[0].values.len(), 24 * 4);
        assert_eq!(output.n_slices(), 24);
    }
}
