use ndarray::{Array1, Array2, Array3, Zip};
use serde_derive::{Deserialize, Serialize};
use strum::EnumProperty;
use strum_macros::{Display, EnumProperty, EnumString};

use crate::{
    constants::NODATAVAL,
    error::EmissError,
    models::grid::Grid,
};

#[allow(non_camel_case_types)]
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    EnumString,
    EnumProperty,
    Display,
    Serialize,
    Deserialize,
)]
pub enum OutputVariableName {
    /// Cell center latitude
    #[strum(props(long_name = "cell center latitude", units = "degrees_north"))]
    geolat,
    /// Cell center longitude
    #[strum(props(long_name = "cell center longitude", units = "degrees_east"))]
    geolon,

    /// Hourly mean FRP stack
    #[strum(props(long_name = "mean Fire Radiative Power", units = "MW"))]
    frp_avg_hr,
    /// Hourly emission stack
    #[strum(props(long_name = "EBB emissions", units = "ug m-2 s-1"))]
    ebb_smoke_hr,

    /// Daily mean FRP
    #[strum(props(long_name = "Daily mean Fire Radiative Power", units = "MW"))]
    frp_davg,
    /// Daily emission rate
    #[strum(props(long_name = "Total EBB emission", units = "ug m-2 s-1"))]
    ebb_rate,
    #[strum(props(long_name = "Hours since fire was last detected", units = "hrs"))]
    fire_end_hr,
    #[strum(props(long_name = "Daily mean Hourly Wildfire Potential", units = "none"))]
    hwp_davg,
    #[strum(props(long_name = "Sum of precipitation", units = "m"))]
    totprcp_24hrs,
}

impl OutputVariableName {
    pub fn long_name(&self) -> &'static str {
        self.get_str("long_name").unwrap_or_default()
    }

    pub fn units(&self) -> &'static str {
        self.get_str("units").unwrap_or_default()
    }

    pub fn fill_value(&self) -> f32 {
        match self {
            OutputVariableName::geolat | OutputVariableName::geolon => NODATAVAL,
            _ => 0.0,
        }
    }
}

/// Result of the daily aggregation, shaped by the aggregation mode
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionProduct {
    /// one slice per hour-stamp, `(hours, nrows, ncols)`
    Hourly { frp: Array3<f32>, ebb: Array3<f32> },
    /// daily mean FRP and emission rate, `(nrows, ncols)`
    Daily { frp: Array2<f32>, ebb: Array2<f32> },
}

impl EmissionProduct {
    pub fn frp_variable(&self) -> OutputVariableName {
        match self {
            EmissionProduct::Hourly { .. } => OutputVariableName::frp_avg_hr,
            EmissionProduct::Daily { .. } => OutputVariableName::frp_davg,
        }
    }

    pub fn ebb_variable(&self) -> OutputVariableName {
        match self {
            EmissionProduct::Hourly { .. } => OutputVariableName::ebb_smoke_hr,
            EmissionProduct::Daily { .. } => OutputVariableName::ebb_rate,
        }
    }

    /// number of time slices carried by the product
    pub fn n_slices(&self) -> usize {
        match self {
            EmissionProduct::Hourly { frp, .. } => frp.shape()[0],
            EmissionProduct::Daily { .. } => 1,
        }
    }

    /// FRP values in slice-major, row-major order
    pub fn frp_values(&self) -> Vec<f32> {
        match self {
            EmissionProduct::Hourly { frp, .. } => frp.iter().cloned().collect(),
            EmissionProduct::Daily { frp, .. } => frp.iter().cloned().collect(),
        }
    }

    /// emission values in slice-major, row-major order
    pub fn ebb_values(&self) -> Vec<f32> {
        match self {
            EmissionProduct::Hourly { ebb, .. } => ebb.iter().cloned().collect(),
            EmissionProduct::Daily { ebb, .. } => ebb.iter().cloned().collect(),
        }
    }

    pub fn daily_frp(&self) -> Option<&Array2<f32>> {
        match self {
            EmissionProduct::Daily { frp, .. } => Some(frp),
            EmissionProduct::Hourly { .. } => None,
        }
    }
}

/// Hours since the last fire detection, flattened over the grid.
/// `Degraded` carries an all-zero field produced when the times could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum FireAge {
    Estimated(Array1<f32>),
    Degraded(Array1<f32>),
}

impl FireAge {
    pub fn values(&self) -> &Array1<f32> {
        match self {
            FireAge::Estimated(values) | FireAge::Degraded(values) => values,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, FireAge::Degraded(_))
    }

    pub fn to_grid(&self, grid: &Grid) -> Result<Array2<f32>, EmissError> {
        grid.to_2d(self.values())
    }
}

/// Zero an ancillary field wherever the daily FRP is not positive
pub fn mask_where_no_fire(
    field: &Array2<f32>,
    frp: &Array2<f32>,
) -> Result<Array2<f32>, EmissError> {
    if field.shape() != frp.shape() {
        return Err(EmissError::shape_mismatch("masked field", frp.len(), field.len()));
    }
    let masked = Zip::from(field)
        .and(frp)
        .map_collect(|value, frp| if *frp > 0.0 { *value } else { 0.0 });
    Ok(masked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::str::FromStr;

    #[test]
    fn variables_carry_metadata() {
        let var = OutputVariableName::from_str("ebb_rate").expect("should parse");
        assert_eq!(var.units(), "ug m-2 s-1");
        assert_eq!(var.fill_value(), 0.0);
        assert_eq!(OutputVariableName::geolat.fill_value(), NODATAVAL);
        assert_eq!(OutputVariableName::fire_end_hr.units(), "hrs");
    }

    #[test]
    fn mask_zeroes_cells_without_fire() {
        let hwp = array![[3.0, 4.0], [5.0, 6.0]];
        let frp = array![[1.5, 0.0], [-1.0, 2.0]];
        let masked = mask_where_no_fire(&hwp, &frp).expect("same shape");
        assert_eq!(masked, array![[3.0, 0.0], [0.0, 6.0]]);
    }

    #[test]
    fn mask_rejects_mismatched_fields() {
        let hwp = array![[3.0, 4.0]];
        let frp = array![[1.5, 0.0], [-1.0, 2.0]];
        assert!(mask_where_no_fire(&hwp, &frp).is_err());
    }

    #[test]
    fn product_picks_variable_names_by_mode() {
        let daily = EmissionProduct::Daily {
            frp: Array2::zeros((2, 2)),
            ebb: Array2::zeros((2, 2)),
        };
        assert_eq!(daily.frp_variable(), OutputVariableName::frp_davg);
        assert_eq!(daily.n_slices(), 1);

        let hourly = EmissionProduct::Hourly {
            frp: Array3::zeros((24, 2, 2)),
            ebb: Array3::zeros((24, 2, 2)),
        };
        assert_eq!(hourly.ebb_variable(), OutputVariableName::ebb_smoke_hr);
        assert_eq!(hourly.n_slices(), 24);
        assert!(hourly.daily_frp().is_none());
    }
}
