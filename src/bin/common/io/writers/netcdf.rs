use std::path::{Path, PathBuf};

use fire_emiss::models::output::OutputVariableName;
use log::debug;
use netcdf::{extent::Extents, MutableFile};

use crate::common::{
    helpers::FireEmissError,
    io::models::output::{EmissionOutput, OutputField},
};

pub const TIME_DIM: &str = "t";
pub const LAT_DIM: &str = "lat";
pub const LON_DIM: &str = "lon";

/// Writes the emission file of one forecast cycle
pub struct NetcdfWriter {
    path: PathBuf,
}

impl NetcdfWriter {
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    /// output file of the cycle starting at `current_day` (`YYYYMMDDHH`)
    pub fn file_name(&self, current_day: &str) -> PathBuf {
        self.path.join(format!("SMOKE_RRFS_data_{}00.nc", current_day))
    }

    pub fn write(
        &self,
        current_day: &str,
        output: &EmissionOutput,
    ) -> Result<PathBuf, FireEmissError> {
        let file_name = self.file_name(current_day);
        let mut file = create_emiss_file(&file_name, output)?;

        store_coordinate(
            &mut file,
            OutputVariableName::geolat,
            output.lats.iter().cloned().collect(),
        )?;
        store_coordinate(
            &mut file,
            OutputVariableName::geolon,
            output.lons.iter().cloned().collect(),
        )?;

        for field in &output.fields {
            debug!("[NC] Writing variable {} to {}", field.name, file_name.display());
            store_by_level(&mut file, field, output)?;
        }
        Ok(file_name)
    }
}

fn create_emiss_file(
    file_name: &Path,
    output: &EmissionOutput,
) -> Result<MutableFile, FireEmissError> {
    let options = netcdf::Options::NETCDF4;
    let mut file = netcdf::create_with(file_name, options)
        .map_err(|err| format!("can't create file {}: {err}", file_name.display()))?;

    file.add_dimension(TIME_DIM, output.n_slices())
        .map_err(|err| format!("Add {TIME_DIM} dimension failed: {err}"))?;
    file.add_dimension(LAT_DIM, output.grid.nrows)
        .map_err(|err| format!("Add {LAT_DIM} dimension failed: {err}"))?;
    file.add_dimension(LON_DIM, output.grid.ncols)
        .map_err(|err| format!("Add {LON_DIM} dimension failed: {err}"))?;
    Ok(file)
}

fn add_metadata(
    var: &mut netcdf::VariableMut,
    name: OutputVariableName,
) -> Result<(), FireEmissError> {
    var.put_attribute("long_name", name.long_name())
        .map_err(|err| format!("Add long_name to {name} failed: {err}"))?;
    var.put_attribute("units", name.units())
        .map_err(|err| format!("Add units to {name} failed: {err}"))?;
    var.put_attribute("missing_value", name.fill_value())
        .map_err(|err| format!("Add missing_value to {name} failed: {err}"))?;
    Ok(())
}

fn store_coordinate(
    file: &mut MutableFile,
    name: OutputVariableName,
    values: Vec<f32>,
) -> Result<(), FireEmissError> {
    let var_name = name.to_string();
    let mut var = file
        .add_variable::<f32>(&var_name, &[LAT_DIM, LON_DIM])
        .map_err(|err| format!("Add {var_name} failed: {err}"))?;
    add_metadata(&mut var, name)?;
    var.put_values(&values, Extents::All)
        .map_err(|err| format!("Writing {var_name} failed: {err}"))?;
    Ok(())
}

fn store_by_level(
    file: &mut MutableFile,
    field: &OutputField,
    output: &EmissionOutput,
) -> Result<(), FireEmissError> {
    let var_name = field.name.to_string();
    let mut var = file
        .add_variable::<f32>(&var_name, &[TIME_DIM, LAT_DIM, LON_DIM])
        .map_err(|err| format!("Add {var_name} failed: {err}"))?;
    add_metadata(&mut var, field.name)?;

    let extents: Extents = (
        &[0, 0, 0],
        &[field.n_slices, output.grid.nrows, output.grid.ncols],
    )
        .try_into()
        .map_err(|err| format!("Invalid extents for {var_name}: {err}"))?;
    var.put_values(&field.values, extents)
        .map_err(|err| format!("Writing {var_name} failed: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_file_embeds_the_cycle() {
        let writer = NetcdfWriter::new("/data/out");
        assert_eq!(
            writer.file_name("2024071512"),
            PathBuf::from("/data/out/SMOKE_RRFS_data_202407151200.nc")
        );
    }
}
