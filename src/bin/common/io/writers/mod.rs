pub mod netcdf;
