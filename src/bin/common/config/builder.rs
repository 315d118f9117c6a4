use fire_emiss::modules::ebb::config::{EbbMode, EmissionConstants};
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, Read};
use std::collections::HashMap;

use crate::common::helpers::FireEmissError;
use crate::common::io::readers::netcdf::NetCdfObservationConfiguration;

use super::models::Config;

pub type ConfigMap = HashMap<String, Vec<String>>;

const INPUT_DIR_KEY: &str = "INPUTDIR";
const INPUT_PREFIX_KEY: &str = "INPUTPREFIX";
const OUTPUT_DIR_KEY: &str = "OUTPUTDIR";
const VEG_MAP_KEY: &str = "VEGMAP";
const GRID_FILE_KEY: &str = "GRIDFILE";
const EBB_DCYCLE_KEY: &str = "EBBDCYCLE";
const BETA_KEY: &str = "BETA";
const FG_TO_UG_KEY: &str = "FGTOUG";
const TO_S_KEY: &str = "TOS";
const ANCILLARY_FILE_KEY: &str = "ANCILLARY";

trait ConfigMapExt {
    /// Get the first value of a key in the config map
    fn first(&self, key: &str) -> Option<String>;
    fn required(&self, key: &str) -> Result<String, FireEmissError>;
    fn number(&self, key: &str, default: f32) -> Result<f32, FireEmissError>;
}

impl ConfigMapExt for ConfigMap {
    fn first(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|values| values.first().cloned())
    }

    fn required(&self, key: &str) -> Result<String, FireEmissError> {
        self.first(key)
            .ok_or_else(|| format!("Error: {key} not found in config").into())
    }

    fn number(&self, key: &str, default: f32) -> Result<f32, FireEmissError> {
        match self.first(key) {
            Some(value) => value
                .trim()
                .parse::<f32>()
                .map_err(|_| format!("Invalid value for {key}: {value}").into()),
            None => Ok(default),
        }
    }
}

pub fn parse_config(contents: &str, file_name: &str) -> Result<ConfigMap, FireEmissError> {
    let mut config_map: ConfigMap = ConfigMap::new();

    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();

        if line.starts_with('%') || line.starts_with('#') || line.is_empty() {
            // skip comments and empty lines
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| format!("error parsing config file {file_name} at line {i}."))?;

        config_map
            .entry(key.trim().into())
            .or_default()
            .push(value.trim().into());
    }
    Ok(config_map)
}

pub fn read_config(file_name: impl Into<String>) -> Result<ConfigMap, FireEmissError> {
    let file_name = file_name.into();
    // open file as text and read it using a buffered reader
    let file =
        File::open(&file_name).map_err(|error| format!("error opening config file: {error}"))?;
    let reader = io::BufReader::new(file);
    let mut contents = String::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| format!("error line: {i} \n {error}"))?;
        contents.push_str(&line);
        contents.push('\n');
    }
    parse_config(&contents, &file_name)
}

fn default_emiss_factor_name() -> String {
    "emiss_factor".into()
}

fn default_lat_name() -> String {
    "grid_latt".into()
}

fn default_lon_name() -> String {
    "grid_lont".into()
}

fn default_area_name() -> String {
    "area".into()
}

fn default_hwp_name() -> String {
    "hwp_davg".into()
}

fn default_totprcp_name() -> String {
    "totprcp_24hrs".into()
}

/// Precomputed daily fields written next to the emissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncillaryConfig {
    pub path: String,
    #[serde(default = "default_hwp_name")]
    pub hwp_name: String,
    #[serde(default = "default_totprcp_name")]
    pub totprcp_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub path: String,
    #[serde(default = "default_lat_name")]
    pub lat_name: String,
    #[serde(default = "default_lon_name")]
    pub lon_name: String,
    #[serde(default = "default_area_name")]
    pub area_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireEmissConfigBuilder {
    pub input: NetCdfObservationConfiguration,
    pub output_path: String,
    pub vegetation_map: String,
    #[serde(default = "default_emiss_factor_name")]
    pub emiss_factor_name: String,
    pub grid: GridConfig,
    pub mode: EbbMode,
    #[serde(default)]
    pub constants: EmissionConstants,
    #[serde(default)]
    pub ancillary: Option<AncillaryConfig>,
}

impl FireEmissConfigBuilder {
    pub fn from_file(config_file: &str) -> Result<Self, FireEmissError> {
        // Check the file extension to determine which method to use
        if config_file.ends_with(".yaml") || config_file.ends_with(".yml") {
            Self::from_yaml(config_file)
        } else if config_file.ends_with(".txt") {
            Self::from_config_map(&read_config(config_file)?)
        } else {
            Err(FireEmissError::from(format!(
                "Unsupported config file format: {}",
                config_file
            )))
        }
    }

    pub fn from_yaml(config_file: &str) -> Result<Self, FireEmissError> {
        let mut file = File::open(config_file)
            .map_err(|err| format!("Cannot open config file {}: {}", config_file, err))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|err| format!("Cannot read config file {}: {}", config_file, err))?;

        Self::from_yaml_str(&contents)
            .map_err(|err| format!("Cannot parse config file {}: {}", config_file, err).into())
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn from_config_map(config_map: &ConfigMap) -> Result<Self, FireEmissError> {
        let input_path = config_map.required(INPUT_DIR_KEY)?;
        let input_prefix = config_map.required(INPUT_PREFIX_KEY)?;
        let output_path = config_map.required(OUTPUT_DIR_KEY)?;
        let vegetation_map = config_map.required(VEG_MAP_KEY)?;
        let grid_path = config_map.required(GRID_FILE_KEY)?;

        let mode = match config_map.first(EBB_DCYCLE_KEY) {
            Some(value) => {
                let ebb_dcycle = value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| format!("Invalid value for {EBB_DCYCLE_KEY}: {value}"))?;
                EbbMode::from_dcycle(ebb_dcycle)
            }
            None => EbbMode::Daily,
        };

        let defaults = EmissionConstants::default();
        let constants = EmissionConstants {
            beta: config_map.number(BETA_KEY, defaults.beta)?,
            fg_to_ug: config_map.number(FG_TO_UG_KEY, defaults.fg_to_ug)?,
            to_s: config_map.number(TO_S_KEY, defaults.to_s)?,
        };

        let ancillary = config_map.first(ANCILLARY_FILE_KEY).map(|path| AncillaryConfig {
            path,
            hwp_name: default_hwp_name(),
            totprcp_name: default_totprcp_name(),
        });

        Ok(FireEmissConfigBuilder {
            input: NetCdfObservationConfiguration::new(&input_path, &input_prefix),
            output_path,
            vegetation_map,
            emiss_factor_name: default_emiss_factor_name(),
            grid: GridConfig {
                path: grid_path,
                lat_name: default_lat_name(),
                lon_name: default_lon_name(),
                area_name: default_area_name(),
            },
            mode,
            constants,
            ancillary,
        })
    }

    pub fn build(&self, current_day: &str) -> Result<Config, FireEmissError> {
        Config::new(self, current_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXT_CONFIG: &str = "
# interpolated RAVE
INPUTDIR=/data/intp
INPUTPREFIX=RAVE-HrlyEmiss-3km_
OUTPUTDIR=/data/out
VEGMAP=/data/veg_map.nc
GRIDFILE=/data/grid_in.nc
EBBDCYCLE=1
BETA=0.5
";

    #[test]
    fn parse_line_fails_for_malformed_line() {
        let result = parse_config("INPUTDIR /data/intp", "test.txt");
        assert!(result.is_err());
    }

    #[test]
    fn repeated_keys_are_kept_in_order() {
        let map = parse_config("A=1\nA=2\n% comment\nB = x", "test.txt").expect("should parse");
        assert_eq!(map.get("A"), Some(&vec!["1".to_owned(), "2".to_owned()]));
        assert_eq!(map.first("B"), Some("x".to_owned()));
    }

    #[test]
    fn builder_from_txt_config() {
        let map = parse_config(TXT_CONFIG, "test.txt").expect("should parse");
        let builder = FireEmissConfigBuilder::from_config_map(&map).expect("should build");
        assert_eq!(builder.mode, EbbMode::Hourly);
        assert_eq!(builder.input.prefix, "RAVE-HrlyEmiss-3km_");
        assert_eq!(builder.input.frp_name, "frp_avg_hr");
        assert_eq!(builder.constants.beta, 0.5);
        assert_eq!(builder.constants.to_s, 3600.0);
        assert_eq!(builder.grid.area_name, "area");
        assert!(builder.ancillary.is_none());
    }

    #[test]
    fn builder_from_txt_requires_paths() {
        let map = parse_config("INPUTDIR=/data/intp", "test.txt").expect("should parse");
        assert!(FireEmissConfigBuilder::from_config_map(&map).is_err());
    }

    #[test]
    fn builder_from_yaml() {
        let yaml = "
input:
  path: /data/intp
  prefix: RAVE_
output_path: /data/out
vegetation_map: /data/veg_map.nc
grid:
  path: /data/grid_in.nc
mode: daily
ancillary:
  path: /data/hwp.nc
";
        let builder = FireEmissConfigBuilder::from_yaml_str(yaml).expect("should parse");
        assert_eq!(builder.mode, EbbMode::Daily);
        assert_eq!(builder.constants, EmissionConstants::default());
        assert_eq!(builder.grid.lat_name, "grid_latt");
        assert_eq!(builder.emiss_factor_name, "emiss_factor");
        let ancillary = builder.ancillary.expect("ancillary configured");
        assert_eq!(ancillary.hwp_name, "hwp_davg");
    }
}
