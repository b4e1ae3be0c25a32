use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::aggregate::DEFAULT_TOP_CUISINES;
use crate::filter::{FilterDefaults, FilterParams, PriceRange};
use crate::schema::CleanTable;

/// Path of the YAML config file.
pub const CONFIG_ENV: &str = "ZOMATO_EDA_CONFIG";
/// Overrides `data_path`.
pub const DATA_ENV: &str = "ZOMATO_EDA_DATA";
/// Read from the working directory when `ZOMATO_EDA_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "zomato_eda.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    pub top_cuisines: usize,
    /// Rows of the data table printed with the dashboard.
    pub table_rows: usize,
    /// Read filter commands from stdin after the first render.
    pub interactive: bool,
    pub defaults: FilterDefaults,
    /// Explicit initial selection; unset parts fall back to `defaults`.
    pub filters: FilterOverrides,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOverrides {
    pub locations: Option<Vec<String>>,
    pub service_types: Option<Vec<String>>,
    pub price_range: Option<PriceRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Dashboard snapshot as JSON.
    pub json: Option<PathBuf>,
    /// Filtered data table as Parquet.
    pub parquet: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/zomato.csv"),
            top_cuisines: DEFAULT_TOP_CUISINES,
            table_rows: 20,
            interactive: false,
            defaults: FilterDefaults::default(),
            filters: FilterOverrides::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("parsing YAML config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config `{}`", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in config `{}`", path.display()))
    }

    /// Config from `ZOMATO_EDA_CONFIG`, else `zomato_eda.yaml` if present,
    /// else defaults; then `ZOMATO_EDA_DATA` is applied.
    pub fn load() -> Result<Self> {
        let config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_path(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(config.with_data_override(env::var_os(DATA_ENV)))
    }

    pub fn with_data_override(mut self, data_path: Option<OsString>) -> Self {
        if let Some(p) = data_path.filter(|p| !p.is_empty()) {
            self.data_path = PathBuf::from(p);
        }
        self
    }

    /// First selection for `table`: sidebar defaults with configured
    /// overrides applied on top.
    pub fn initial_params(&self, table: &CleanTable) -> FilterParams {
        let mut params = FilterParams::initial(table, &self.defaults);
        if let Some(locations) = &self.filters.locations {
            params.locations = locations.iter().cloned().collect();
        }
        if let Some(types) = &self.filters.service_types {
            params.service_types = types.iter().cloned().collect();
        }
        if let Some(range) = self.filters.price_range {
            params.price_range = range;
        }
        params
    }
}
