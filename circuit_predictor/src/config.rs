//! Runtime configuration, loaded from TOML with every field defaulted.

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared_utils::config::{ConfigError, load_toml};
use shared_utils::env::get_env_var_opt;

use crate::features::FeatureWindows;
use crate::model::random_forest::ForestConfig;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "CIRCUIT_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorConfig {
    pub model: ModelConfig,
    pub forest: ForestConfig,
    pub data: DataConfig,
    pub scan: ScanConfig,
    pub watchlist: Watchlist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Symmetric circuit threshold, in percent.
    pub threshold_pct: f64,
    pub volume_window: usize,
    pub volatility_window: usize,
    /// Feature rows required before a model is trained.
    pub min_rows: usize,
    /// Share of rows held out from training.
    pub test_fraction: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            threshold_pct: 10.0,
            volume_window: 10,
            volatility_window: 6,
            min_rows: 50,
            test_fraction: 0.2,
        }
    }
}

impl ModelConfig {
    pub fn windows(&self) -> FeatureWindows {
        FeatureWindows {
            volume_window: self.volume_window,
            volatility_window: self.volatility_window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub interval_minutes: u32,
    /// Trailing trading sessions of history to train on.
    pub history_days: u32,
    pub request_timeout_secs: u64,
    pub requests_per_second: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            history_days: 5,
            request_timeout_secs: 20,
            requests_per_second: 4,
        }
    }
}

impl DataConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub top_n: usize,
    /// Symbols analysed at the same time.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            concurrency: 4,
        }
    }
}

/// Display name to ticker, in the order the user listed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist(pub IndexMap<String, String>);

const NSE_WATCHLIST: &[(&str, &str)] = &[
    ("Reliance Industries", "RELIANCE.NS"),
    ("TCS", "TCS.NS"),
    ("Infosys", "INFY.NS"),
    ("HDFC Bank", "HDFCBANK.NS"),
    ("ICICI Bank", "ICICIBANK.NS"),
    ("SBI", "SBIN.NS"),
    ("ITC", "ITC.NS"),
    ("L&T", "LT.NS"),
    ("Bharti Airtel", "BHARTIARTL.NS"),
    ("ONGC", "ONGC.NS"),
    ("Oil India", "OILINDIA.NS"),
    ("Coal India", "COALINDIA.NS"),
    ("Vedanta", "VEDL.NS"),
    ("Hindustan Copper", "HINDCOPPER.NS"),
    ("National Aluminium", "NATIONALUM.NS"),
    ("HAL", "HAL.NS"),
    ("BEL", "BEL.NS"),
    ("NBCC", "NBCC.NS"),
    ("HCC", "HCC.NS"),
    ("NESCO", "NESCO.NS"),
    ("KPIL (KPEL)", "KPEL.NS"),
    ("Mangalam Industrial", "MANGIND.NS"),
    ("Suzlon", "SUZLON.NS"),
    ("JP Power", "JPPOWER.NS"),
    ("Surana Solar", "SURANASOL.NS"),
    ("Adani Green", "ADANIGREEN.NS"),
    ("IDFC First Bank", "IDFCFIRSTB.NS"),
    ("ICICI AMC", "ICICIAMC.NS"),
    ("IFCI", "IFCI.NS"),
    ("South Indian Bank", "SOUTHBANK.NS"),
    ("Silver ETF", "SILVERBEES.NS"),
    ("Nava Bharat", "NAVA.NS"),
    ("Rama Steel", "RAMASTEEL.NS"),
    ("Nitiraj Engineers", "NITIRAJ.NS"),
    ("Osiajee Texfab", "OSIAJEE.NS"),
    ("Gandhar Oil", "GANDHAR.NS"),
    ("Excel Realty", "EXCEL.NS"),
    ("Prozone Intu", "PROZONER.NS"),
    ("Rhetan TMT", "RHETAN.NS"),
    ("Tenneco India", "TENNIND.NS"),
];

impl Default for Watchlist {
    fn default() -> Self {
        Self(
            NSE_WATCHLIST
                .iter()
                .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
                .collect(),
        )
    }
}

impl Watchlist {
    pub fn symbol_for(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, s)| s.as_str())
    }

    /// Display name for a ticker, if it is on the list.
    pub fn name_for(&self, symbol: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(symbol))
            .map(|(n, _)| n.as_str())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PredictorConfig {
    /// Loads `path`, else the file named by `CIRCUIT_CONFIG`, else the built-in
    /// defaults. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match get_env_var_opt(CONFIG_ENV_VAR) {
                Some(env_path) => Self::from_file(Path::new(&env_path))?,
                None => {
                    tracing::debug!("no config file given, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading config");
        load_toml(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.model.threshold_pct.is_finite() && self.model.threshold_pct > 0.0) {
            return invalid("model.threshold_pct must be a positive number");
        }
        self.model.windows().validate().map_err(ConfigError::Invalid)?;
        if !(self.model.test_fraction > 0.0 && self.model.test_fraction < 1.0) {
            return invalid("model.test_fraction must lie strictly between 0 and 1");
        }
        if self.forest.n_trees == 0 {
            return invalid("forest.n_trees must be at least 1");
        }
        if self.forest.max_depth == 0 {
            return invalid("forest.max_depth must be at least 1");
        }
        if self.forest.max_features == Some(0) {
            return invalid("forest.max_features must be at least 1");
        }
        if self.data.interval_minutes == 0 || self.data.interval_minutes > 59 {
            return invalid("data.interval_minutes must be between 1 and 59");
        }
        if self.data.history_days == 0 {
            return invalid("data.history_days must be at least 1");
        }
        if self.data.requests_per_second == 0 {
            return invalid("data.requests_per_second must be at least 1");
        }
        if self.scan.concurrency == 0 {
            return invalid("scan.concurrency must be at least 1");
        }
        if self.watchlist.is_empty() {
            return invalid("watchlist must name at least one symbol");
        }
        Ok(())
    }
}
