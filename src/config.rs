use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default number of customers synthesized for a fresh data set.
pub const DEFAULT_NUM_CUSTOMERS: usize = 20;
/// Default number of products, one per catalogue entry.
pub const DEFAULT_NUM_PRODUCTS: usize = 10;
/// Default number of orders per month (or per single file).
pub const DEFAULT_ORDERS_PER_MONTH: usize = 50;
/// Default span of a multi-year backfill, counted back from the current year.
pub const DEFAULT_LOOKBACK_YEARS: i32 = 5;
/// Default trailing window for single-file mode.
pub const DEFAULT_SINGLE_FILE_DAYS: u32 = 90;
/// Default consolidated output of single-file mode.
pub const DEFAULT_SINGLE_OUTPUT_FILE: &str = "customer_orders.csv";

const DEFAULT_DATA_DIR: &str = "fuel_orders_data";
const DEFAULT_LOG_DIR: &str = "logs";

/// Result type returned by configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid generator config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("generator config validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("environment variable {name} has invalid value `{value}`")]
    InvalidEnv { name: &'static str, value: String },
}

/// Process-level settings read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root of the CSV store (`DATA_DIR`).
    pub data_dir: PathBuf,
    /// Directory receiving run logs (`LOG_DIR`).
    pub log_dir: PathBuf,
    /// Seed for the random source (`GENERATOR_SEED`).
    pub seed: Option<u64>,
    /// Optional JSON file overriding the generator defaults (`GENERATOR_CONFIG`).
    pub generator_config: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let seed = match non_empty("GENERATOR_SEED") {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidEnv {
                    name: "GENERATOR_SEED",
                    value,
                }
            })?),
            None => None,
        };

        Ok(Self {
            data_dir: non_empty("DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            log_dir: non_empty("LOG_DIR")
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())
                .into(),
            seed,
            generator_config: non_empty("GENERATOR_CONFIG").map(PathBuf::from),
        })
    }
}

/// Catalogue entry products are synthesized from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductTemplate {
    /// Abbreviation, also used as product code prefix.
    pub abbrev: String,
    pub name: String,
    pub group: String,
    pub cycle_code: String,
    pub method: String,
    pub account_group: String,
    pub tax_profile: String,
    pub tax_group: String,
    pub packaging: String,
    pub unit_of_measure: String,
}

impl ProductTemplate {
    fn fuel(
        abbrev: &str,
        name: &str,
        cycle_code: &str,
        account_group: &str,
        tax_profile: &str,
        tax_group: &str,
    ) -> Self {
        Self {
            abbrev: abbrev.to_string(),
            name: name.to_string(),
            group: "Fuel".to_string(),
            cycle_code: cycle_code.to_string(),
            method: "Direct".to_string(),
            account_group: account_group.to_string(),
            tax_profile: tax_profile.to_string(),
            tax_group: tax_group.to_string(),
            packaging: "Bulk".to_string(),
            unit_of_measure: "Gallon".to_string(),
        }
    }
}

/// Inclusive amount range in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CentsRange {
    pub low: i64,
    pub high: i64,
}

/// Inclusive fractional range, e.g. a tax rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RateRange {
    pub low: f64,
    pub high: f64,
}

/// Inclusive quantity range drawn in multiples of `step`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

/// Relative weights of the generated order statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusWeights {
    pub completed: u32,
    pub in_progress: u32,
    pub pending: u32,
}

/// A flat-rate charge that may be added to an order line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandardCharge {
    pub name: String,
    pub amount_cents: i64,
}

impl StandardCharge {
    fn new(name: &str, amount_cents: i64) -> Self {
        Self {
            name: name.to_string(),
            amount_cents,
        }
    }
}

/// Tunables of the reference-data and order generators.
///
/// Every field has a default, so a JSON override only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_ranges"))]
pub struct GeneratorConfig {
    #[validate(length(min = 1))]
    pub catalogue: Vec<ProductTemplate>,
    /// Range the lower bound of a product's price is drawn from.
    pub min_price_cents: CentsRange,
    /// Range the upper bound of a product's price is drawn from.
    pub max_price_cents: CentsRange,
    pub quantity: QuantityRange,
    #[validate(range(min = 1, max = 99))]
    pub max_sequences_per_customer: u32,
    #[validate(length(min = 1))]
    pub sequence_labels: Vec<String>,
    #[validate(range(min = 1))]
    pub max_line_items: usize,
    pub status_weights: StatusWeights,
    #[validate(range(min = 0.0, max = 1.0))]
    pub po_required_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub charge_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub special_charge_probability: f64,
    pub special_charge_cents: CentsRange,
    pub standard_charges: Vec<StandardCharge>,
    pub tax_rate: RateRange,
    /// Largest share of the taxes that may be exempted.
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_exempt_share: f64,
    /// Cost of goods as a share of the extended price.
    #[validate(range(min = 0.0, max = 1.0))]
    pub cost_ratio: f64,
    #[validate(length(min = 1))]
    pub customer_code_prefix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            catalogue: vec![
                ProductTemplate::fuel("REG", "Regular Gasoline", "C1", "Retail", "T1", "Fuel Tax"),
                ProductTemplate::fuel("PRM", "Premium Gasoline", "C1", "Retail", "T1", "Fuel Tax"),
                ProductTemplate::fuel("DSL", "Diesel", "C2", "Commercial", "T1", "Fuel Tax"),
                ProductTemplate::fuel("KRS", "Kerosene", "C2", "Commercial", "T1", "Fuel Tax"),
                ProductTemplate::fuel("ETH", "Ethanol", "C3", "Retail", "T2", "Alt Fuel Tax"),
                ProductTemplate::fuel("BIO", "Biodiesel", "C3", "Commercial", "T2", "Alt Fuel Tax"),
                ProductTemplate::fuel("E85", "E85 Fuel", "C3", "Retail", "T2", "Alt Fuel Tax"),
                ProductTemplate::fuel("DNF", "Diesel No Freeze", "C2", "Commercial", "T1", "Fuel Tax"),
                ProductTemplate::fuel("JET", "Jet Fuel", "C4", "Aviation", "T3", "Aviation Tax"),
                ProductTemplate::fuel("AVG", "Aviation Gasoline", "C4", "Aviation", "T3", "Aviation Tax"),
            ],
            min_price_cents: CentsRange { low: 250, high: 320 },
            max_price_cents: CentsRange { low: 350, high: 450 },
            quantity: QuantityRange {
                min: 200,
                max: 3500,
                step: 10,
            },
            max_sequences_per_customer: 5,
            sequence_labels: ["Location", "Facility", "Building", "Warehouse", "Tank", "Station"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_line_items: 3,
            status_weights: StatusWeights {
                completed: 90,
                in_progress: 5,
                pending: 5,
            },
            po_required_probability: 0.6,
            charge_probability: 0.1,
            special_charge_probability: 0.3,
            special_charge_cents: CentsRange {
                low: 1000,
                high: 5000,
            },
            standard_charges: vec![
                StandardCharge::new("Labor Charge", 8500),
                StandardCharge::new("Pump Fee", 4500),
                StandardCharge::new("After Hours Fee", 12500),
                StandardCharge::new("Weekend Delivery", 7500),
                StandardCharge::new("Rush Delivery", 9500),
            ],
            tax_rate: RateRange {
                low: 0.05,
                high: 0.10,
            },
            max_exempt_share: 0.3,
            cost_ratio: 0.85,
            customer_code_prefix: "CUST".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON override from `path`, filling absent keys with defaults, and validate it.
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the override when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }
}

fn validate_ranges(config: &GeneratorConfig) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    for (name, range) in [
        ("min_price_cents", config.min_price_cents),
        ("max_price_cents", config.max_price_cents),
        ("special_charge_cents", config.special_charge_cents),
    ] {
        if range.low < 0 || range.low > range.high {
            problems.push(name);
        }
    }
    if config.min_price_cents.low > config.max_price_cents.high {
        problems.push("min_price_cents");
    }

    let quantity = config.quantity;
    if quantity.step == 0
        || quantity.min > quantity.max
        || quantity.min.div_ceil(quantity.step) > quantity.max / quantity.step
    {
        problems.push("quantity");
    }

    let weights = config.status_weights;
    if weights.completed + weights.in_progress + weights.pending == 0 {
        problems.push("status_weights");
    }

    if config.charge_probability > 0.0 && config.standard_charges.is_empty() {
        problems.push("standard_charges");
    }
    if config.standard_charges.iter().any(|charge| charge.amount_cents < 0) {
        problems.push("standard_charges");
    }

    let rate = config.tax_rate;
    if !(0.0..=1.0).contains(&rate.low) || !(0.0..=1.0).contains(&rate.high) || rate.low > rate.high
    {
        problems.push("tax_rate");
    }

    if problems.is_empty() {
        return Ok(());
    }

    problems.sort_unstable();
    problems.dedup();
    let mut error = ValidationError::new("invalid_range");
    error.message = Some(format!("invalid settings: {}", problems.join(", ")).into());
    Err(error)
}
