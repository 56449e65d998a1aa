// config_loader.rs
// Purpose: Layered configuration for artifact locations and pipeline behaviour

use crate::errors::{PriceError, PriceResult};
use crate::feature_builder::BuilderOptions;
use crate::feature_set::{FeatureSetVariant, RatioMode};
use crate::feature_spec::BoundsPolicy;
use crate::price_formatter::{PriceFormatter, DEFAULT_CURRENCY_SYMBOL, PRICE_UNIT};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "HOUSE_PRICE_";
pub const CONFIG_PATH_ENV: &str = "HOUSE_PRICE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "house_price.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    #[serde(default)]
    pub model_sha256: Option<String>,
    #[serde(default)]
    pub scaler_sha256: Option<String>,
    pub variant: FeatureSetVariant,
    pub ratio_mode: RatioMode,
    pub bounds_policy: BoundsPolicy,
    pub currency_symbol: String,
    pub price_unit: f64,
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    pub log_level: String,
}

#[derive(Serialize)]
struct AppConfigDefaults {
    model_path: PathBuf,
    scaler_path: PathBuf,
    variant: FeatureSetVariant,
    ratio_mode: RatioMode,
    bounds_policy: BoundsPolicy,
    currency_symbol: String,
    price_unit: f64,
    log_level: String,
}

impl Default for AppConfigDefaults {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.json"),
            scaler_path: PathBuf::from("artifacts/scaler.json"),
            variant: FeatureSetVariant::Raw,
            ratio_mode: RatioMode::AcceptAsInput,
            bounds_policy: BoundsPolicy::Reject,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            price_unit: PRICE_UNIT,
            log_level: "info".to_string(),
        }
    }
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

impl AppConfig {
    pub fn validate(&self) -> PriceResult<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(PriceError::config("model_path cannot be empty"));
        }
        if self.scaler_path.as_os_str().is_empty() {
            return Err(PriceError::config("scaler_path cannot be empty"));
        }
        if !self.price_unit.is_finite() || self.price_unit <= 0.0 {
            return Err(PriceError::config(format!(
                "price_unit must be a positive number, got {}",
                self.price_unit
            )));
        }
        for (key, digest) in [
            ("model_sha256", &self.model_sha256),
            ("scaler_sha256", &self.scaler_sha256),
        ] {
            if let Some(d) = digest {
                if !is_sha256_hex(d.trim()) {
                    return Err(PriceError::config(format!(
                        "{key} must be a 64-character hex digest"
                    )));
                }
            }
        }
        self.tracing_level()?;
        Ok(())
    }

    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            bounds_policy: self.bounds_policy,
            ratio_mode: self.ratio_mode,
        }
    }

    pub fn formatter(&self) -> PriceFormatter {
        PriceFormatter::new(self.currency_symbol.clone(), self.price_unit)
    }

    pub fn tracing_level(&self) -> PriceResult<tracing::Level> {
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| PriceError::config(format!("unknown log_level '{}'", self.log_level)))
    }
}

/// Defaults, then the per-user config file, then `house_price.toml` (or the
/// explicit path / `HOUSE_PRICE_CONFIG`), then `HOUSE_PRICE_*` variables.
pub fn figment(config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfigDefaults::default()));

    if let Some(dir) = dirs::config_dir() {
        figment = figment.merge(Toml::file(dir.join("house_price").join("config.toml")));
    }

    let file = config_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    figment.merge(Toml::file(file)).merge(Env::prefixed(ENV_PREFIX))
}

pub fn load_config(config_path: Option<&Path>) -> PriceResult<AppConfig> {
    let config: AppConfig = figment(config_path).extract()?;
    config.validate()?;
    Ok(config)
}
