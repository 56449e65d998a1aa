use crate::chart_data::{CorrelationMatrix, ImportanceSeries};
use crate::config_loader::{load_config, AppConfig};
use crate::errors::{PriceError, PriceResult};
use crate::feature_builder::FeatureInputs;
use crate::feature_set::{FeatureSet, FeatureSetVariant, RatioMode};
use crate::feature_spec::{BoundsPolicy, NumericKind};
use crate::price_pipeline::PricePipeline;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI interface
#[derive(Parser, Debug)]
#[command(
    name = "house-price",
    version = "0.1.0",
    about = "California house price prediction from a fitted scaler and regressor"
)]
pub struct Cli {
    /// Configuration file (defaults to house_price.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured feature set (raw or extended)
    #[arg(long, global = true)]
    pub variant: Option<FeatureSetVariant>,

    /// Override how ratio features are sourced (accept_as_input or derive_from_raw)
    #[arg(long, global = true)]
    pub ratio_mode: Option<RatioMode>,

    /// Clamp out-of-range inputs instead of rejecting them
    #[arg(long, global = true)]
    pub clamp: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict a price from feature values
    Predict {
        /// Feature value as NAME=VALUE; repeat for each field
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// List the fields of the active feature set with bounds and defaults
    Fields,

    /// Show per-feature importance scores, if the model provides them
    Importances,

    /// Correlation matrix over the feature columns of a CSV dataset
    Correlation {
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Map point for the given (or default) location
    Location {
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Show the loaded pipeline
    Status,
}

/// Parse one `NAME=VALUE` pair
pub fn parse_assignment(raw: &str) -> PriceResult<(String, f64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| PriceError::validation(raw, "expected NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PriceError::validation(raw, "feature name is empty"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| PriceError::validation(name, format!("'{}' is not a number", value.trim())))?;
    Ok((name.to_string(), value))
}

pub fn parse_inputs(pairs: &[String]) -> PriceResult<FeatureInputs> {
    let mut inputs = FeatureInputs::new();
    for raw in pairs {
        let (name, value) = parse_assignment(raw)?;
        if inputs.insert(name.clone(), value).is_some() {
            return Err(PriceError::validation(name, "given more than once"));
        }
    }
    Ok(inputs)
}

impl Cli {
    /// Command-line flags take precedence over the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(mode) = self.ratio_mode {
            config.ratio_mode = mode;
        }
        if self.clamp {
            config.bounds_policy = BoundsPolicy::Clamp;
        }
        match self.verbose {
            0 => {}
            1 => config.log_level = "debug".to_string(),
            _ => config.log_level = "trace".to_string(),
        }
    }

    pub fn load_config(&self) -> PriceResult<AppConfig> {
        let mut config = load_config(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PriceResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| PriceError::serialization("cli output", e))
}

fn render_fields(feature_set: &FeatureSet, json: bool) -> PriceResult<String> {
    if json {
        return to_json(&feature_set.specs());
    }
    let mut out = format!("Feature set: {}\n", feature_set.variant());
    for spec in feature_set.specs() {
        let kind = match spec.kind {
            NumericKind::Integer => "int",
            NumericKind::Float => "float",
        };
        out.push_str(&format!(
            "{:<20} {:<22} {:<6} [{}, {}] default {}\n",
            spec.name, spec.label, kind, spec.min, spec.max, spec.default
        ));
    }
    Ok(out)
}

fn render_importances(pipeline: &PricePipeline, json: bool) -> PriceResult<String> {
    let series = pipeline.importances();
    if json {
        return to_json(&series);
    }
    Ok(match series {
        ImportanceSeries::Available { entries } => entries
            .iter()
            .map(|e| format!("{:<20} {:.4}\n", e.feature, e.score))
            .collect(),
        ImportanceSeries::Unavailable => format!(
            "Feature importance unavailable for {} model\n",
            pipeline.model_kind()
        ),
    })
}

fn render_correlation(matrix: &CorrelationMatrix, json: bool) -> PriceResult<String> {
    if json {
        return to_json(matrix);
    }
    let mut out = format!("{:<20}", "");
    for name in &matrix.features {
        out.push_str(&format!("{name:>20}"));
    }
    out.push('\n');
    for (name, row) in matrix.features.iter().zip(matrix.values.iter()) {
        out.push_str(&format!("{name:<20}"));
        for value in row {
            out.push_str(&format!("{value:>20.3}"));
        }
        out.push('\n');
    }
    Ok(out)
}

/// Run one command against a resolved configuration and return its output
pub fn execute(cli: &Cli, config: &AppConfig) -> PriceResult<String> {
    match &cli.command {
        Commands::Fields => render_fields(&FeatureSet::for_variant(config.variant), cli.json),
        Commands::Correlation { dataset } => {
            let path = dataset
                .clone()
                .or_else(|| config.dataset_path.clone())
                .ok_or_else(|| {
                    PriceError::validation("dataset", "no --dataset given and none configured")
                })?;
            let matrix =
                CorrelationMatrix::from_csv(&path, &FeatureSet::for_variant(config.variant))?;
            render_correlation(&matrix, cli.json)
        }
        Commands::Predict { set } => {
            let inputs = parse_inputs(set)?;
            let pipeline = PricePipeline::from_config(config)?;
            let estimate = pipeline.predict(&inputs)?;
            if cli.json {
                to_json(&estimate)
            } else {
                Ok(format!("Predicted House Price: {}\n", estimate.display))
            }
        }
        Commands::Importances => {
            let pipeline = PricePipeline::from_config(config)?;
            render_importances(&pipeline, cli.json)
        }
        Commands::Location { set } => {
            let inputs = parse_inputs(set)?;
            let pipeline = PricePipeline::from_config(config)?;
            let point = pipeline.location(&inputs)?;
            if cli.json {
                to_json(&point)
            } else {
                Ok(format!(
                    "Latitude: {}, Longitude: {}\n",
                    point.latitude, point.longitude
                ))
            }
        }
        Commands::Status => {
            let pipeline = PricePipeline::from_config(config)?;
            to_json(&pipeline.status())
        }
    }
}
