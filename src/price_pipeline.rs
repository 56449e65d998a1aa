//! price_pipeline.rs
//! Builder -> scaler -> predictor -> formatter, bound together once at
//! startup and shared read-only afterwards.

use crate::artifact_loader::{load_model, load_scaler};
use crate::chart_data::{ImportanceSeries, LocationPoint};
use crate::config_loader::AppConfig;
use crate::errors::{PriceError, PriceResult};
use crate::feature_builder::{BuilderOptions, FeatureInputs, FeatureVector, FeatureVectorBuilder};
use crate::feature_set::{FeatureSet, FeatureSetVariant};
use crate::predictor::Predictor;
use crate::price_formatter::PriceFormatter;
use crate::scaler::Scaler;
use serde::Serialize;
use tracing::{debug, info};

/// Result of one prediction request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEstimate {
    pub variant: FeatureSetVariant,
    /// Raw model output, in units of $100,000
    pub scalar: f64,
    /// Price in dollars
    pub amount: f64,
    pub display: String,
}

pub struct PricePipeline {
    builder: FeatureVectorBuilder,
    scaler: Box<dyn Scaler>,
    predictor: Box<dyn Predictor>,
    formatter: PriceFormatter,
}

fn check_names(stage: &str, expected: &[&str], recorded: Option<&[String]>) -> PriceResult<()> {
    if let Some(names) = recorded {
        if names.len() != expected.len() {
            return Err(PriceError::feature_count(
                format!("{stage} feature names"),
                expected.len(),
                names.len(),
            ));
        }
        for (position, (want, got)) in expected.iter().zip(names.iter()).enumerate() {
            if *want != got.as_str() {
                return Err(PriceError::feature_order(stage, position, *want, got.as_str()));
            }
        }
    }
    Ok(())
}

impl PricePipeline {
    /// Bind the stages together. Both artifacts must pass their own
    /// structural checks and feature counts must agree across the
    /// feature set, scaler and predictor; recorded feature names, when the
    /// artifacts carry them, must match the feature-set order exactly.
    pub fn new(
        feature_set: FeatureSet,
        options: BuilderOptions,
        scaler: Box<dyn Scaler>,
        predictor: Box<dyn Predictor>,
        formatter: PriceFormatter,
    ) -> PriceResult<Self> {
        scaler.validate()?;
        predictor.validate()?;

        let expected = feature_set.len();
        if scaler.n_features() != expected {
            return Err(PriceError::feature_count("scaler", expected, scaler.n_features()));
        }
        if predictor.n_features() != expected {
            return Err(PriceError::feature_count(
                "predictor",
                expected,
                predictor.n_features(),
            ));
        }

        let names = feature_set.names();
        check_names("scaler", &names, scaler.feature_names())?;
        check_names("predictor", &names, predictor.feature_names())?;

        info!(
            message = "Price pipeline ready",
            variant = %feature_set.variant(),
            n_features = expected,
            model = predictor.kind(),
            bounds_policy = ?options.bounds_policy,
            ratio_mode = ?options.ratio_mode
        );

        Ok(Self {
            builder: FeatureVectorBuilder::new(feature_set, options),
            scaler,
            predictor,
            formatter,
        })
    }

    /// Load both artifacts named by the configuration. Any failure here is
    /// fatal for the process.
    pub fn from_config(config: &AppConfig) -> PriceResult<Self> {
        config.validate()?;
        let scaler = load_scaler(&config.scaler_path, config.scaler_sha256.as_deref())?;
        let predictor = load_model(&config.model_path, config.model_sha256.as_deref())?;
        Self::new(
            FeatureSet::for_variant(config.variant),
            config.builder_options(),
            scaler,
            predictor,
            config.formatter(),
        )
    }

    pub fn feature_set(&self) -> &FeatureSet {
        self.builder.feature_set()
    }

    pub fn builder(&self) -> &FeatureVectorBuilder {
        &self.builder
    }

    pub fn formatter(&self) -> &PriceFormatter {
        &self.formatter
    }

    pub fn model_kind(&self) -> &'static str {
        self.predictor.kind()
    }

    pub fn build(&self, inputs: &FeatureInputs) -> PriceResult<FeatureVector> {
        self.builder.build(inputs)
    }

    pub fn predict(&self, inputs: &FeatureInputs) -> PriceResult<PriceEstimate> {
        let vector = self.builder.build(inputs)?;
        self.predict_vector(&vector)
    }

    /// Run a vector that was built earlier, possibly by another builder
    pub fn predict_vector(&self, vector: &FeatureVector) -> PriceResult<PriceEstimate> {
        let variant = self.feature_set().variant();
        if vector.variant() != variant {
            return Err(PriceError::VariantMismatch {
                expected: variant.to_string(),
                actual: vector.variant().to_string(),
            });
        }

        let scaled = self.scaler.transform(vector.values())?;
        let scalar = self.predictor.predict(&scaled)?;
        if !scalar.is_finite() {
            return Err(PriceError::inference(format!(
                "{} model produced a non-finite output",
                self.predictor.kind()
            )));
        }

        debug!(message = "Prediction complete", scalar = scalar);

        Ok(PriceEstimate {
            variant,
            scalar,
            amount: self.formatter.amount(scalar),
            display: self.formatter.format(scalar),
        })
    }

    /// Importance bars, or `Unavailable` for model families without them
    pub fn importances(&self) -> ImportanceSeries {
        ImportanceSeries::from_importance(&self.feature_set().names(), &self.predictor.importances())
    }

    pub fn location(&self, inputs: &FeatureInputs) -> PriceResult<LocationPoint> {
        let vector = self.builder.build(inputs)?;
        LocationPoint::from_vector(self.feature_set(), &vector)
    }

    pub fn status(&self) -> serde_json::Value {
        serde_json::json!({
            "variant": self.feature_set().variant(),
            "n_features": self.feature_set().len(),
            "model": self.predictor.kind(),
            "importances_available": self.predictor.importances().is_available(),
            "bounds_policy": self.builder.options().bounds_policy,
            "ratio_mode": self.builder.options().ratio_mode,
        })
    }
}
