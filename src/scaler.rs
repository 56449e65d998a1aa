// scaler.rs
// Purpose: Pre-fitted affine transforms applied to raw feature vectors before inference

use crate::errors::{PriceError, PriceResult};
use serde::{Deserialize, Serialize};

/// Scaled feature values, used only as predictor input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledVector(Vec<f64>);

impl ScaledVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fitted feature transform. Parameters are fixed at fit time, so
/// `transform` is pure and safe to share across threads.
pub trait Scaler: Send + Sync {
    /// Number of features the transform was fitted on
    fn n_features(&self) -> usize;

    /// Feature names recorded at fit time, if the artifact carries them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn validate(&self) -> PriceResult<()> {
        Ok(())
    }

    fn transform(&self, values: &[f64]) -> PriceResult<ScaledVector>;
}

fn ensure_len(stage: &str, expected: usize, actual: usize) -> PriceResult<()> {
    if expected != actual {
        return Err(PriceError::feature_count(stage, expected, actual));
    }
    Ok(())
}

fn ensure_finite(field: &str, values: &[f64]) -> PriceResult<()> {
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(PriceError::config(format!(
            "scaler parameter {field}[{i}] is not finite"
        )));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

/// Standardisation: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> PriceResult<Self> {
        let scaler = Self {
            mean,
            scale,
            with_mean: true,
            with_std: true,
            feature_names: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> PriceResult<()> {
        ensure_len("standard scaler parameters", self.mean.len(), self.scale.len())?;
        ensure_finite("mean", &self.mean)?;
        ensure_finite("scale", &self.scale)?;
        if let Some(names) = &self.feature_names {
            ensure_len("standard scaler feature names", self.mean.len(), names.len())?;
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> PriceResult<()> {
        StandardScaler::validate(self)
    }

    fn transform(&self, values: &[f64]) -> PriceResult<ScaledVector> {
        ensure_len("scaler transform", self.n_features(), values.len())?;
        let scaled = values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                let centered = if self.with_mean { x - mean } else { *x };
                // Constant features were fitted with zero variance
                let divisor = if *scale == 0.0 { 1.0 } else { *scale };
                if self.with_std {
                    centered / divisor
                } else {
                    centered
                }
            })
            .collect();
        Ok(ScaledVector(scaled))
    }
}

/// Min-max scaling in its fitted affine form: `x * scale + min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> PriceResult<Self> {
        let scaler = Self {
            min,
            scale,
            feature_names: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> PriceResult<()> {
        ensure_len("min-max scaler parameters", self.min.len(), self.scale.len())?;
        ensure_finite("min", &self.min)?;
        ensure_finite("scale", &self.scale)?;
        if let Some(names) = &self.feature_names {
            ensure_len("min-max scaler feature names", self.min.len(), names.len())?;
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.min.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> PriceResult<()> {
        MinMaxScaler::validate(self)
    }

    fn transform(&self, values: &[f64]) -> PriceResult<ScaledVector> {
        ensure_len("scaler transform", self.n_features(), values.len())?;
        Ok(ScaledVector(
            values
                .iter()
                .zip(self.scale.iter().zip(self.min.iter()))
                .map(|(x, (scale, min))| x * scale + min)
                .collect(),
        ))
    }
}
