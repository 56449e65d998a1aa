// predictor.rs
// Purpose: Fitted regressors mapping a scaled vector to a price in units of $100,000

use crate::errors::{PriceError, PriceResult};
use crate::scaler::ScaledVector;
use serde::{Deserialize, Serialize};

/// Per-feature importance scores, when the model family provides them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "scores", rename_all = "snake_case")]
pub enum FeatureImportance {
    /// Scores aligned to the fitted input order
    Available(Vec<f64>),
    /// The model has no notion of importance (linear, ONNX)
    Unavailable,
}

impl FeatureImportance {
    pub fn is_available(&self) -> bool {
        matches!(self, FeatureImportance::Available(_))
    }

    pub fn scores(&self) -> Option<&[f64]> {
        match self {
            FeatureImportance::Available(scores) => Some(scores),
            FeatureImportance::Unavailable => None,
        }
    }
}

/// A fitted regression model
pub trait Predictor: Send + Sync {
    /// Short model family name for logs and status output
    fn kind(&self) -> &'static str;

    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Structural checks on the fitted parameters, run when a pipeline is built
    fn validate(&self) -> PriceResult<()> {
        Ok(())
    }

    fn predict(&self, input: &ScaledVector) -> PriceResult<f64>;

    /// Importance capability. Absence is an expected state.
    fn importances(&self) -> FeatureImportance {
        FeatureImportance::Unavailable
    }
}

pub(crate) fn ensure_input_len(expected: usize, input: &ScaledVector) -> PriceResult<()> {
    if input.len() != expected {
        return Err(PriceError::feature_count("predictor input", expected, input.len()));
    }
    Ok(())
}

/// Ordinary least-squares style model: `intercept + sum(coef_i * x_i)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> PriceResult<Self> {
        let model = Self {
            intercept,
            coefficients,
            feature_names: None,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> PriceResult<()> {
        if self.coefficients.is_empty() {
            return Err(PriceError::config("linear model has no coefficients"));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PriceError::config("linear model parameters must be finite"));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(PriceError::feature_count(
                    "linear model feature names",
                    self.coefficients.len(),
                    names.len(),
                ));
            }
        }
        Ok(())
    }
}

impl Predictor for LinearRegressor {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> PriceResult<()> {
        LinearRegressor::validate(self)
    }

    fn predict(&self, input: &ScaledVector) -> PriceResult<f64> {
        ensure_input_len(self.n_features(), input)?;
        Ok(self.intercept
            + input
                .values()
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_prediction_is_weighted_sum() {
        let model = LinearRegressor::new(1.0, vec![2.0, -1.0]).unwrap();
        let y = model.predict(&ScaledVector::new(vec![0.5, 3.0])).unwrap();
        assert_eq!(y, -1.0);
    }

    #[test]
    fn linear_model_has_no_importances() {
        let model = LinearRegressor::new(0.0, vec![1.0]).unwrap();
        assert_eq!(model.importances(), FeatureImportance::Unavailable);
        assert!(model.importances().scores().is_none());
    }

    #[test]
    fn wrong_input_length_fails() {
        let model = LinearRegressor::new(0.0, vec![1.0; 8]).unwrap();
        assert!(model.predict(&ScaledVector::new(vec![0.0; 7])).is_err());
    }

    #[test]
    fn non_finite_coefficients_rejected() {
        assert!(LinearRegressor::new(f64::INFINITY, vec![1.0]).is_err());
        assert!(LinearRegressor::new(0.0, vec![]).is_err());
    }
}
