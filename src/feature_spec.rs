// feature_spec.rs
// Purpose: Declared bounds, defaults and numeric type for a single form field

use crate::errors::{PriceError, PriceResult};
use serde::{Deserialize, Serialize};

/// Numeric type a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Float,
}

/// How out-of-range values are treated by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Out-of-range input is a configuration error
    #[default]
    Reject,
    /// Out-of-range input is pulled back into `[min, max]`
    Clamp,
}

/// Outcome of checking one value against its spec
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsCheck {
    InRange(f64),
    Clamped { original: f64, clamped: f64 },
}

impl BoundsCheck {
    pub fn value(&self) -> f64 {
        match self {
            BoundsCheck::InRange(v) => *v,
            BoundsCheck::Clamped { clamped, .. } => *clamped,
        }
    }
}

/// A single named model input as declared by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub label: String,
    pub kind: NumericKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FeatureSpec {
    /// Declare a float field. Fails if the default lies outside the bounds.
    pub fn float(name: &str, label: &str, min: f64, max: f64, default: f64) -> PriceResult<Self> {
        Self::new(name, label, NumericKind::Float, min, max, default)
    }

    /// Declare an integer field. Bounds and default must be integral.
    pub fn integer(name: &str, label: &str, min: i64, max: i64, default: i64) -> PriceResult<Self> {
        Self::new(
            name,
            label,
            NumericKind::Integer,
            min as f64,
            max as f64,
            default as f64,
        )
    }

    pub fn new(
        name: &str,
        label: &str,
        kind: NumericKind,
        min: f64,
        max: f64,
        default: f64,
    ) -> PriceResult<Self> {
        let spec = Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            min,
            max,
            default,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the declaration itself: finite bounds, `min <= default <= max`,
    /// integral bounds for integer fields.
    pub fn validate(&self) -> PriceResult<()> {
        if self.name.trim().is_empty() {
            return Err(PriceError::config("feature name cannot be empty"));
        }
        if !(self.min.is_finite() && self.max.is_finite() && self.default.is_finite()) {
            return Err(PriceError::config(format!(
                "feature {} has non-finite bounds or default",
                self.name
            )));
        }
        if self.min > self.max {
            return Err(PriceError::config(format!(
                "feature {} has min {} greater than max {}",
                self.name, self.min, self.max
            )));
        }
        if self.default < self.min || self.default > self.max {
            return Err(PriceError::config(format!(
                "feature {} default {} outside [{}, {}]",
                self.name, self.default, self.min, self.max
            )));
        }
        if self.kind == NumericKind::Integer
            && [self.min, self.max, self.default].iter().any(|v| v.fract() != 0.0)
        {
            return Err(PriceError::config(format!(
                "integer feature {} declares a fractional bound or default",
                self.name
            )));
        }
        Ok(())
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Validate a user value under the given policy
    pub fn check(&self, value: f64, policy: BoundsPolicy) -> PriceResult<BoundsCheck> {
        if !value.is_finite() {
            return Err(PriceError::validation(&self.name, "value must be finite"));
        }
        if self.kind == NumericKind::Integer && value.fract() != 0.0 {
            return Err(PriceError::validation(
                &self.name,
                format!("expected an integer, got {value}"),
            ));
        }
        if self.contains(value) {
            return Ok(BoundsCheck::InRange(value));
        }
        match policy {
            BoundsPolicy::Reject => Err(PriceError::validation(
                &self.name,
                format!("{value} outside [{}, {}]", self.min, self.max),
            )),
            BoundsPolicy::Clamp => Ok(BoundsCheck::Clamped {
                original: value,
                clamped: value.clamp(self.min, self.max),
            }),
        }
    }
}
