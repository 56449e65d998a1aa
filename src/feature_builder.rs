// feature_builder.rs
// Purpose: Turn named form inputs into the ordered vector the fitted artifacts expect

use crate::errors::{PriceError, PriceResult};
use crate::feature_set::{FeatureSet, FeatureSetVariant, RatioMode};
use crate::feature_spec::{BoundsCheck, BoundsPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Named inputs as entered on the form
pub type FeatureInputs = HashMap<String, f64>;

/// Builder behaviour knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuilderOptions {
    pub bounds_policy: BoundsPolicy,
    pub ratio_mode: RatioMode,
}

/// Ordered raw feature values bound to the feature set they were built for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    variant: FeatureSetVariant,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn variant(&self) -> FeatureSetVariant {
        self.variant
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Assembles [`FeatureVector`]s for one feature set
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    feature_set: FeatureSet,
    options: BuilderOptions,
}

impl FeatureVectorBuilder {
    pub fn new(feature_set: FeatureSet, options: BuilderOptions) -> Self {
        Self {
            feature_set,
            options,
        }
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.feature_set
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    /// Vector of every field's declared default (the initial form state)
    pub fn build_defaults(&self) -> PriceResult<FeatureVector> {
        self.build(&FeatureInputs::new())
    }

    /// Build the ordered vector. Missing fields take their defaults; unknown
    /// names, non-finite values and (under `Reject`) out-of-range values fail.
    pub fn build(&self, inputs: &FeatureInputs) -> PriceResult<FeatureVector> {
        if let Some(unknown) = inputs
            .keys()
            .find(|name| self.feature_set.position(name).is_none())
        {
            return Err(PriceError::validation(
                unknown.as_str(),
                format!("unknown feature for the {} feature set", self.feature_set.variant()),
            ));
        }

        let derive = self.options.ratio_mode == RatioMode::DeriveFromRaw;
        let mut values = Vec::with_capacity(self.feature_set.len());

        for spec in self.feature_set.specs() {
            if derive && self.feature_set.is_ratio(&spec.name) {
                if inputs.contains_key(&spec.name) {
                    warn!(
                        message = "Ignoring supplied ratio, deriving from raw fields",
                        feature = %spec.name
                    );
                }
                values.push(f64::NAN);
                continue;
            }

            let value = match inputs.get(&spec.name) {
                Some(v) => match spec.check(*v, self.options.bounds_policy)? {
                    BoundsCheck::InRange(v) => v,
                    BoundsCheck::Clamped { original, clamped } => {
                        warn!(
                            message = "Clamped out-of-range input",
                            feature = %spec.name,
                            original = original,
                            clamped = clamped
                        );
                        clamped
                    }
                },
                None => spec.default,
            };
            values.push(value);
        }

        if derive {
            let raw = values[..self.feature_set.raw_len()].to_vec();
            for (position, ratio) in self.feature_set.ratios() {
                values[position] = ratio.derive(&raw);
            }
        }

        debug!(
            message = "Built feature vector",
            variant = %self.feature_set.variant(),
            len = values.len()
        );

        Ok(FeatureVector {
            variant: self.feature_set.variant(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_set::{AVE_OCCUP, AVE_ROOMS, MED_INC, ROOMS_PER_PERSON};

    fn inputs(pairs: &[(&str, f64)]) -> FeatureInputs {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn missing_fields_take_defaults() {
        let builder = FeatureVectorBuilder::new(FeatureSet::raw(), BuilderOptions::default());
        let vector = builder.build(&inputs(&[(MED_INC, 8.0)])).unwrap();
        assert_eq!(vector.values()[0], 8.0);
        assert_eq!(vector.values()[1], 20.0);
        assert_eq!(vector.len(), 8);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let builder = FeatureVectorBuilder::new(FeatureSet::raw(), BuilderOptions::default());
        let err = builder.build(&inputs(&[(ROOMS_PER_PERSON, 2.0)])).unwrap_err();
        assert!(matches!(err, PriceError::Validation { ref field, .. } if field == ROOMS_PER_PERSON));
    }

    #[test]
    fn out_of_range_rejected_by_default() {
        let builder = FeatureVectorBuilder::new(FeatureSet::raw(), BuilderOptions::default());
        assert!(builder.build(&inputs(&[(MED_INC, 21.0)])).is_err());
    }

    #[test]
    fn derive_mode_overrides_supplied_ratios() {
        let options = BuilderOptions {
            ratio_mode: RatioMode::DeriveFromRaw,
            ..BuilderOptions::default()
        };
        let builder = FeatureVectorBuilder::new(FeatureSet::extended(), options);
        let vector = builder
            .build(&inputs(&[(AVE_ROOMS, 8.0), (AVE_OCCUP, 2.0), (ROOMS_PER_PERSON, 29.0)]))
            .unwrap();
        assert_eq!(vector.values()[8], 4.0);
        assert_eq!(vector.values()[10], 2.0);
    }

    #[test]
    fn accept_mode_keeps_independent_ratios() {
        let builder = FeatureVectorBuilder::new(FeatureSet::extended(), BuilderOptions::default());
        let vector = builder
            .build(&inputs(&[(AVE_ROOMS, 8.0), (ROOMS_PER_PERSON, 29.0)]))
            .unwrap();
        assert_eq!(vector.values()[8], 29.0);
    }
}
