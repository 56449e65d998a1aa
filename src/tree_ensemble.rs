// tree_ensemble.rs
// Purpose: Forest and boosted regression trees stored in flat node-array form

use crate::errors::{PriceError, PriceResult};
use crate::predictor::{ensure_input_len, FeatureImportance, Predictor};
use crate::scaler::ScaledVector;
use serde::{Deserialize, Serialize};

/// Marks a leaf in `children_left` / `children_right`
pub const LEAF: i64 = -1;

/// One regression tree. Node `i` is a leaf when `children_left[i] == -1`;
/// otherwise go left when `x[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// A single-leaf tree
    pub fn constant(value: f64) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    pub fn node_count(&self) -> usize {
        self.value.len()
    }

    /// Structural checks. Children must point strictly forward, which rules
    /// out cycles and guarantees evaluation terminates.
    pub fn validate(&self, n_features: usize) -> PriceResult<()> {
        let n = self.value.len();
        if n == 0 {
            return Err(PriceError::config("regression tree has no nodes"));
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(PriceError::config("regression tree node arrays differ in length"));
        }
        for i in 0..n {
            if !self.value[i].is_finite() {
                return Err(PriceError::config(format!("tree node {i} has a non-finite value")));
            }
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF && right == LEAF {
                continue;
            }
            let forward = |child: i64| child > i as i64 && (child as usize) < n;
            if !forward(left) || !forward(right) {
                return Err(PriceError::config(format!(
                    "tree node {i} has invalid children ({left}, {right})"
                )));
            }
            let feature = self.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(PriceError::config(format!(
                    "tree node {i} splits on feature {feature}, model has {n_features}"
                )));
            }
            if self.threshold[i].is_nan() {
                return Err(PriceError::config(format!("tree node {i} has a NaN threshold")));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Malformed node arrays give an
    /// `Inference` error; the walk is bounded by the node count.
    pub fn evaluate(&self, x: &[f64]) -> PriceResult<f64> {
        let malformed =
            |node: usize| PriceError::inference(format!("tree node {node} is malformed"));
        let mut node = 0usize;
        for _ in 0..self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| malformed(node))?;
            if left == LEAF {
                return self.value.get(node).copied().ok_or_else(|| malformed(node));
            }
            let feature = self.feature.get(node).copied().ok_or_else(|| malformed(node))?;
            let value = usize::try_from(feature)
                .ok()
                .and_then(|f| x.get(f))
                .ok_or_else(|| malformed(node))?;
            let threshold = self.threshold.get(node).ok_or_else(|| malformed(node))?;
            let next = if value <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| malformed(node))?
            };
            node = usize::try_from(next).map_err(|_| malformed(node))?;
        }
        Err(PriceError::inference(
            "tree walk did not reach a leaf within the node count",
        ))
    }
}

/// How per-tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Aggregation {
    /// Random-forest averaging
    Mean,
    /// Gradient boosting: `base_score + learning_rate * sum(trees)`
    Boosted { base_score: f64, learning_rate: f64 },
}

/// Ensemble of regression trees with optional importance scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleRegressor {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
    pub aggregation: Aggregation,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl TreeEnsembleRegressor {
    pub fn new(
        n_features: usize,
        trees: Vec<RegressionTree>,
        aggregation: Aggregation,
        feature_importances: Option<Vec<f64>>,
    ) -> PriceResult<Self> {
        let model = Self {
            n_features,
            trees,
            aggregation,
            feature_importances,
            feature_names: None,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> PriceResult<()> {
        if self.n_features == 0 {
            return Err(PriceError::config("tree ensemble declares zero features"));
        }
        if self.trees.is_empty() {
            return Err(PriceError::config("tree ensemble has no trees"));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        if let Aggregation::Boosted {
            base_score,
            learning_rate,
        } = self.aggregation
        {
            if !base_score.is_finite() || !learning_rate.is_finite() {
                return Err(PriceError::config("boosting parameters must be finite"));
            }
        }
        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.n_features {
                return Err(PriceError::feature_count(
                    "feature importances",
                    self.n_features,
                    importances.len(),
                ));
            }
            if importances.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(PriceError::config(
                    "feature importances must be finite and non-negative",
                ));
            }
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(PriceError::feature_count(
                    "tree ensemble feature names",
                    self.n_features,
                    names.len(),
                ));
            }
        }
        Ok(())
    }
}

impl Predictor for TreeEnsembleRegressor {
    fn kind(&self) -> &'static str {
        match self.aggregation {
            Aggregation::Mean => "random_forest",
            Aggregation::Boosted { .. } => "gradient_boosting",
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> PriceResult<()> {
        TreeEnsembleRegressor::validate(self)
    }

    fn predict(&self, input: &ScaledVector) -> PriceResult<f64> {
        ensure_input_len(self.n_features, input)?;
        let x = input.values();
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(x)?;
        }
        Ok(match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Boosted {
                base_score,
                learning_rate,
            } => base_score + learning_rate * total,
        })
    }

    fn importances(&self) -> FeatureImportance {
        match &self.feature_importances {
            Some(scores) => FeatureImportance::Available(scores.clone()),
            None => FeatureImportance::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on feature 0 at 0.0: left leaf 1.0, right leaf 3.0
    fn stump() -> RegressionTree {
        RegressionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![0, -2, -2],
            threshold: vec![0.0, -2.0, -2.0],
            value: vec![2.0, 1.0, 3.0],
        }
    }

    fn forest(aggregation: Aggregation) -> TreeEnsembleRegressor {
        TreeEnsembleRegressor {
            n_features: 2,
            trees: vec![stump(), RegressionTree::constant(5.0)],
            aggregation,
            feature_importances: Some(vec![0.75, 0.25]),
            feature_names: None,
        }
    }

    #[test]
    fn stump_routes_on_threshold() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[0.0, 9.0]).unwrap(), 1.0);
        assert_eq!(tree.evaluate(&[0.1, 9.0]).unwrap(), 3.0);
    }

    #[test]
    fn mean_aggregation_averages_trees() {
        let model = forest(Aggregation::Mean);
        model.validate().unwrap();
        let y = model.predict(&ScaledVector::new(vec![-1.0, 0.0])).unwrap();
        assert_eq!(y, 3.0);
        assert_eq!(model.kind(), "random_forest");
    }

    #[test]
    fn boosted_aggregation_scales_sum() {
        let model = forest(Aggregation::Boosted {
            base_score: 0.5,
            learning_rate: 0.1,
        });
        let y = model.predict(&ScaledVector::new(vec![1.0, 0.0])).unwrap();
        assert!((y - 1.3).abs() < 1e-12);
    }

    #[test]
    fn importances_exposed_when_present() {
        let mut model = forest(Aggregation::Mean);
        assert_eq!(model.importances(), FeatureImportance::Available(vec![0.75, 0.25]));
        model.feature_importances = None;
        assert!(!model.importances().is_available());
    }

    #[test]
    fn backward_child_is_rejected() {
        let mut tree = stump();
        tree.children_right[0] = 0;
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn split_feature_out_of_range_is_rejected() {
        let mut tree = stump();
        tree.feature[0] = 5;
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn constructor_rejects_malformed_trees() {
        let mut tree = stump();
        tree.feature[0] = -2;
        let err = TreeEnsembleRegressor::new(2, vec![tree], Aggregation::Mean, None).unwrap_err();
        assert!(matches!(err, PriceError::Config { .. }));
        assert!(TreeEnsembleRegressor::new(2, vec![stump()], Aggregation::Mean, None).is_ok());
    }

    #[test]
    fn split_on_negative_feature_is_an_error_not_a_panic() {
        let tree = RegressionTree {
            children_left: vec![1, LEAF],
            children_right: vec![1, LEAF],
            feature: vec![-2, -2],
            threshold: vec![0.0, -2.0],
            value: vec![0.0, 1.0],
        };
        assert!(matches!(
            tree.evaluate(&[0.0, 0.0]),
            Err(PriceError::Inference { .. })
        ));
    }

    #[test]
    fn self_referencing_node_terminates() {
        let mut tree = stump();
        tree.children_left[0] = 0;
        assert!(matches!(
            tree.evaluate(&[-1.0, 0.0]),
            Err(PriceError::Inference { .. })
        ));
    }

    #[test]
    fn truncated_node_arrays_are_an_error() {
        let mut tree = stump();
        tree.value.truncate(2);
        assert!(tree.evaluate(&[1.0, 0.0]).is_err());
    }
}
