// src/tests/test_utils.rs
// Shared fixtures for in-crate pipeline tests

use crate::feature_builder::{BuilderOptions, FeatureInputs};
use crate::feature_set::{FeatureSet, RatioMode};
use crate::predictor::LinearRegressor;
use crate::price_formatter::PriceFormatter;
use crate::price_pipeline::PricePipeline;
use crate::scaler::StandardScaler;
use crate::tree_ensemble::{Aggregation, RegressionTree, TreeEnsembleRegressor, LEAF};

pub const CA_MEAN: [f64; 8] = [
    3.8707, 28.6395, 5.4290, 1.0967, 1425.4767, 3.0707, 35.6319, -119.5697,
];
pub const CA_SCALE: [f64; 8] = [
    1.8998, 12.5853, 2.4741, 0.4739, 1132.4347, 10.3860, 2.1360, 2.0035,
];
pub const CA_COEF: [f64; 8] = [
    0.8296, 0.1188, -0.2655, 0.3057, -0.0045, -0.0393, -0.8998, -0.8705,
];
pub const CA_INTERCEPT: f64 = 2.0719;

pub fn inputs(pairs: &[(&str, f64)]) -> FeatureInputs {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn scenario_inputs() -> FeatureInputs {
    inputs(&[
        ("MedInc", 5.0),
        ("HouseAge", 20.0),
        ("AveRooms", 6.0),
        ("AveBedrms", 1.0),
        ("Population", 1200.0),
        ("AveOccup", 3.5),
        ("Latitude", 34.19),
        ("Longitude", -118.45),
    ])
}

/// Linear pipeline over the eleven-feature layout
pub fn extended_pipeline(ratio_mode: RatioMode) -> PricePipeline {
    let mut coef = CA_COEF.to_vec();
    coef.extend([0.3, -0.7, 0.1]);
    let mut mean = CA_MEAN.to_vec();
    mean.extend([1.95, 0.21, 3.07]);
    let mut scale = CA_SCALE.to_vec();
    scale.extend([1.0, 0.06, 10.4]);

    PricePipeline::new(
        FeatureSet::extended(),
        BuilderOptions {
            ratio_mode,
            ..BuilderOptions::default()
        },
        Box::new(StandardScaler::new(mean, scale).unwrap()),
        Box::new(LinearRegressor::new(CA_INTERCEPT, coef).unwrap()),
        PriceFormatter::default(),
    )
    .unwrap()
}

pub fn linear_pipeline() -> PricePipeline {
    PricePipeline::new(
        FeatureSet::raw(),
        BuilderOptions::default(),
        Box::new(StandardScaler::new(CA_MEAN.to_vec(), CA_SCALE.to_vec()).unwrap()),
        Box::new(LinearRegressor::new(CA_INTERCEPT, CA_COEF.to_vec()).unwrap()),
        PriceFormatter::default(),
    )
    .unwrap()
}

/// Two-tree forest over eight features splitting on scaled income and latitude
pub fn forest_pipeline() -> PricePipeline {
    let income = RegressionTree {
        children_left: vec![1, LEAF, LEAF],
        children_right: vec![2, LEAF, LEAF],
        feature: vec![0, -2, -2],
        threshold: vec![0.0, -2.0, -2.0],
        value: vec![2.0, 1.5, 3.5],
    };
    let latitude = RegressionTree {
        children_left: vec![1, LEAF, LEAF],
        children_right: vec![2, LEAF, LEAF],
        feature: vec![6, -2, -2],
        threshold: vec![0.0, -2.0, -2.0],
        value: vec![2.0, 2.5, 1.0],
    };
    let model = TreeEnsembleRegressor::new(
        8,
        vec![income, latitude],
        Aggregation::Mean,
        Some(vec![0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0]),
    )
    .unwrap();
    PricePipeline::new(
        FeatureSet::raw(),
        BuilderOptions::default(),
        Box::new(StandardScaler::new(CA_MEAN.to_vec(), CA_SCALE.to_vec()).unwrap()),
        Box::new(model),
        PriceFormatter::default(),
    )
    .unwrap()
}
