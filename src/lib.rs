//! Library root for the `house_price` crate
//! Feature assembly, scaling, inference and price formatting for the
//! California housing regressor.

// Core error handling
pub mod errors;

// Feature declarations and vector assembly
pub mod feature_builder;
pub mod feature_set;
pub mod feature_spec;

// Fitted artifacts
pub mod artifact_loader;
pub mod predictor;
pub mod scaler;
pub mod tree_ensemble;

#[cfg(feature = "onnx")]
pub mod onnx_predictor;

// Pipeline & outputs
pub mod chart_data;
pub mod price_formatter;
pub mod price_pipeline;

// Configuration & CLI
pub mod cli;
pub mod config_loader;

#[cfg(test)]
mod tests {
    pub mod pipeline_tests;
    pub mod test_utils;
}

pub use errors::{PriceError, PriceResult};
pub use feature_builder::{BuilderOptions, FeatureInputs, FeatureVector, FeatureVectorBuilder};
pub use feature_set::{FeatureSet, FeatureSetVariant, RatioMode};
pub use predictor::{FeatureImportance, Predictor};
pub use price_formatter::format_price;
pub use price_pipeline::{PriceEstimate, PricePipeline};
pub use scaler::Scaler;
