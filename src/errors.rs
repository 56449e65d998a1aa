//! Error handling for the house price pipeline
//!
//! Every fallible operation in the crate returns [`PriceResult`]. The variants
//! follow the three failure classes of the pipeline: artifact loading,
//! feature-count/order mismatches against the fitted artifacts, and input
//! validation. Absence of feature importances is not an error and has no
//! variant here.

use thiserror::Error;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to load {artifact} artifact from {path}: {message}")]
    ArtifactLoad {
        artifact: String,
        path: String,
        message: String,
    },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Feature count mismatch in {stage}: expected {expected}, got {actual}")]
    FeatureCount {
        stage: String,
        expected: usize,
        actual: usize,
    },

    #[error("Feature order mismatch in {stage} at position {position}: expected {expected}, got {actual}")]
    FeatureOrder {
        stage: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("Feature vector was built for the {actual} feature set, pipeline expects {expected}")]
    VariantMismatch { expected: String, actual: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },
}

/// Result alias used across the crate
pub type PriceResult<T> = Result<T, PriceError>;

impl PriceError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an artifact load error
    pub fn artifact_load(
        artifact: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ArtifactLoad {
            artifact: artifact.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a feature count mismatch error
    pub fn feature_count(stage: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::FeatureCount {
            stage: stage.into(),
            expected,
            actual,
        }
    }

    /// Create a feature order mismatch error
    pub fn feature_order(
        stage: impl Into<String>,
        position: usize,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::FeatureOrder {
            stage: stage.into(),
            position,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// True for failures that should abort startup rather than a single request
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PriceError::Config { .. }
                | PriceError::ArtifactLoad { .. }
                | PriceError::Checksum { .. }
                | PriceError::Serialization { .. }
                | PriceError::Io { .. }
                | PriceError::FeatureCount { .. }
                | PriceError::FeatureOrder { .. }
        )
    }
}

impl From<serde_json::Error> for PriceError {
    fn from(err: serde_json::Error) -> Self {
        PriceError::serialization("json_operation", err)
    }
}

impl From<std::io::Error> for PriceError {
    fn from(err: std::io::Error) -> Self {
        PriceError::io("io_operation", err)
    }
}

impl From<csv::Error> for PriceError {
    fn from(err: csv::Error) -> Self {
        PriceError::dataset(err.to_string())
    }
}

impl From<figment::Error> for PriceError {
    fn from(err: figment::Error) -> Self {
        PriceError::config(err.to_string())
    }
}
