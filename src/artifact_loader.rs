// artifact_loader.rs
// Purpose: Load fitted scaler and model artifacts from disk, optionally pinned by SHA-256

use crate::errors::{PriceError, PriceResult};
use crate::predictor::{LinearRegressor, Predictor};
use crate::scaler::{MinMaxScaler, Scaler, StandardScaler};
use crate::tree_ensemble::TreeEnsembleRegressor;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
#[cfg(feature = "onnx")]
use std::path::PathBuf;
use tracing::info;

/// Serialized scaler, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerArtifact {
    pub fn validate(&self) -> PriceResult<()> {
        match self {
            ScalerArtifact::Standard(s) => s.validate(),
            ScalerArtifact::MinMax(s) => s.validate(),
        }
    }

    pub fn into_scaler(self) -> Box<dyn Scaler> {
        match self {
            ScalerArtifact::Standard(s) => Box::new(s),
            ScalerArtifact::MinMax(s) => Box::new(s),
        }
    }
}

/// Serialized model, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsembleRegressor),
    /// Descriptor pointing at an ONNX graph, relative to the descriptor file
    #[cfg(feature = "onnx")]
    Onnx {
        path: PathBuf,
        n_features: usize,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

impl ModelArtifact {
    pub fn validate(&self) -> PriceResult<()> {
        match self {
            ModelArtifact::Linear(m) => m.validate(),
            ModelArtifact::TreeEnsemble(m) => m.validate(),
            #[cfg(feature = "onnx")]
            ModelArtifact::Onnx { n_features, .. } => {
                if *n_features == 0 {
                    return Err(PriceError::config("ONNX descriptor declares zero features"));
                }
                Ok(())
            }
        }
    }

    /// `base_dir` resolves relative paths inside descriptors
    #[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
    pub fn into_predictor(self, base_dir: &Path) -> PriceResult<Box<dyn Predictor>> {
        Ok(match self {
            ModelArtifact::Linear(m) => Box::new(m),
            ModelArtifact::TreeEnsemble(m) => Box::new(m),
            #[cfg(feature = "onnx")]
            ModelArtifact::Onnx {
                path,
                n_features,
                feature_names,
            } => Box::new(crate::onnx_predictor::OnnxRegressor::load(
                &base_dir.join(path),
                n_features,
                feature_names,
            )?),
        })
    }
}

/// Lower-case hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn read_artifact(artifact: &str, path: &Path, expected_sha256: Option<&str>) -> PriceResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| {
        PriceError::artifact_load(artifact, path.display().to_string(), e.to_string())
    })?;

    if let Some(expected) = expected_sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(PriceError::Checksum {
                path: path.display().to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    Ok(bytes)
}

fn parse_artifact<T: serde::de::DeserializeOwned>(
    artifact: &str,
    path: &Path,
    bytes: &[u8],
) -> PriceResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        PriceError::artifact_load(artifact, path.display().to_string(), e.to_string())
    })
}

/// Load and validate a scaler artifact
pub fn load_scaler(path: &Path, expected_sha256: Option<&str>) -> PriceResult<Box<dyn Scaler>> {
    let bytes = read_artifact("scaler", path, expected_sha256)?;
    let artifact: ScalerArtifact = parse_artifact("scaler", path, &bytes)?;
    artifact.validate().map_err(|e| {
        PriceError::artifact_load("scaler", path.display().to_string(), e.to_string())
    })?;
    let scaler = artifact.into_scaler();

    info!(
        message = "Loaded scaler artifact",
        path = %path.display(),
        n_features = scaler.n_features()
    );
    Ok(scaler)
}

/// Load and validate a model artifact
pub fn load_model(path: &Path, expected_sha256: Option<&str>) -> PriceResult<Box<dyn Predictor>> {
    let bytes = read_artifact("model", path, expected_sha256)?;
    let artifact: ModelArtifact = parse_artifact("model", path, &bytes)?;
    artifact.validate().map_err(|e| {
        PriceError::artifact_load("model", path.display().to_string(), e.to_string())
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let model = artifact.into_predictor(base_dir)?;

    info!(
        message = "Loaded model artifact",
        path = %path.display(),
        kind = model.kind(),
        n_features = model.n_features(),
        importances = model.importances().is_available()
    );
    Ok(model)
}

/// Write an artifact as pretty JSON. Used by tooling and tests.
pub fn write_artifact<T: Serialize>(path: &Path, artifact: &T) -> PriceResult<()> {
    let json = serde_json::to_string_pretty(artifact)
        .map_err(|e| PriceError::serialization("artifact", e))?;
    fs::write(path, json).map_err(|e| PriceError::io(format!("writing {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scaler_roundtrips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scaler.json");
        let artifact = ScalerArtifact::Standard(StandardScaler::new(vec![1.0], vec![2.0]).unwrap());
        write_artifact(&path, &artifact).unwrap();

        let scaler = load_scaler(&path, None).unwrap();
        assert_eq!(scaler.transform(&[5.0]).unwrap().values(), &[2.0]);
    }

    #[test]
    fn missing_file_is_artifact_load_error() {
        let err = load_model(Path::new("/nonexistent/model.json"), None)
            .err()
            .unwrap();
        assert!(matches!(err, PriceError::ArtifactLoad { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn corrupt_json_is_artifact_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{\"kind\": \"linear\", \"intercept\": ").unwrap();
        assert!(matches!(
            load_model(&path, None).err().unwrap(),
            PriceError::ArtifactLoad { .. }
        ));
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let artifact = ModelArtifact::Linear(LinearRegressor::new(0.5, vec![1.0]).unwrap());
        write_artifact(&path, &artifact).unwrap();

        let digest = sha256_hex(&fs::read(&path).unwrap());
        assert!(load_model(&path, Some(&digest.to_uppercase())).is_ok());
        assert!(matches!(
            load_model(&path, Some("deadbeef")).err().unwrap(),
            PriceError::Checksum { .. }
        ));
    }

    #[test]
    fn invalid_parameters_fail_at_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scaler.json");
        fs::write(&path, br#"{"kind": "standard", "mean": [0.0, 1.0], "scale": [1.0]}"#).unwrap();
        assert!(load_scaler(&path, None).is_err());
    }
}
