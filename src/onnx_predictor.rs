// onnx_predictor.rs
// Purpose: Regressors exported to ONNX, evaluated with tract

use crate::errors::{PriceError, PriceResult};
use crate::predictor::{ensure_input_len, Predictor};
use crate::scaler::ScaledVector;
use std::path::Path;
use tract_onnx::prelude::*;

/// ONNX graph taking a `[1, n_features]` f32 input and returning one value
pub struct OnnxRegressor {
    plan: TypedRunnableModel<TypedModel>,
    n_features: usize,
    feature_names: Option<Vec<String>>,
}

impl OnnxRegressor {
    pub fn load(
        path: &Path,
        n_features: usize,
        feature_names: Option<Vec<String>>,
    ) -> PriceResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                PriceError::artifact_load("model", path.display().to_string(), e.to_string())
            })?;
        Ok(Self {
            plan,
            n_features,
            feature_names,
        })
    }
}

impl Predictor for OnnxRegressor {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, input: &ScaledVector) -> PriceResult<f64> {
        ensure_input_len(self.n_features, input)?;
        let data: Vec<f32> = input.values().iter().map(|v| *v as f32).collect();
        let tensor: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map_err(|e| PriceError::inference(e.to_string()))?
            .into();
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| PriceError::inference(e.to_string()))?;
        let first = outputs
            .first()
            .ok_or_else(|| PriceError::inference("ONNX model produced no outputs"))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| PriceError::inference(e.to_string()))?;
        view.iter()
            .next()
            .map(|v| *v as f64)
            .ok_or_else(|| PriceError::inference("ONNX model output is empty"))
    }
}
