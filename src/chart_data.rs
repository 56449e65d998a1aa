//! Chart-ready data handed to the presentation layer: importance bars, a
//! correlation heatmap over the feature columns of a reference dataset, and
//! the map point for the entered location. No rendering happens here.

use crate::errors::{PriceError, PriceResult};
use crate::feature_builder::FeatureVector;
use crate::feature_set::{FeatureSet, LATITUDE, LONGITUDE};
use crate::predictor::FeatureImportance;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceEntry {
    pub feature: String,
    pub score: f64,
}

/// Importance bars sorted by descending score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportanceSeries {
    Available { entries: Vec<ImportanceEntry> },
    Unavailable,
}

impl ImportanceSeries {
    /// Pair scores with feature names. A length mismatch between names and
    /// scores is reported as unavailable rather than mislabelled.
    pub fn from_importance(names: &[&str], importance: &FeatureImportance) -> Self {
        let scores = match importance.scores() {
            Some(scores) if scores.len() == names.len() => scores,
            _ => return ImportanceSeries::Unavailable,
        };
        let mut entries: Vec<ImportanceEntry> = names
            .iter()
            .zip(scores.iter())
            .map(|(name, score)| ImportanceEntry {
                feature: name.to_string(),
                score: *score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        ImportanceSeries::Available { entries }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ImportanceSeries::Available { .. })
    }
}

/// Pearson correlation between feature columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// `rows` are observations laid out in `features` order. A constant
    /// column correlates as NaN with everything except itself.
    pub fn pearson(features: Vec<String>, rows: &[Vec<f64>]) -> PriceResult<Self> {
        let n = features.len();
        if rows.len() < 2 {
            return Err(PriceError::validation(
                "dataset",
                "at least two rows are needed for correlation",
            ));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != n) {
            return Err(PriceError::dataset(format!(
                "row {bad} has {} values, expected {n}",
                rows[bad].len()
            )));
        }

        let count = rows.len() as f64;
        let means: Vec<f64> = (0..n)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / count)
            .collect();
        let deviation = |j: usize| -> f64 {
            rows.iter()
                .map(|r| (r[j] - means[j]).powi(2))
                .sum::<f64>()
                .sqrt()
        };
        let spreads: Vec<f64> = (0..n).map(deviation).collect();

        let mut values = vec![vec![0.0; n]; n];
        for a in 0..n {
            for b in a..n {
                let r = if a == b {
                    1.0
                } else if spreads[a] == 0.0 || spreads[b] == 0.0 {
                    f64::NAN
                } else {
                    let covariance: f64 = rows
                        .iter()
                        .map(|row| (row[a] - means[a]) * (row[b] - means[b]))
                        .sum();
                    (covariance / (spreads[a] * spreads[b])).clamp(-1.0, 1.0)
                };
                values[a][b] = r;
                values[b][a] = r;
            }
        }

        Ok(Self { features, values })
    }

    /// Load a CSV with a header row and correlate the feature set's columns,
    /// in feature-set order. Extra columns are ignored; `NaN` and infinite
    /// cells are rejected like any other non-numeric value.
    pub fn from_csv(path: &Path, feature_set: &FeatureSet) -> PriceResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut columns = Vec::with_capacity(feature_set.len());
        for name in feature_set.names() {
            let index = headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
                PriceError::dataset(format!(
                    "column '{name}' not found in {}",
                    path.display()
                ))
            })?;
            columns.push(index);
        }

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = Vec::with_capacity(columns.len());
            for (&index, name) in columns.iter().zip(feature_set.names()) {
                let raw = record.get(index).unwrap_or("").trim();
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        PriceError::dataset(format!(
                            "row {}: column '{name}' has non-numeric or non-finite value '{raw}'",
                            line + 1
                        ))
                    })?;
                row.push(value);
            }
            rows.push(row);
        }

        let features = feature_set.names().iter().map(|s| s.to_string()).collect();
        Self::pearson(features, &rows)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.features.iter().position(|f| f == a)?;
        let j = self.features.iter().position(|f| f == b)?;
        Some(self.values[i][j])
    }
}

/// Single point for the map view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationPoint {
    pub fn from_vector(feature_set: &FeatureSet, vector: &FeatureVector) -> PriceResult<Self> {
        let read = |name: &str| {
            feature_set
                .position(name)
                .and_then(|i| vector.values().get(i).copied())
                .ok_or_else(|| PriceError::validation(name, "missing from feature vector"))
        };
        Ok(Self {
            latitude: read(LATITUDE)?,
            longitude: read(LONGITUDE)?,
        })
    }
}
