//! Machine-learning regression (MLR) models
//!
//! Models implement [`MlrModel`] and are created by name through an explicit
//! [`ModelRegistry`] populated at start-up.
//!
//! # Organization
//!
//! - [`models`]: built-in model implementations
//! - [`registry`]: name to constructor mapping

pub mod models;
pub mod registry;

pub use models::{ConstantModel, LinearModel};
pub use registry::{ModelConstructor, ModelRegistry};

use crate::errors::{ClimDiagError, Result};
use crate::reporting::Reporter;
use crate::table::{remove_missing_labels, Table};
use ndarray::{Array1, Array2};

/// A regression model trained on feature/label tables
pub trait MlrModel: Send + Sync {
    /// Registered model type name
    fn name(&self) -> &'static str;

    /// Fit the model
    ///
    /// Rows with missing labels are dropped before fitting.
    ///
    /// # Errors
    ///
    /// Fails for inconsistent tables, missing feature values, or data the
    /// model cannot be fitted to.
    fn fit(
        &mut self,
        features: &Table,
        label: &Table,
        weights: Option<&Table>,
        reporter: &dyn Reporter,
    ) -> Result<()>;

    /// Predict labels for new feature rows
    ///
    /// # Errors
    ///
    /// Fails if the model is not fitted or features do not match training.
    fn predict(&self, features: &Table) -> Result<Table>;
}

/// Cleaned training data shared by all models
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub feature_names: Vec<String>,
    pub label_name: String,
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub weights: Array1<f64>,
}

fn model_error(model: &str, message: impl Into<String>) -> ClimDiagError {
    ClimDiagError::Model {
        model: model.to_string(),
        message: message.into(),
    }
}

/// Validate inputs, drop missing labels and unpack the tables
///
/// # Errors
///
/// Fails if the label or weights tables do not have exactly one column, row
/// counts differ, features contain missing values, weights are negative, or
/// no rows remain.
pub fn prepare_training_data(
    model: &str,
    features: &Table,
    label: &Table,
    weights: Option<&Table>,
    reporter: &dyn Reporter,
) -> Result<TrainingData> {
    if label.n_cols() != 1 {
        return Err(model_error(
            model,
            format!("label table must have one column, got {}", label.n_cols()),
        ));
    }
    if features.n_rows() != label.n_rows() {
        return Err(model_error(
            model,
            format!(
                "{} feature rows but {} label rows",
                features.n_rows(),
                label.n_rows()
            ),
        ));
    }
    if let Some(w) = weights {
        if w.n_cols() != 1 || w.n_rows() != label.n_rows() {
            return Err(model_error(
                model,
                format!(
                    "sample weights must be one column of {} rows, got {}x{}",
                    label.n_rows(),
                    w.n_rows(),
                    w.n_cols()
                ),
            ));
        }
    }

    let (features, label, weights) = remove_missing_labels(Some(features), label, weights, reporter);
    let features = features.ok_or_else(|| model_error(model, "feature table lost while filtering"))?;

    if label.n_rows() == 0 {
        return Err(model_error(model, "no training data left after removing missing labels"));
    }
    if features.has_missing() {
        return Err(model_error(model, "features contain missing values"));
    }

    let weights = match weights {
        Some(w) => w.values().column(0).to_owned(),
        None => Array1::ones(label.n_rows()),
    };
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(model_error(model, "sample weights must be finite and non-negative"));
    }
    if weights.sum() <= 0.0 {
        return Err(model_error(model, "sample weights sum to zero"));
    }

    Ok(TrainingData {
        feature_names: features.columns().to_vec(),
        label_name: label.columns()[0].clone(),
        x: features.values().clone(),
        y: label.values().column(0).to_owned(),
        weights,
    })
}
