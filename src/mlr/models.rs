//! Built-in MLR models

use super::{model_error, prepare_training_data, MlrModel, TrainingData};
use crate::config::MlrSettings;
use crate::errors::Result;
use crate::reporting::Reporter;
use crate::table::Table;
use ndarray::{Array1, Array2, Axis};

/// Predicts the weighted mean of the training labels
#[derive(Debug, Clone, Default)]
pub struct ConstantModel {
    fitted: Option<(String, f64)>,
}

impl ConstantModel {
    pub const NAME: &'static str = "constant";

    #[must_use]
    pub fn new(_settings: &MlrSettings) -> Self {
        Self::default()
    }

    /// Fitted label mean, if any
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.fitted.as_ref().map(|(_, mean)| *mean)
    }
}

impl MlrModel for ConstantModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fit(
        &mut self,
        features: &Table,
        label: &Table,
        weights: Option<&Table>,
        reporter: &dyn Reporter,
    ) -> Result<()> {
        let data = prepare_training_data(Self::NAME, features, label, weights, reporter)?;
        let mean = (&data.y * &data.weights).sum() / data.weights.sum();
        self.fitted = Some((data.label_name, mean));
        Ok(())
    }

    fn predict(&self, features: &Table) -> Result<Table> {
        let (label_name, mean) = self
            .fitted
            .as_ref()
            .ok_or_else(|| model_error(Self::NAME, "model is not fitted"))?;
        Ok(Table::single(label_name.clone(), vec![*mean; features.n_rows()]))
    }
}

#[derive(Debug, Clone)]
struct LinearFit {
    feature_names: Vec<String>,
    label_name: String,
    intercept: f64,
    coefficients: Array1<f64>,
}

/// Weighted ordinary least squares regression
#[derive(Debug, Clone)]
pub struct LinearModel {
    fit_intercept: bool,
    fitted: Option<LinearFit>,
}

impl LinearModel {
    pub const NAME: &'static str = "linear";

    #[must_use]
    pub const fn new(settings: &MlrSettings) -> Self {
        Self {
            fit_intercept: settings.fit_intercept,
            fitted: None,
        }
    }

    #[must_use]
    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    /// Coefficients in training feature order
    #[must_use]
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.coefficients)
    }

    fn design_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        if !self.fit_intercept {
            return x.clone();
        }
        let mut design = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
        design.slice_mut(ndarray::s![.., 1..]).assign(x);
        design
    }

    fn solve_normal_equations(&self, data: &TrainingData) -> Result<Array1<f64>> {
        let design = self.design_matrix(&data.x);
        if design.ncols() == 0 {
            return Err(model_error(
                Self::NAME,
                "no features and no intercept, nothing to fit",
            ));
        }
        let weighted = &design * &data.weights.view().insert_axis(Axis(1));
        let normal = weighted.t().dot(&design);
        let rhs = weighted.t().dot(&data.y);
        solve(normal, rhs).ok_or_else(|| {
            model_error(
                Self::NAME,
                "normal equations are singular, features are collinear or constant",
            )
        })
    }
}

impl MlrModel for LinearModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fit(
        &mut self,
        features: &Table,
        label: &Table,
        weights: Option<&Table>,
        reporter: &dyn Reporter,
    ) -> Result<()> {
        let data = prepare_training_data(Self::NAME, features, label, weights, reporter)?;
        let solution = self.solve_normal_equations(&data)?;

        let (intercept, coefficients) = if self.fit_intercept {
            (solution[0], solution.slice(ndarray::s![1..]).to_owned())
        } else {
            (0.0, solution)
        };
        self.fitted = Some(LinearFit {
            feature_names: data.feature_names,
            label_name: data.label_name,
            intercept,
            coefficients,
        });
        Ok(())
    }

    fn predict(&self, features: &Table) -> Result<Table> {
        let fit = self
            .fitted
            .as_ref()
            .ok_or_else(|| model_error(Self::NAME, "model is not fitted"))?;

        let mut predictions = Array1::from_elem(features.n_rows(), fit.intercept);
        for (name, coef) in fit.feature_names.iter().zip(fit.coefficients.iter()) {
            predictions.scaled_add(*coef, &features.column(name)?);
        }
        Ok(Table::single(fit.label_name.clone(), predictions.to_vec()))
    }
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                let upper = a[[col, k]];
                a[[row, k]] -= factor * upper;
            }
            let upper = b[col];
            b[row] -= factor * upper;
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}
