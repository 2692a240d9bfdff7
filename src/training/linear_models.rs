//! L2-regularised logistic regression

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Binary logistic regression fit by full-batch gradient descent.
///
/// Minimises `mean(log_loss) + ||w||^2 / (2 * C * n)`, which has the same
/// minimiser as the usual `C`-weighted objective. The intercept is not
/// penalised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Whether to fit intercept
    pub fit_intercept: bool,
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Fixed step size. When unset, the step is derived from a bound on the
    /// loss curvature so that descent is stable on any scaling of `x`.
    pub learning_rate: Option<f64>,
    /// Iterations run by the last fit
    pub n_iter: usize,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            learning_rate: None,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = Some(lr);
        self
    }

    /// Set the gradient-norm tolerance that ends the descent
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sigmoid function
    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| {
            if v >= 0.0 {
                1.0 / (1.0 + (-v).exp())
            } else {
                let e = v.exp();
                e / (1.0 + e)
            }
        })
    }

    /// Fit the model using gradient descent. `y` holds 0.0 / 1.0 labels.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PredictorError::TrainingError("no training samples".to_string()));
        }
        if self.c.is_nan() || self.c <= 0.0 {
            return Err(PredictorError::InvalidParameter {
                name: "c".to_string(),
                value: self.c.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let n = n_samples as f64;
        let penalty = 1.0 / (self.c * n);
        let lr = self.learning_rate.unwrap_or_else(|| {
            // sigmoid' <= 1/4 and lambda_max(X^T X) <= ||X||_F^2, plus 1 for the intercept
            let curvature = 0.25 * (x.mapv(|v| v * v).sum() / n + 1.0) + penalty;
            1.0 / curvature
        });

        // Initialize weights
        let mut weights = Array1::<f64>::zeros(n_features);
        let mut bias = 0.0;
        let mut converged = false;
        self.n_iter = 0;

        // Gradient descent
        for _iter in 0..self.max_iter {
            self.n_iter += 1;

            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = &predictions - y;
            let dw = x.t().dot(&errors) / n + penalty * &weights;
            let db = if self.fit_intercept { errors.sum() / n } else { 0.0 };

            // Check convergence
            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                converged = true;
                break;
            }

            weights.scaled_add(-lr, &dw);
            bias -= lr * db;
        }

        if converged {
            debug!(n_iter = self.n_iter, "Logistic regression converged");
        } else {
            warn!(max_iter = self.max_iter, "Logistic regression did not converge");
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;

        Ok(self)
    }

    /// Probability of the positive class for every row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = match (&self.coefficients, self.is_fitted) {
            (Some(c), true) => c,
            _ => return Err(PredictorError::ModelNotFitted),
        };
        if x.ncols() != coefficients.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let intercept = self.intercept.unwrap_or(0.0);
        let linear = x.dot(coefficients) + intercept;
        Ok(Self::sigmoid(&linear))
    }

    /// Predict class labels: 1.0 iff the positive probability exceeds 0.5
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}
