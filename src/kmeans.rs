use crate::algorithm::{kmeans_best_of, predict_labels};
use crate::config::KMeansConfig;
use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayView2};

/// k-means clustering over dense ndarray data.
///
/// Each `fit` runs `n_init` seeded restarts (k-means++ by default) and keeps
/// the one with the lowest inertia. The API mirrors scikit-learn's
/// `fit()`, `predict()` and `fit_predict()`.
///
/// # Example
///
/// ```
/// use msgcluster_rs::{KMeans, KMeansConfig};
/// use ndarray::array;
///
/// let data = array![[0.0f32, 0.0], [0.1, 0.0], [9.0, 9.0], [9.1, 9.0]];
///
/// let mut kmeans = KMeans::with_config(KMeansConfig::new(2).with_seed(7));
/// let labels = kmeans.fit_predict(&data.view()).unwrap();
///
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
/// ```
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Number of features (dimensions), 0 until the first fit
    d: usize,

    /// Result of the best restart (None if not yet fitted)
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    centroids: Array2<f32>,
    labels: Array1<usize>,
    inertia: f64,
    n_iter: usize,
}

impl KMeans {
    /// Create a new KMeans instance with default configuration and `k` clusters.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0.
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    /// Create a new KMeans instance with custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0.
    pub fn with_config(config: KMeansConfig) -> Self {
        assert!(config.k > 0, "k must be greater than 0");

        Self {
            config,
            d: 0,
            fitted: None,
        }
    }

    /// Fit the model to the data.
    ///
    /// Refitting is allowed but the number of features must not change.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Number of samples is less than k
    /// - Data dimensions don't match a previous fit
    /// - `n_init` or `max_iters` is 0
    pub fn fit(&mut self, data: &ArrayView2<f32>) -> Result<&mut Self, ClusterError> {
        let n_features = data.ncols();

        if self.fitted.is_some() && n_features != self.d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let result = kmeans_best_of(data, &self.config)?;

        self.d = n_features;
        self.fitted = Some(Fitted {
            centroids: result.centroids,
            labels: result.labels,
            inertia: result.inertia,
            n_iter: result.n_iterations,
        });
        Ok(self)
    }

    /// Predict cluster assignments for new data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f32>) -> Result<Array1<usize>, ClusterError> {
        let fitted = self.fitted.as_ref().ok_or(ClusterError::NotFitted)?;

        let n_features = data.ncols();
        if n_features != self.d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        Ok(predict_labels(data, &fitted.centroids.view()))
    }

    /// Fit the model and return the labels of the training data.
    pub fn fit_predict(&mut self, data: &ArrayView2<f32>) -> Result<Array1<usize>, ClusterError> {
        self.fit(data)?;
        self.labels().cloned().ok_or(ClusterError::NotFitted)
    }

    /// Centroids of the fitted model, shape (k, d)
    pub fn centroids(&self) -> Option<&Array2<f32>> {
        self.fitted.as_ref().map(|f| &f.centroids)
    }

    /// Labels of the training data from the last fit
    pub fn labels(&self) -> Option<&Array1<usize>> {
        self.fitted.as_ref().map(|f| &f.labels)
    }

    /// Sum of squared distances of the training data to their centroids
    pub fn inertia(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.inertia)
    }

    /// Lloyd iterations run by the selected restart
    pub fn n_iter(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_iter)
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}
