/// Token pattern used when none is configured: runs of two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Strategy for choosing the starting centroids of each k-means restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CentroidInit {
    /// Greedy k-means++: spread centroids apart by sampling proportionally
    /// to squared distance, keeping the best of several candidates per step
    #[default]
    KMeansPlusPlus,

    /// Pick k distinct data points uniformly at random
    Random,
}

/// Configuration for the k-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Number of independent restarts. The run with the lowest inertia is kept.
    pub n_init: usize,

    /// Maximum number of Lloyd iterations per restart
    pub max_iters: usize,

    /// Convergence tolerance, relative to the mean per-feature variance of the data.
    /// A restart stops once the summed squared centroid shift falls to or below it.
    pub tol: f64,

    /// Centroid seeding strategy
    pub init: CentroidInit,

    /// Random seed. `None` draws a fresh seed from the OS for every fit.
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 2,
            n_init: 10,
            max_iters: 200,
            tol: 1e-4,
            init: CentroidInit::KMeansPlusPlus,
            seed: None,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the number of restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the seeding strategy
    pub fn with_init(mut self, init: CentroidInit) -> Self {
        self.init = init;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Row normalization applied after TF-IDF weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Norm {
    /// Divide each row by its sum of absolute values
    L1,
    /// Divide each row by its Euclidean length
    L2,
}

/// Configuration for the TF-IDF vectorizer
#[derive(Debug, Clone)]
pub struct TfidfConfig {
    /// Lowercase documents before tokenizing
    pub lowercase: bool,

    /// Regular expression whose matches are the tokens of a document
    pub token_pattern: String,

    /// Row normalization, `None` to keep raw weights
    pub norm: Option<Norm>,

    /// Weight term frequencies by inverse document frequency
    pub use_idf: bool,

    /// Add one to document frequencies, as if an extra document held every term once
    pub smooth_idf: bool,

    /// Replace term frequency `tf` with `1 + ln(tf)`
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            norm: Some(Norm::L2),
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

impl TfidfConfig {
    /// Lowercase documents before tokenizing
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Set the regex whose matches are the tokens
    pub fn with_token_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.token_pattern = pattern.into();
        self
    }

    /// Set the row normalization, `None` to keep raw weights
    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.norm = norm;
        self
    }

    /// Enable or disable inverse document frequency weighting
    pub fn with_use_idf(mut self, use_idf: bool) -> Self {
        self.use_idf = use_idf;
        self
    }

    /// Add one to document frequencies, as if an extra document held every term
    pub fn with_smooth_idf(mut self, smooth_idf: bool) -> Self {
        self.smooth_idf = smooth_idf;
        self
    }

    /// Replace term counts with `1 + ln(count)`
    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }
}
