//! # msgcluster-rs
//!
//! Group short text messages into clusters with TF-IDF features and k-means,
//! then list the messages that landed in the same cluster as a target message.
//!
//! ## Features
//!
//! - **TF-IDF vectorizer**: regex tokenization, sorted vocabulary, smoothed IDF
//!   and L2-normalized rows by default
//! - **k-means with restarts**: k-means++ seeding, best-of-`n_init` by inertia
//! - **Parallel computation**: restarts and distance computations run on rayon
//! - **ndarray compatible**: feature matrices and centroids are plain ndarray arrays
//! - **Lazy queries**: cluster mates of a message are yielded one index at a time
//!
//! ## Example
//!
//! ```rust
//! use msgcluster_rs::{MessageClusterer, MessageList};
//!
//! let messages = MessageList::parse("apple pie§apple tart§car engine§car wheel");
//! let clusters = MessageClusterer::new()
//!     .with_seed(42)
//!     .cluster(messages)
//!     .unwrap();
//!
//! let mates: Vec<usize> = clusters.cluster_mates("apple tart").collect();
//! assert_eq!(mates, [0, 1]);
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use msgcluster_rs::{CentroidInit, KMeansConfig, MessageClusterer, Norm, TfidfConfig};
//!
//! let clusterer = MessageClusterer::new()
//!     .with_tfidf_config(TfidfConfig::default().with_sublinear_tf(true).with_norm(Some(Norm::L2)))
//!     .with_kmeans_config(
//!         KMeansConfig::new(3)
//!             .with_n_init(5)
//!             .with_max_iters(50)
//!             .with_init(CentroidInit::KMeansPlusPlus)
//!             .with_seed(7),
//!     );
//!
//! let clusters = clusterer
//!     .cluster_raw("red apple§green apple§fast car§slow car§blue sky§grey sky")
//!     .unwrap();
//! assert_eq!(clusters.labels().len(), 6);
//! ```

mod algorithm;
mod config;
mod distance;
mod error;
mod kmeans;
mod messages;
mod query;
mod tfidf;

pub use config::{CentroidInit, KMeansConfig, Norm, TfidfConfig, DEFAULT_TOKEN_PATTERN};
pub use error::ClusterError;
pub use kmeans::KMeans;
pub use messages::{MessageList, MESSAGE_SEPARATOR};
pub use query::{ClusterMates, MessageClusterer, MessageClusters};
pub use tfidf::TfidfVectorizer;
