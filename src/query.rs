use crate::config::{KMeansConfig, TfidfConfig};
use crate::error::ClusterError;
use crate::kmeans::KMeans;
use crate::messages::MessageList;
use crate::tfidf::TfidfVectorizer;
use ndarray::{Array1, Array2};
use std::iter::FusedIterator;
use tracing::info;

/// Vectorizes messages with TF-IDF and partitions them with k-means.
///
/// The defaults split messages into two clusters using k-means++ seeding,
/// ten restarts and at most 200 iterations per restart.
#[derive(Debug, Clone, Default)]
pub struct MessageClusterer {
    tfidf: TfidfConfig,
    kmeans: KMeansConfig,
}

impl MessageClusterer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tfidf_config(mut self, config: TfidfConfig) -> Self {
        self.tfidf = config;
        self
    }

    pub fn with_kmeans_config(mut self, config: KMeansConfig) -> Self {
        self.kmeans = config;
        self
    }

    /// Fix the k-means seed for reproducible clusters
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.kmeans.seed = Some(seed);
        self
    }

    pub fn tfidf_config(&self) -> &TfidfConfig {
        &self.tfidf
    }

    pub fn kmeans_config(&self) -> &KMeansConfig {
        &self.kmeans
    }

    /// Vectorize and cluster `messages`.
    ///
    /// # Errors
    ///
    /// - `InvalidK` if the k-means config asks for zero clusters
    /// - `EmptyVocabulary` if no message contains a token
    /// - `InsufficientData` if there are fewer messages than clusters
    pub fn cluster(&self, messages: MessageList) -> Result<MessageClusters, ClusterError> {
        if self.kmeans.k == 0 {
            return Err(ClusterError::InvalidK(
                "k must be greater than 0".to_string(),
            ));
        }

        let mut vectorizer = TfidfVectorizer::with_config(self.tfidf.clone());
        let features = vectorizer.fit_transform(messages.as_slice())?;

        let mut kmeans = KMeans::with_config(self.kmeans.clone());
        let labels = kmeans.fit_predict(&features.view())?;
        let centroids = kmeans.centroids().cloned().ok_or(ClusterError::NotFitted)?;
        let inertia = kmeans.inertia().ok_or(ClusterError::NotFitted)?;

        info!(
            n_messages = messages.len(),
            vocabulary_size = vectorizer.vocabulary_size(),
            k = kmeans.k(),
            inertia,
            "Clustered messages"
        );

        Ok(MessageClusters {
            messages,
            labels,
            centroids,
            inertia,
            vocabulary_size: vectorizer.vocabulary_size(),
        })
    }

    /// Parse `raw` as `§`-separated messages, then cluster them.
    pub fn cluster_raw(&self, raw: &str) -> Result<MessageClusters, ClusterError> {
        self.cluster(MessageList::parse(raw))
    }
}

/// Messages together with the cluster each one was assigned to.
#[derive(Debug, Clone)]
pub struct MessageClusters {
    messages: MessageList,
    labels: Array1<usize>,
    centroids: Array2<f32>,
    inertia: f64,
    vocabulary_size: usize,
}

impl MessageClusters {
    /// Cluster of the first message exactly equal to `target`
    pub fn cluster_of(&self, target: &str) -> Option<usize> {
        self.messages
            .position(target)
            .map(|index| self.labels[index])
    }

    /// Indices of the non-empty messages that share a cluster with `target`.
    ///
    /// Only the first message equal to `target` decides the cluster. Indices
    /// come out in ascending order; nothing comes out if no message matches.
    ///
    /// ```
    /// use msgcluster_rs::MessageClusterer;
    ///
    /// let clusters = MessageClusterer::new()
    ///     .with_seed(1)
    ///     .cluster_raw("apple pie§apple tart§§car engine§car wheel")
    ///     .unwrap();
    ///
    /// let mates: Vec<usize> = clusters.cluster_mates("apple pie").collect();
    /// assert_eq!(mates, [0, 1]);
    /// assert_eq!(clusters.cluster_mates("bicycle").count(), 0);
    /// ```
    pub fn cluster_mates(&self, target: &str) -> ClusterMates<'_> {
        ClusterMates {
            messages: &self.messages,
            labels: &self.labels,
            label: self.cluster_of(target),
            next_index: 0,
        }
    }

    /// Indices of all messages with `label`, empty ones included
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    /// Cluster of the message at `index`
    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied()
    }

    pub fn centroids(&self) -> &Array2<f32> {
        &self.centroids
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }
}

/// Lazy iterator over the indices returned by [`MessageClusters::cluster_mates`]
#[derive(Debug)]
pub struct ClusterMates<'a> {
    messages: &'a MessageList,
    labels: &'a Array1<usize>,
    label: Option<usize>,
    next_index: usize,
}

impl Iterator for ClusterMates<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let label = self.label?;

        while self.next_index < self.labels.len() {
            let index = self.next_index;
            self.next_index += 1;

            let non_empty = self.messages.get(index).is_some_and(|m| !m.is_empty());
            if self.labels[index] == label && non_empty {
                return Some(index);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.label {
            Some(_) => (0, Some(self.labels.len().saturating_sub(self.next_index))),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for ClusterMates<'_> {}
