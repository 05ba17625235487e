use crate::config::{Norm, TfidfConfig};
use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayViewMut1};
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// TF-IDF vectorizer producing one dense row per document.
///
/// With the default [`TfidfConfig`]:
///
/// - documents are lowercased and split into tokens of two or more word characters
/// - the vocabulary holds every token seen during `fit`, sorted lexicographically
/// - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
/// - each row is scaled to unit L2 length (rows without known tokens stay zero)
///
/// The output is dense: `transform` allocates `n_documents * vocabulary_size`
/// floats, which suits short message lists but not large corpora.
///
/// ```
/// use msgcluster_rs::TfidfVectorizer;
///
/// let mut vectorizer = TfidfVectorizer::new();
/// let matrix = vectorizer.fit_transform(&["red apple", "green apple"]).unwrap();
///
/// assert_eq!(vectorizer.feature_names().unwrap(), ["apple", "green", "red"]);
/// assert_eq!(matrix.dim(), (2, 3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    fitted: Option<Vocabulary>,
}

#[derive(Debug, Clone)]
struct Vocabulary {
    token_re: Regex,
    index: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Array1<f32>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TfidfConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Learn the vocabulary and inverse document frequencies of `documents`.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if `documents` is empty
    /// - `InvalidTokenPattern` if the configured pattern does not compile
    /// - `EmptyVocabulary` if no document contains a token
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<&mut Self, ClusterError> {
        if documents.is_empty() {
            return Err(ClusterError::InsufficientData(
                "Cannot fit a vectorizer on an empty document list".to_string(),
            ));
        }

        let token_re = Regex::new(&self.config.token_pattern)?;

        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique: HashSet<String> = tokenize(&token_re, self.config.lowercase, doc.as_ref())
                .into_iter()
                .collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(ClusterError::EmptyVocabulary);
        }

        let n_docs = documents.len() as f64;
        let idf: Array1<f32> = doc_freq
            .values()
            .map(|&df| {
                if !self.config.use_idf {
                    1.0
                } else if self.config.smooth_idf {
                    (((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0) as f32
                } else {
                    ((n_docs / df as f64).ln() + 1.0) as f32
                }
            })
            .collect();

        let terms: Vec<String> = doc_freq.into_keys().collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        debug!(
            n_documents = documents.len(),
            vocabulary_size = terms.len(),
            "Fitted TF-IDF vocabulary"
        );

        self.fitted = Some(Vocabulary {
            token_re,
            index,
            terms,
            idf,
        });
        Ok(self)
    }

    /// Turn `documents` into a TF-IDF matrix of shape (n_documents, vocabulary_size).
    ///
    /// Tokens outside the fitted vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Array2<f32>, ClusterError> {
        let vocab = self.fitted.as_ref().ok_or(ClusterError::NotFitted)?;

        let mut matrix: Array2<f32> = Array2::zeros((documents.len(), vocab.terms.len()));

        for (doc, mut row) in documents.iter().zip(matrix.outer_iter_mut()) {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            for token in tokenize(&vocab.token_re, self.config.lowercase, doc.as_ref()) {
                if let Some(&col) = vocab.index.get(&token) {
                    *counts.entry(col).or_insert(0) += 1;
                }
            }

            for (col, count) in counts {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f32).ln()
                } else {
                    count as f32
                };
                row[col] = tf * vocab.idf[col];
            }

            if let Some(norm) = self.config.norm {
                normalize(&mut row, norm);
            }
        }

        Ok(matrix)
    }

    /// Fit on `documents` and return their TF-IDF matrix.
    pub fn fit_transform<S: AsRef<str>>(
        &mut self,
        documents: &[S],
    ) -> Result<Array2<f32>, ClusterError> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Number of terms in the fitted vocabulary, 0 before fitting
    pub fn vocabulary_size(&self) -> usize {
        self.fitted.as_ref().map_or(0, |v| v.terms.len())
    }

    /// Vocabulary terms in column order
    pub fn feature_names(&self) -> Option<&[String]> {
        self.fitted.as_ref().map(|v| v.terms.as_slice())
    }

    /// Inverse document frequency of each column
    pub fn idf(&self) -> Option<&Array1<f32>> {
        self.fitted.as_ref().map(|v| &v.idf)
    }

    /// Column of `term`, if it is in the vocabulary
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.fitted.as_ref()?.index.get(term).copied()
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }
}

fn tokenize(token_re: &Regex, lowercase: bool, doc: &str) -> Vec<String> {
    if lowercase {
        let lowered = doc.to_lowercase();
        token_re
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    } else {
        token_re
            .find_iter(doc)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn normalize(row: &mut ArrayViewMut1<f32>, norm: Norm) {
    let length = match norm {
        Norm::L1 => row.iter().map(|v| v.abs()).sum::<f32>(),
        Norm::L2 => row.iter().map(|v| v * v).sum::<f32>().sqrt(),
    };

    if length > 0.0 {
        *row /= length;
    }
}
