use crate::config::{CentroidInit, KMeansConfig};
use crate::distance::{
    compute_centroid_shift, compute_squared_norms, find_nearest_centroids, mean_feature_variance,
    squared_distances_to,
};
use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, trace};

/// Result of the k-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansResult {
    pub centroids: Array2<f32>,
    pub labels: Array1<usize>,
    pub inertia: f64,
    pub n_iterations: usize,
}

/// Run k-means `config.n_init` times and keep the restart with the lowest inertia.
///
/// Every restart gets its own seed drawn from `config.seed`, so the outcome is
/// reproducible for a fixed seed no matter how rayon schedules the restarts.
/// On equal inertia the earliest restart wins.
pub fn kmeans_best_of(
    data: &ArrayView2<f32>,
    config: &KMeansConfig,
) -> Result<KMeansResult, ClusterError> {
    let n_samples = data.nrows();
    let k = config.k;

    // Validate inputs
    if k == 0 {
        return Err(ClusterError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if config.n_init == 0 {
        return Err(ClusterError::InvalidConfig(
            "n_init must be greater than 0".to_string(),
        ));
    }

    if config.max_iters == 0 {
        return Err(ClusterError::InvalidConfig(
            "max_iters must be greater than 0".to_string(),
        ));
    }

    if n_samples < k {
        return Err(ClusterError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            n_samples, k
        )));
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let run_seeds: Vec<u64> = (0..config.n_init).map(|_| rng.gen()).collect();

    let data_norms = compute_squared_norms(data);
    let tol = config.tol * mean_feature_variance(data);

    debug!(
        n_samples,
        n_features = data.ncols(),
        k,
        n_init = config.n_init,
        seed,
        "Training k-means"
    );

    let runs: Vec<KMeansResult> = run_seeds
        .par_iter()
        .enumerate()
        .map(|(run, &run_seed)| {
            let start = Instant::now();
            let mut rng = ChaCha8Rng::seed_from_u64(run_seed);

            let centroids = match config.init {
                CentroidInit::KMeansPlusPlus => {
                    initialize_centroids_plus_plus(data, &data_norms.view(), k, &mut rng)
                }
                CentroidInit::Random => initialize_centroids(data, k, &mut rng),
            };

            let result = lloyd(
                data,
                &data_norms.view(),
                centroids,
                config.max_iters,
                tol,
                &mut rng,
            );

            debug!(
                run,
                inertia = result.inertia,
                n_iterations = result.n_iterations,
                elapsed_s = start.elapsed().as_secs_f64(),
                "k-means restart finished"
            );
            result
        })
        .collect();

    let mut runs = runs.into_iter().enumerate();
    let (mut best_run, mut best) = runs.next().ok_or_else(|| {
        ClusterError::InvalidConfig("n_init must be greater than 0".to_string())
    })?;

    for (run, result) in runs {
        if result.inertia < best.inertia {
            best_run = run;
            best = result;
        }
    }

    debug!(run = best_run, inertia = best.inertia, "Selected best restart");

    Ok(best)
}

/// Lloyd iterations from the given starting centroids
fn lloyd(
    data: &ArrayView2<f32>,
    data_norms: &ArrayView1<f32>,
    mut centroids: Array2<f32>,
    max_iters: usize,
    tol: f64,
    rng: &mut ChaCha8Rng,
) -> KMeansResult {
    let k = centroids.nrows();

    let mut labels: Array1<usize> = Array1::zeros(data.nrows());
    let mut n_iterations = 0;

    for iteration in 0..max_iters {
        n_iterations = iteration + 1;

        let centroid_norms = compute_squared_norms(&centroids.view());
        let (new_labels, _) = find_nearest_centroids(
            data,
            data_norms,
            &centroids.view(),
            &centroid_norms.view(),
        );

        let new_centroids = update_centroids(data, &new_labels, k, rng);
        let shift = compute_centroid_shift(&centroids.view(), &new_centroids.view());
        centroids = new_centroids;

        trace!(iteration = iteration + 1, max_iters, shift, "Lloyd iteration");

        if iteration > 0 && new_labels == labels {
            trace!(iterations = iteration + 1, "Converged: labels unchanged");
            break;
        }
        labels = new_labels;

        if shift <= tol {
            trace!(iterations = iteration + 1, shift, tol, "Converged: shift within tolerance");
            break;
        }
    }

    // Labels must match the final centroids
    let centroid_norms = compute_squared_norms(&centroids.view());
    let (labels, _) = find_nearest_centroids(
        data,
        data_norms,
        &centroids.view(),
        &centroid_norms.view(),
    );

    let inertia = compute_inertia(data, &centroids.view(), &labels);

    KMeansResult {
        centroids,
        labels,
        inertia,
        n_iterations,
    }
}

/// Mean of the points assigned to each cluster. Empty clusters are re-seeded
/// with random data points.
fn update_centroids(
    data: &ArrayView2<f32>,
    labels: &Array1<usize>,
    k: usize,
    rng: &mut ChaCha8Rng,
) -> Array2<f32> {
    let n_samples = data.nrows();

    let mut centroids: Array2<f32> = Array2::zeros((k, data.ncols()));
    let mut counts = vec![0usize; k];

    for (row, &label) in data.outer_iter().zip(labels.iter()) {
        counts[label] += 1;
        let mut sum = centroids.row_mut(label);
        sum += &row;
    }

    let mut empty_clusters = Vec::new();
    for (cluster_idx, &count) in counts.iter().enumerate() {
        if count > 0 {
            let mut centroid = centroids.row_mut(cluster_idx);
            centroid /= count as f32;
        } else {
            empty_clusters.push(cluster_idx);
        }
    }

    if !empty_clusters.is_empty() {
        let indices: Vec<usize> = (0..n_samples).collect();
        let random_indices = indices.choose_multiple(rng, empty_clusters.len());

        for (&cluster_idx, &data_idx) in empty_clusters.iter().zip(random_indices) {
            centroids.row_mut(cluster_idx).assign(&data.row(data_idx));
        }

        trace!(count = empty_clusters.len(), "Reinitialized empty clusters");
    }

    centroids
}

/// Initialize centroids by randomly selecting k data points
fn initialize_centroids(data: &ArrayView2<f32>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f32> {
    let indices: Vec<usize> = (0..data.nrows()).collect();

    let mut centroids = Array2::zeros((k, data.ncols()));
    for (centroid_idx, &data_idx) in indices.choose_multiple(rng, k).enumerate() {
        centroids.row_mut(centroid_idx).assign(&data.row(data_idx));
    }

    centroids
}

/// Greedy k-means++ seeding.
///
/// The first centroid is a uniformly random point. Each following centroid is
/// the best of `2 + ln(k)` candidates sampled with probability proportional to
/// their squared distance to the closest centroid chosen so far, where "best"
/// minimizes the total squared distance once the candidate is added.
fn initialize_centroids_plus_plus(
    data: &ArrayView2<f32>,
    data_norms: &ArrayView1<f32>,
    k: usize,
    rng: &mut ChaCha8Rng,
) -> Array2<f32> {
    let n_samples = data.nrows();
    let n_local_trials = 2 + (k as f64).ln() as usize;

    let mut centroids = Array2::zeros((k, data.ncols()));

    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&data.row(first));

    let mut closest_dist_sq = squared_distances_to(data, data_norms, &data.row(first));
    let mut current_pot: f64 = closest_dist_sq.iter().map(|&d| d as f64).sum();

    for centroid_idx in 1..k {
        let cumulative: Vec<f64> = closest_dist_sq
            .iter()
            .scan(0.0f64, |acc, &d| {
                *acc += d as f64;
                Some(*acc)
            })
            .collect();

        let mut best: Option<(usize, f64, Array1<f32>)> = None;

        for _ in 0..n_local_trials {
            let threshold = rng.gen::<f64>() * current_pot;
            let candidate = cumulative
                .partition_point(|&c| c < threshold)
                .min(n_samples - 1);

            let candidate_dists = squared_distances_to(data, data_norms, &data.row(candidate));
            let merged: Array1<f32> = candidate_dists
                .iter()
                .zip(closest_dist_sq.iter())
                .map(|(&a, &b)| a.min(b))
                .collect();
            let pot: f64 = merged.iter().map(|&d| d as f64).sum();

            if best.as_ref().map_or(true, |(_, best_pot, _)| pot < *best_pot) {
                best = Some((candidate, pot, merged));
            }
        }

        if let Some((candidate, pot, merged)) = best {
            centroids.row_mut(centroid_idx).assign(&data.row(candidate));
            current_pot = pot;
            closest_dist_sq = merged;
        }
    }

    centroids
}

/// Sum of squared distances from each point to its assigned centroid
fn compute_inertia(
    data: &ArrayView2<f32>,
    centroids: &ArrayView2<f32>,
    labels: &Array1<usize>,
) -> f64 {
    data.outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| {
            row.iter()
                .zip(centroids.row(label).iter())
                .map(|(&x, &c)| {
                    let d = (x - c) as f64;
                    d * d
                })
                .sum::<f64>()
        })
        .sum()
}

/// Assign each point to its nearest centroid
pub fn predict_labels(data: &ArrayView2<f32>, centroids: &ArrayView2<f32>) -> Array1<usize> {
    let data_norms = compute_squared_norms(data);
    let centroid_norms = compute_squared_norms(centroids);

    let (labels, _) =
        find_nearest_centroids(data, &data_norms.view(), centroids, &centroid_norms.view());
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    fn two_blobs() -> Array2<f32> {
        array![
            [0.0f32, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [10.0, 10.0],
            [10.1, 10.0],
            [10.0, 10.1]
        ]
    }

    #[test]
    fn test_initialize_centroids() {
        let data = Array2::random((100, 8), Uniform::new(-1.0f32, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let centroids = initialize_centroids(&data.view(), 5, &mut rng);

        assert_eq!(centroids.nrows(), 5);
        assert_eq!(centroids.ncols(), 8);
    }

    #[test]
    fn test_plus_plus_picks_data_points() {
        let data = Array2::random((50, 4), Uniform::new(-1.0f32, 1.0));
        let norms = compute_squared_norms(&data.view());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let centroids = initialize_centroids_plus_plus(&data.view(), &norms.view(), 3, &mut rng);

        for centroid in centroids.outer_iter() {
            assert!(data.outer_iter().any(|row| row == centroid));
        }
    }

    #[test]
    fn test_plus_plus_spreads_over_blobs() {
        let data = two_blobs();
        let norms = compute_squared_norms(&data.view());

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let centroids =
                initialize_centroids_plus_plus(&data.view(), &norms.view(), 2, &mut rng);
            let near_origin = centroids.outer_iter().filter(|c| c[0] < 5.0).count();
            assert_eq!(near_origin, 1, "seed {} put both centroids in one blob", seed);
        }
    }

    #[test]
    fn test_plus_plus_identical_points() {
        let data = array![[1.0f32, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let norms = compute_squared_norms(&data.view());
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let centroids = initialize_centroids_plus_plus(&data.view(), &norms.view(), 2, &mut rng);
        assert_eq!(centroids, array![[1.0f32, 1.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_kmeans_basic() {
        let data = Array2::random((500, 16), Uniform::new(-1.0f32, 1.0));
        let config = KMeansConfig::new(5).with_max_iters(10).with_seed(42);

        let result = kmeans_best_of(&data.view(), &config).unwrap();

        assert_eq!(result.centroids.nrows(), 5);
        assert_eq!(result.centroids.ncols(), 16);
        assert_eq!(result.labels.len(), 500);
        assert!(result.n_iterations <= 10);

        for &label in result.labels.iter() {
            assert!(label < 5);
        }
    }

    #[test]
    fn test_kmeans_separates_blobs() {
        let data = two_blobs();
        let config = KMeansConfig::new(2).with_seed(3);

        let result = kmeans_best_of(&data.view(), &config).unwrap();

        let labels = result.labels;
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert!(result.inertia < 0.1);
    }

    #[test]
    fn test_inertia_matches_assignment() {
        let data = Array2::random((200, 3), Uniform::new(-1.0f32, 1.0));
        let config = KMeansConfig::new(4).with_seed(11);

        let result = kmeans_best_of(&data.view(), &config).unwrap();
        let recomputed = compute_inertia(&data.view(), &result.centroids.view(), &result.labels);

        assert_relative_eq!(result.inertia, recomputed, epsilon = 1e-9);
        assert_eq!(
            predict_labels(&data.view(), &result.centroids.view()),
            result.labels
        );
    }

    #[test]
    fn test_same_seed_same_result() {
        let data = Array2::random((300, 6), Uniform::new(-1.0f32, 1.0));
        let config = KMeansConfig::new(3).with_seed(99);

        let a = kmeans_best_of(&data.view(), &config).unwrap();
        let b = kmeans_best_of(&data.view(), &config).unwrap();

        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_more_restarts_never_worse() {
        let data = Array2::random((300, 4), Uniform::new(-1.0f32, 1.0));

        let single = kmeans_best_of(&data.view(), &KMeansConfig::new(6).with_n_init(1).with_seed(5))
            .unwrap();
        let many = kmeans_best_of(&data.view(), &KMeansConfig::new(6).with_n_init(10).with_seed(5))
            .unwrap();

        // the first restart of both runs shares its seed
        assert!(many.inertia <= single.inertia);
    }

    #[test]
    fn test_random_init() {
        let data = two_blobs();
        let config = KMeansConfig::new(2)
            .with_init(CentroidInit::Random)
            .with_seed(1);

        let result = kmeans_best_of(&data.view(), &config).unwrap();
        assert_ne!(result.labels[0], result.labels[3]);
    }

    #[test]
    fn test_empty_cluster_is_reseeded() {
        let data = array![[0.0f32], [1.0], [2.0]];
        let labels = array![0usize, 0, 0];
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let centroids = update_centroids(&data.view(), &labels, 2, &mut rng);

        assert_relative_eq!(centroids[[0, 0]], 1.0);
        assert!([0.0f32, 1.0, 2.0].contains(&centroids[[1, 0]]));
    }

    #[test]
    fn test_invalid_inputs() {
        let data = Array2::random((3, 2), Uniform::new(-1.0f32, 1.0));

        let err = kmeans_best_of(&data.view(), &KMeansConfig::new(0)).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidK(_)));

        let err = kmeans_best_of(&data.view(), &KMeansConfig::new(4)).unwrap_err();
        assert!(matches!(err, ClusterError::InsufficientData(_)));

        let err = kmeans_best_of(&data.view(), &KMeansConfig::new(2).with_n_init(0)).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidConfig(_)));

        let err =
            kmeans_best_of(&data.view(), &KMeansConfig::new(2).with_max_iters(0)).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidConfig(_)));
    }
}
