use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Compute squared L2 norms for each row of a 2D array
/// Returns a 1D array where each element is the squared norm of the corresponding row
#[inline]
pub fn compute_squared_norms(data: &ArrayView2<f32>) -> Array1<f32> {
    let norms: Vec<f32> = (0..data.nrows())
        .into_par_iter()
        .map(|i| {
            let row = data.row(i);
            row.dot(&row)
        })
        .collect();

    Array1::from_vec(norms)
}

/// Find the nearest centroid for each data point
///
/// Uses the identity: ||x - c||^2 = ||x||^2 + ||c||^2 - 2*x.c
/// Ties go to the lowest centroid index.
///
/// # Arguments
/// * `data` - Data points (n_data, n_features)
/// * `data_norms` - Squared norms of data points (n_data,)
/// * `centroids` - All centroids (k, n_features)
/// * `centroid_norms` - Squared norms of centroids (k,)
///
/// # Returns
/// * `(labels, distances)` - Cluster assignment and squared distance to it for each point
pub fn find_nearest_centroids(
    data: &ArrayView2<f32>,
    data_norms: &ArrayView1<f32>,
    centroids: &ArrayView2<f32>,
    centroid_norms: &ArrayView1<f32>,
) -> (Array1<usize>, Array1<f32>) {
    let k = centroids.nrows();

    // (n_data, k)
    let dot_products = data.dot(&centroids.t());

    let nearest: Vec<(usize, f32)> = (0..data.nrows())
        .into_par_iter()
        .map(|i| {
            let x_norm = data_norms[i];
            let mut best = (0, f32::INFINITY);

            for j in 0..k {
                let dist = (x_norm + centroid_norms[j] - 2.0 * dot_products[[i, j]]).max(0.0);
                if dist < best.1 {
                    best = (j, dist);
                }
            }
            best
        })
        .collect();

    let labels = nearest.iter().map(|&(label, _)| label).collect();
    let dists = nearest.iter().map(|&(_, dist)| dist).collect();
    (labels, dists)
}

/// Squared distance from every row of `data` to a single point
pub fn squared_distances_to(
    data: &ArrayView2<f32>,
    data_norms: &ArrayView1<f32>,
    point: &ArrayView1<f32>,
) -> Array1<f32> {
    let point_norm = point.dot(point);
    let dots = data.dot(point);

    let mut dists = data_norms + point_norm - 2.0f32 * &dots;
    dists.mapv_inplace(|d| d.max(0.0));
    dists
}

/// Compute centroid shift (sum of squared L2 norms of centroid movements)
///
/// Summed in row order so the result does not depend on the thread pool.
pub fn compute_centroid_shift(
    old_centroids: &ArrayView2<f32>,
    new_centroids: &ArrayView2<f32>,
) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_row, new_row)| {
            old_row
                .iter()
                .zip(new_row.iter())
                .map(|(&old, &new)| {
                    let d = (new - old) as f64;
                    d * d
                })
                .sum::<f64>()
        })
        .sum()
}

/// Mean over features of the per-feature population variance
pub fn mean_feature_variance(data: &ArrayView2<f32>) -> f64 {
    if data.nrows() == 0 || data.ncols() == 0 {
        return 0.0;
    }

    data.var_axis(Axis(0), 0.0)
        .iter()
        .map(|&v| v as f64)
        .sum::<f64>()
        / data.ncols() as f64
}
