//! Seeded k-means over RGB colors, shared by palette extraction and corpus
//! exploration.

use std::collections::BTreeSet;

use kmeans_colors::{Calculate, get_kmeans};
use palette::Srgb;
use tracing::{debug, warn};

use crate::color::Color;

/// Cluster labels come back from `kmeans_colors` as `u8`.
pub const MAX_CLUSTERS: usize = 256;

/// Outcome of one k-means run.
#[derive(Clone, Debug)]
pub(crate) struct Clustering {
    /// Final centroids rounded to 8-bit colors.
    pub centroids: Vec<Color>,
    /// Cluster index of every input sample, in input order.
    pub labels: Vec<usize>,
    /// Member count per centroid.
    pub counts: Vec<usize>,
    /// False when the iteration cap stopped the run before the partition
    /// became stable.
    pub converged: bool,
}

/// Run k-means (k-means++ seeding, Lloyd iterations, Euclidean RGB distance)
/// over `colors`.
///
/// The caller validates `1 <= k <= colors.len()` and `k <= MAX_CLUSTERS`.
/// When the input has fewer distinct colors than `k`, `k` is lowered to that
/// count: extra centroids could only duplicate existing ones.
pub(crate) fn cluster_colors(
    colors: &[Color],
    k: usize,
    max_iterations: usize,
    convergence: f32,
    seed: u64,
) -> Clustering {
    let distinct = colors.iter().collect::<BTreeSet<_>>().len();
    let k = if distinct < k {
        debug!(requested = k, distinct, "fewer distinct colors than clusters, lowering k");
        distinct
    } else {
        k
    };

    let samples: Vec<Srgb<f32>> = colors.iter().map(|&c| c.into()).collect();
    let kmeans = get_kmeans(k, max_iterations, convergence, false, &samples, seed);

    let (final_indices, converged) = relabel(&samples, &kmeans.centroids, &kmeans.indices);
    if !converged {
        warn!(
            k,
            max_iterations,
            score = kmeans.score,
            "k-means hit the iteration cap before the partition stabilized"
        );
    }

    let centroids: Vec<Color> = kmeans.centroids.iter().map(|&c| Color::from(c)).collect();
    let labels: Vec<usize> = final_indices.iter().map(|&i| i as usize).collect();
    let mut counts = vec![0usize; centroids.len()];
    for &label in &labels {
        counts[label] += 1;
    }

    Clustering {
        centroids,
        labels,
        counts,
        converged,
    }
}

/// Assign every sample to its nearest centroid.
///
/// The backend's labels belong to the centroids before its final update. If
/// relabeling against the final centroids moves nothing, the partition is a
/// fixed point and the run converged.
fn relabel(samples: &[Srgb<f32>], centroids: &[Srgb<f32>], previous: &[u8]) -> (Vec<u8>, bool) {
    let mut indices: Vec<u8> = Vec::with_capacity(samples.len());
    <Srgb<f32> as Calculate>::get_closest_centroid(samples, centroids, &mut indices);
    let stable = indices == previous;
    (indices, stable)
}
