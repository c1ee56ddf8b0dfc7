//! Dominant color extraction.
//!
//! Steps performed by [`extract`]:
//! 1. Cluster the grid's samples (row-major) with seeded k-means.
//! 2. Turn member counts into proportions and sort them, most common first.
//! 3. Fold every cluster under `min_proportion` into its nearest other
//!    surviving cluster.
//! 4. Renormalize, drop the emptied clusters and sort again.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::Color;
use crate::error::{ColorError, Result};
use crate::kmeans::{self, MAX_CLUSTERS};
use crate::mix;
use crate::pixels::PixelGrid;

/// Number of colors extracted when the caller does not ask for a count.
pub const DEFAULT_K: usize = 5;
/// Seed for k-means++ initialisation. Changing it changes every result.
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_CONVERGENCE: f32 = 1e-4;
/// Clusters covering less than this share of the image are merged away.
pub const DEFAULT_MIN_PROPORTION: f64 = 0.01;

/// Tunables for a clustering run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Hard cap on Lloyd iterations.
    pub max_iterations: usize,
    /// Centroid shift below which the run stops early.
    pub convergence: f32,
    pub seed: u64,
    pub min_proportion: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence: DEFAULT_CONVERGENCE,
            seed: DEFAULT_SEED,
            min_proportion: DEFAULT_MIN_PROPORTION,
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(ColorError::invalid("max_iterations", "must be at least 1"));
        }
        if !(self.convergence.is_finite() && self.convergence >= 0.0) {
            return Err(ColorError::invalid(
                "convergence",
                format!("must be a finite non-negative number, got {}", self.convergence),
            ));
        }
        if !(0.0..1.0).contains(&self.min_proportion) {
            return Err(ColorError::invalid(
                "min_proportion",
                format!("must be in [0, 1), got {}", self.min_proportion),
            ));
        }
        Ok(())
    }
}

/// One extracted color and the share of the image it covers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorShare {
    pub color: Color,
    pub proportion: f64,
}

/// Extracted colors, most common first.
///
/// Proportions are positive and sum to 1. Colors are distinct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    shares: Vec<ColorShare>,
    converged: bool,
}

impl ClusterResult {
    pub fn shares(&self) -> &[ColorShare] {
        &self.shares
    }

    pub fn colors(&self) -> Vec<Color> {
        self.shares.iter().map(|s| s.color).collect()
    }

    pub fn proportions(&self) -> Vec<f64> {
        self.shares.iter().map(|s| s.proportion).collect()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// False if k-means stopped at the iteration cap with an unstable
    /// partition. The colors are still usable but may shift with a higher cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorShare> {
        self.shares.iter()
    }
}

impl<'a> IntoIterator for &'a ClusterResult {
    type Item = &'a ColorShare;
    type IntoIter = std::slice::Iter<'a, ColorShare>;

    fn into_iter(self) -> Self::IntoIter {
        self.shares.iter()
    }
}

/// Extract up to `k` dominant colors with default options.
pub fn extract(pixels: &PixelGrid, k: usize) -> Result<ClusterResult> {
    extract_with(pixels, k, &ExtractOptions::default())
}

pub fn extract_with(pixels: &PixelGrid, k: usize, options: &ExtractOptions) -> Result<ClusterResult> {
    options.validate()?;
    if pixels.is_empty() {
        return Err(ColorError::invalid("pixels", "grid is empty"));
    }
    if k == 0 || k > pixels.len() {
        return Err(ColorError::invalid(
            "k",
            format!("must be in 1..={}, got {k}", pixels.len()),
        ));
    }
    if k > MAX_CLUSTERS {
        return Err(ColorError::invalid(
            "k",
            format!("at most {MAX_CLUSTERS} clusters are supported, got {k}"),
        ));
    }

    let clustering = kmeans::cluster_colors(
        pixels.samples(),
        k,
        options.max_iterations,
        options.convergence,
        options.seed,
    );

    let mut shares = proportions_by_color(&clustering.centroids, &clustering.counts, pixels.len());
    sort_shares(&mut shares);
    let before = shares.len();

    merge_minor_clusters(&mut shares, options.min_proportion);

    let total: f64 = shares.iter().map(|s| s.proportion).sum();
    shares.retain(|s| s.proportion > 0.0);
    for share in &mut shares {
        share.proportion /= total;
    }
    sort_shares(&mut shares);

    debug!(
        k,
        samples = pixels.len(),
        clusters = before,
        kept = shares.len(),
        converged = clustering.converged,
        "extracted colors"
    );

    Ok(ClusterResult {
        shares,
        converged: clustering.converged,
    })
}

/// Proportion per centroid color. Centroids that round to the same 8-bit
/// color are counted as one cluster.
fn proportions_by_color(centroids: &[Color], counts: &[usize], total: usize) -> Vec<ColorShare> {
    let mut merged: Vec<(Color, usize)> = Vec::with_capacity(centroids.len());
    for (&color, &count) in centroids.iter().zip(counts) {
        match merged.iter_mut().find(|(c, _)| *c == color) {
            Some((_, n)) => *n += count,
            None => merged.push((color, count)),
        }
    }
    merged
        .into_iter()
        .map(|(color, count)| ColorShare {
            color,
            proportion: count as f64 / total as f64,
        })
        .collect()
}

/// Descending proportion, then ascending color.
fn sort_shares(shares: &mut [ColorShare]) {
    shares.sort_by(|a, b| {
        b.proportion
            .total_cmp(&a.proportion)
            .then_with(|| a.color.cmp(&b.color))
    });
}

/// Walk the sorted clusters in order and move the share of every cluster
/// under `threshold` to the nearest other cluster that still has a share.
///
/// Each move empties one cluster, so the loop is bounded by the cluster count
/// and at least one cluster always keeps its share.
fn merge_minor_clusters(shares: &mut [ColorShare], threshold: f64) {
    for i in 0..shares.len() {
        let source = shares[i];
        if source.proportion <= 0.0 || source.proportion >= threshold {
            continue;
        }
        let nearest = shares
            .iter()
            .enumerate()
            .filter(|&(j, s)| j != i && s.proportion > 0.0)
            .min_by_key(|&(j, s)| (s.color.distance_sq(source.color), j))
            .map(|(j, _)| j);
        let Some(target) = nearest else {
            continue;
        };
        trace!(
            from = %source.color,
            into = %shares[target].color,
            proportion = source.proportion,
            "merging minor cluster"
        );
        shares[target].proportion += source.proportion;
        shares[i].proportion = 0.0;
    }
}

/// Extraction bound to one image, caching the last result.
///
/// Re-running [`ColorExtractor::extract`] with the same `k` returns the cached
/// result; a different `k` recomputes it.
#[derive(Debug)]
pub struct ColorExtractor<'a> {
    pixels: &'a PixelGrid,
    options: ExtractOptions,
    cache: Option<(usize, ClusterResult)>,
    runs: usize,
}

impl<'a> ColorExtractor<'a> {
    pub fn new(pixels: &'a PixelGrid) -> Self {
        Self::with_options(pixels, ExtractOptions::default())
    }

    pub fn with_options(pixels: &'a PixelGrid, options: ExtractOptions) -> Self {
        Self {
            pixels,
            options,
            cache: None,
            runs: 0,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn extract(&mut self, k: usize) -> Result<&ClusterResult> {
        let entry = match self.cache.take() {
            Some((cached_k, result)) if cached_k == k => (cached_k, result),
            previous => match extract_with(self.pixels, k, &self.options) {
                Ok(result) => {
                    self.runs += 1;
                    (k, result)
                }
                Err(e) => {
                    self.cache = previous;
                    return Err(e);
                }
            },
        };
        Ok(&self.cache.insert(entry).1)
    }

    /// The last result, if any extraction has run.
    pub fn cached(&self) -> Option<&ClusterResult> {
        self.cache.as_ref().map(|(_, r)| r)
    }

    /// Number of clustering runs performed so far.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Weighted mix of the cached result, extracting [`DEFAULT_K`] colors
    /// first if nothing is cached.
    pub fn weighted_mix(&mut self) -> Result<Color> {
        let result = self.cached_or_default()?;
        Ok(mix::weighted_mix(result))
    }

    /// Equal mix of the cached colors, extracting [`DEFAULT_K`] colors first
    /// if nothing is cached.
    pub fn equal_mix(&mut self) -> Result<Color> {
        let colors = self.cached_or_default()?.colors();
        mix::equal_mix(&colors)
    }

    fn cached_or_default(&mut self) -> Result<&ClusterResult> {
        let k = match &self.cache {
            Some((k, _)) => *k,
            None => DEFAULT_K.min(self.pixels.len().max(1)),
        };
        self.extract(k)
    }
}
