//! Clustering across the whole corpus: which flags share colors, and which
//! flags blend to similar mixes.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::color::Color;
use crate::corpus::Corpus;
use crate::error::{ColorError, Result};
use crate::extract::ExtractOptions;
use crate::kmeans::{self, MAX_CLUSTERS};

/// One cluster of corpus colors and the countries that fell into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColorGroup {
    pub center: Color,
    /// Number of colors assigned to this group.
    pub members: usize,
    pub countries: BTreeSet<String>,
}

/// Cluster every palette color of every flag into `n` groups.
///
/// A country is listed in each group that received at least one of its
/// colors.
pub fn cluster_palette_colors(corpus: &Corpus, n: usize, options: &ExtractOptions) -> Result<Vec<ColorGroup>> {
    let mut colors = Vec::new();
    let mut owners = Vec::new();
    for (country, palette) in corpus.iter() {
        for &color in &palette.colors {
            colors.push(color);
            owners.push(country);
        }
    }
    group(&colors, &owners, n, options)
}

/// Cluster the proportion-weighted mix of each flag into `n` groups.
pub fn cluster_mixed_colors(corpus: &Corpus, n: usize, options: &ExtractOptions) -> Result<Vec<ColorGroup>> {
    let mut colors = Vec::with_capacity(corpus.len());
    let mut owners = Vec::with_capacity(corpus.len());
    for (country, palette) in corpus.iter() {
        colors.push(palette.weighted_mix()?);
        owners.push(country);
    }
    group(&colors, &owners, n, options)
}

fn group(colors: &[Color], owners: &[&str], n: usize, options: &ExtractOptions) -> Result<Vec<ColorGroup>> {
    options.validate()?;
    if colors.is_empty() {
        return Err(ColorError::invalid("corpus", "no colors to cluster"));
    }
    if n == 0 || n > colors.len() || n > MAX_CLUSTERS {
        return Err(ColorError::invalid(
            "n",
            format!("must be in 1..={}, got {n}", colors.len().min(MAX_CLUSTERS)),
        ));
    }

    let clustering = kmeans::cluster_colors(
        colors,
        n,
        options.max_iterations,
        options.convergence,
        options.seed,
    );

    let mut groups: Vec<ColorGroup> = clustering
        .centroids
        .iter()
        .zip(&clustering.counts)
        .map(|(&center, &members)| ColorGroup {
            center,
            members,
            countries: BTreeSet::new(),
        })
        .collect();
    for (&label, &owner) in clustering.labels.iter().zip(owners) {
        groups[label].countries.insert(owner.to_string());
    }
    groups.retain(|g| g.members > 0);

    debug!(samples = colors.len(), n, groups = groups.len(), "grouped corpus colors");
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::FlagPalette;

    fn palette(colors: &[Color], proportions: &[f64]) -> FlagPalette {
        FlagPalette {
            colors: colors.to_vec(),
            proportions: proportions.to_vec(),
        }
    }

    fn corpus() -> Corpus {
        let red = Color::new(220, 20, 30);
        let white = Color::new(250, 250, 250);
        let green = Color::new(0, 140, 70);
        let mut corpus = Corpus::new();
        corpus.insert("Japan", palette(&[white, red], &[0.9, 0.1]));
        corpus.insert("Poland", palette(&[white, red], &[0.5, 0.5]));
        corpus.insert("Nigeria", palette(&[green, white], &[0.66, 0.34]));
        corpus
    }

    #[test]
    fn palette_colors_group_countries() {
        let groups = cluster_palette_colors(&corpus(), 3, &ExtractOptions::default()).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.iter().map(|g| g.members).sum::<usize>(), 6);
        let white = groups
            .iter()
            .find(|g| g.center == Color::new(250, 250, 250))
            .unwrap();
        assert_eq!(white.countries.len(), 3);
        let green = groups.iter().find(|g| g.center == Color::new(0, 140, 70)).unwrap();
        assert_eq!(green.countries.iter().collect::<Vec<_>>(), vec!["Nigeria"]);
    }

    #[test]
    fn mixed_colors_give_one_member_per_country() {
        let groups = cluster_mixed_colors(&corpus(), 1, &ExtractOptions::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, 3);
        assert_eq!(groups[0].countries.len(), 3);
    }

    #[test]
    fn group_count_is_validated() {
        let options = ExtractOptions::default();
        assert!(cluster_palette_colors(&corpus(), 0, &options).is_err());
        assert!(cluster_mixed_colors(&corpus(), 4, &options).is_err());
        assert!(cluster_palette_colors(&Corpus::new(), 1, &options).is_err());
    }
}
