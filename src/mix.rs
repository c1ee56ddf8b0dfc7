//! Color blending.
//!
//! All mixes are per-channel arithmetic means in 8-bit sRGB space, rounded
//! half away from zero (127.5 becomes 128).

use crate::color::Color;
use crate::error::{ColorError, Result};
use crate::extract::ClusterResult;

/// Blend the extracted colors, each weighted by the share of the image it
/// covers.
pub fn weighted_mix(result: &ClusterResult) -> Color {
    let mut acc = [0.0f64; 3];
    for share in result {
        for (a, c) in acc.iter_mut().zip(share.color.channels()) {
            *a += c as f64 * share.proportion;
        }
    }
    Color::from_f64_channels(acc)
}

/// Blend colors with identical weight each.
pub fn equal_mix(colors: &[Color]) -> Result<Color> {
    mix(colors, None)
}

/// Blend colors with optional weights.
///
/// Without weights every color counts the same. Weights are normalized to sum
/// to one, so `[3, 1]` and `[0.75, 0.25]` give the same result.
pub fn mix(colors: &[Color], weights: Option<&[f64]>) -> Result<Color> {
    if colors.is_empty() {
        return Err(ColorError::invalid("colors", "at least one color is required"));
    }

    let normalized: Vec<f64> = match weights {
        None => vec![1.0 / colors.len() as f64; colors.len()],
        Some(weights) => normalize_weights(weights, colors.len())?,
    };

    let mut acc = [0.0f64; 3];
    for (color, w) in colors.iter().zip(&normalized) {
        for (a, c) in acc.iter_mut().zip(color.channels()) {
            *a += c as f64 * w;
        }
    }
    Ok(Color::from_f64_channels(acc))
}

fn normalize_weights(weights: &[f64], expected: usize) -> Result<Vec<f64>> {
    if weights.len() != expected {
        return Err(ColorError::invalid(
            "weights",
            format!("{} weights for {expected} colors", weights.len()),
        ));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ColorError::invalid(
            "weights",
            format!("weights must be finite and non-negative, got {w}"),
        ));
    }
    // Scale by the largest weight first so huge finite weights cannot
    // overflow the sum.
    let largest = weights.iter().copied().fold(0.0f64, f64::max);
    if largest <= 0.0 {
        return Err(ColorError::invalid("weights", "weights sum to zero"));
    }
    let scaled: Vec<f64> = weights.iter().map(|w| w / largest).collect();
    let sum: f64 = scaled.iter().sum();
    Ok(scaled.iter().map(|w| w / sum).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);
    const GREEN: Color = Color::new(0, 255, 0);

    #[test]
    fn equal_mix_rounds_half_up() {
        let mixed = equal_mix(&[Color::BLACK, Color::WHITE]).unwrap();
        assert_eq!(mixed, Color::new(128, 128, 128));
    }

    #[test]
    fn weights_are_normalized() {
        let mixed = mix(&[RED, GREEN], Some(&[3.0, 1.0])).unwrap();
        assert_eq!(mixed, Color::new(191, 64, 0));
        let same = mix(&[RED, GREEN], Some(&[0.75, 0.25])).unwrap();
        assert_eq!(mixed, same);
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let mixed = mix(&[RED, GREEN], Some(&[1e308, 1e308])).unwrap();
        assert_eq!(mixed, Color::new(128, 128, 0));
        let skewed = mix(&[RED, GREEN], Some(&[f64::MAX, f64::MAX / 3.0])).unwrap();
        assert_eq!(skewed, Color::new(191, 64, 0));
    }

    #[test]
    fn missing_weights_mean_uniform() {
        let a = mix(&[RED, GREEN, Color::BLACK], None).unwrap();
        let b = mix(&[RED, GREEN, Color::BLACK], Some(&[2.0, 2.0, 2.0])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Color::new(85, 85, 0));
    }

    #[test]
    fn single_color_mixes_to_itself() {
        let c = Color::new(0, 147, 68);
        assert_eq!(equal_mix(&[c]).unwrap(), c);
        assert_eq!(mix(&[c], Some(&[0.1])).unwrap(), c);
    }

    #[test]
    fn bad_inputs_are_rejected() {
        assert!(equal_mix(&[]).unwrap_err().is_invalid_parameter());
        assert!(mix(&[], Some(&[])).is_err());
        assert!(mix(&[RED, GREEN], Some(&[1.0])).is_err());
        assert!(mix(&[RED], Some(&[1.0, 2.0])).is_err());
        assert!(mix(&[RED, GREEN], Some(&[0.0, 0.0])).is_err());
        assert!(mix(&[RED, GREEN], Some(&[-1.0, 2.0])).is_err());
        assert!(mix(&[RED], Some(&[f64::NAN])).is_err());
    }
}
