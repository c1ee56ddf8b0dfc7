//! Dominant color extraction and color mixing for flag images.
//!
//! The core works on an already decoded [`PixelGrid`]:
//!
//! ```rust
//! use flag_color_mix::{extract, mix, Color, PixelGrid};
//!
//! let grid = PixelGrid::from_rows(vec![
//!     vec![Color::new(255, 255, 255), Color::new(188, 0, 45)],
//!     vec![Color::new(255, 255, 255), Color::new(255, 255, 255)],
//! ])?;
//! let result = extract(&grid, 2)?;
//! assert_eq!(result.colors()[0].to_hex(), "#ffffff");
//! let weighted = mix::weighted_mix(&result);
//! let equal = mix::equal_mix(&result.colors())?;
//! # let _ = (weighted, equal);
//! # Ok::<(), flag_color_mix::ColorError>(())
//! ```
//!
//! [`extract_palette_bytes`] and the `wasm_bindgen` exports below are thin
//! wrappers that decode an image first.

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod corpus;
pub mod error;
pub mod explore;
pub mod extract;
mod kmeans;
pub mod mix;
pub mod pixels;

pub use color::Color;
pub use corpus::{Corpus, FlagPalette};
pub use error::{ColorError, Result};
pub use explore::ColorGroup;
pub use extract::{
    ClusterResult, ColorExtractor, ColorShare, DEFAULT_K, ExtractOptions, extract, extract_with,
};
pub use kmeans::MAX_CLUSTERS;
pub use pixels::PixelGrid;

// ------------------------------------------------------------
// Decoding collaborators
// ------------------------------------------------------------

/// Shrink an image so its longest side is `max_side` (nearest-neighbour).
/// Images already that small are returned as is.
pub fn downscale(img: DynamicImage, max_side: u32) -> DynamicImage {
    let (orig_w, orig_h) = img.dimensions();
    let longest = orig_w.max(orig_h);
    if max_side == 0 || longest <= max_side {
        return img;
    }
    let ratio = max_side as f32 / longest as f32;
    let w = ((orig_w as f32) * ratio).round().max(1.0) as u32;
    let h = ((orig_h as f32) * ratio).round().max(1.0) as u32;
    DynamicImage::ImageRgba8(image::imageops::resize(&img, w, h, FilterType::Nearest))
}

/// Decode an encoded image, optionally downscale it, and extract `n_colors`
/// dominant colors.
pub fn extract_palette_bytes(
    input: &[u8],
    n_colors: usize,
    downscale_to: Option<u32>,
    options: &ExtractOptions,
) -> Result<ClusterResult> {
    let img = image::load_from_memory(input)?;
    let img = match downscale_to {
        Some(side) => downscale(img, side),
        None => img,
    };
    let grid = PixelGrid::from(&img);
    extract_with(&grid, n_colors, options)
}

// ------------------------------------------------------------
// WebAssembly bindings
// ------------------------------------------------------------

fn js_err(e: ColorError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract the dominant colors of an encoded image.
///
/// Returns `{ colors: string[], proportions: number[], weighted: string,
/// equal: string, converged: boolean }` with colors as lowercase `#rrggbb`.
#[wasm_bindgen]
pub fn extract_palette(input: Vec<u8>, n_colors: usize, downscale: Option<u32>) -> std::result::Result<Object, JsValue> {
    let result = extract_palette_bytes(&input, n_colors, downscale, &ExtractOptions::default())
        .map_err(js_err)?;
    let weighted = mix::weighted_mix(&result);
    let equal = mix::equal_mix(&result.colors()).map_err(js_err)?;

    let colors_js = Array::new();
    let proportions_js = Array::new();
    for share in &result {
        colors_js.push(&JsValue::from_str(&share.color.to_hex()));
        proportions_js.push(&JsValue::from_f64(share.proportion));
    }

    let out = Object::new();
    Reflect::set(&out, &JsValue::from_str("colors"), &colors_js)?;
    Reflect::set(&out, &JsValue::from_str("proportions"), &proportions_js)?;
    Reflect::set(&out, &JsValue::from_str("weighted"), &JsValue::from_str(&weighted.to_hex()))?;
    Reflect::set(&out, &JsValue::from_str("equal"), &JsValue::from_str(&equal.to_hex()))?;
    Reflect::set(&out, &JsValue::from_str("converged"), &JsValue::from_bool(result.converged()))?;
    Ok(out)
}

/// Mix hex colors, optionally weighted. Returns the blend as `#rrggbb`.
#[wasm_bindgen]
pub fn mix_hex(colors: Array, weights: Option<Vec<f64>>) -> std::result::Result<String, JsValue> {
    let mut parsed = Vec::with_capacity(colors.length() as usize);
    for val in colors.iter() {
        let s = val
            .as_string()
            .ok_or_else(|| JsValue::from_str("Colors must be strings"))?;
        parsed.push(Color::from_hex(&s).map_err(js_err)?);
    }
    let mixed = mix::mix(&parsed, weights.as_deref()).map_err(js_err)?;
    Ok(mixed.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn downscale_keeps_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 320));
        let small = downscale(img, 64);
        assert_eq!(small.dimensions(), (64, 32));
        let tiny = DynamicImage::ImageRgb8(RgbImage::new(10, 5));
        assert_eq!(downscale(tiny, 64).dimensions(), (10, 5));
    }

    #[test]
    fn extracts_from_encoded_png() {
        // Two vertical bands, 3:1.
        let img = RgbImage::from_fn(8, 4, |x, _| {
            if x < 6 { Rgb([0, 122, 61]) } else { Rgb([255, 255, 255]) }
        });
        let result =
            extract_palette_bytes(&png_bytes(&img), 2, None, &ExtractOptions::default()).unwrap();
        assert_eq!(result.colors(), vec![Color::new(0, 122, 61), Color::WHITE]);
        assert_eq!(result.proportions(), vec![0.75, 0.25]);
    }

    #[test]
    fn undecodable_bytes_are_an_image_error() {
        let err = extract_palette_bytes(b"not an image", 2, None, &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, ColorError::Image(_)));
    }
}
