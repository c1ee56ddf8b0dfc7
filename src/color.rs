//! RGB color value type and its `#rrggbb` text form.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{ColorError, Result};

/// An 8-bit sRGB color.
///
/// Ordering is lexicographic on (red, green, blue), which is what the
/// extractor uses to break ties between equally common clusters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance in RGB space.
    #[inline]
    pub fn distance_sq(self, other: Color) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Build a color from floating point channels, rounding half away from
    /// zero and clamping to [0, 255].
    pub fn from_f64_channels(channels: [f64; 3]) -> Self {
        let quantize = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        Self::new(quantize(channels[0]), quantize(channels[1]), quantize(channels[2]))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` or `rrggbb`, any case.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::invalid("hex", format!("expected 6 hex digits, got {s:?}")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| ColorError::invalid("hex", format!("{s:?}: {e}")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex(s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self> {
        Color::from_hex(&s)
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(c: Srgb<u8>) -> Self {
        Self::new(c.red, c.green, c.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(c: Color) -> Self {
        Srgb::new(c.r, c.g, c.b)
    }
}

impl From<Color> for Srgb<f32> {
    fn from(c: Color) -> Self {
        Srgb::<u8>::from(c).into_format()
    }
}

impl From<Srgb<f32>> for Color {
    fn from(c: Srgb<f32>) -> Self {
        c.into_format::<u8>().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_with_hash() {
        assert_eq!(Color::new(0xAB, 0x0C, 0xFF).to_hex(), "#ab0cff");
        assert_eq!(Color::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn hex_parses_with_or_without_hash() {
        assert_eq!(Color::from_hex("#FF8000").unwrap(), Color::new(255, 128, 0));
        assert_eq!("00ff00".parse::<Color>().unwrap(), Color::new(0, 255, 0));
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#ééé").is_err());
        assert!(Color::from_hex("#+f+f+f").is_err());
        assert!(Color::from_hex("-1ffff").is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Color::new(0, 255, 255) < Color::new(1, 0, 0));
        assert!(Color::new(5, 1, 9) < Color::new(5, 2, 0));
    }

    #[test]
    fn distance_is_squared_euclidean() {
        assert_eq!(Color::BLACK.distance_sq(Color::new(3, 4, 0)), 25);
        assert_eq!(Color::WHITE.distance_sq(Color::WHITE), 0);
    }

    #[test]
    fn float_channels_round_half_up_and_clamp() {
        assert_eq!(Color::from_f64_channels([127.5, -3.0, 300.0]), Color::new(128, 0, 255));
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::new(206, 17, 38)).unwrap();
        assert_eq!(json, "\"#ce1126\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::new(206, 17, 38));
    }

    #[test]
    fn srgb_float_round_trip() {
        let c = Color::new(12, 200, 99);
        let f: Srgb<f32> = c.into();
        assert_eq!(Color::from(f), c);
    }
}
