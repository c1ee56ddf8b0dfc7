//! The flag corpus: known countries and the palettes extracted from their
//! flags.
//!
//! A corpus serializes to the same JSON document the palette exporter writes:
//!
//! ```json
//! {
//!   "France": {
//!     "colors": ["#ffffff", "#ce1126", "#002654"],
//!     "proportions": [0.34, 0.33, 0.33]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{ColorError, Result};
use crate::extract::{ClusterResult, ColorShare};

/// ISO 3166-1 alpha-2 code and display name of every flag in the corpus.
const COUNTRIES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("GB", "United Kingdom"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("JP", "Japan"),
    ("BR", "Brazil"),
    ("IN", "India"),
    ("CN", "China"),
    ("RU", "Russia"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("MX", "Mexico"),
    ("ZA", "South Africa"),
    ("KR", "South Korea"),
    ("NG", "Nigeria"),
    ("EG", "Egypt"),
    ("SA", "Saudi Arabia"),
    ("AR", "Argentina"),
    ("TR", "Turkey"),
    ("NL", "Netherlands"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
    ("NO", "Norway"),
    ("FI", "Finland"),
    ("DK", "Denmark"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("GR", "Greece"),
    ("BE", "Belgium"),
    ("AT", "Austria"),
    ("TH", "Thailand"),
    ("VN", "Vietnam"),
    ("MY", "Malaysia"),
    ("PH", "Philippines"),
    ("SG", "Singapore"),
    ("NZ", "New Zealand"),
    ("ID", "Indonesia"),
    ("IR", "Iran"),
    ("PK", "Pakistan"),
    ("BD", "Bangladesh"),
    ("UA", "Ukraine"),
    ("IL", "Israel"),
    ("KE", "Kenya"),
    ("GH", "Ghana"),
    ("TZ", "Tanzania"),
    ("CO", "Colombia"),
    ("VE", "Venezuela"),
    ("CL", "Chile"),
    ("PE", "Peru"),
    ("CZ", "Czech Republic"),
    ("HU", "Hungary"),
    ("RO", "Romania"),
    ("SK", "Slovakia"),
    ("BG", "Bulgaria"),
    ("AE", "United Arab Emirates"),
    ("QA", "Qatar"),
    ("KW", "Kuwait"),
    ("OM", "Oman"),
    ("BH", "Bahrain"),
    ("LK", "Sri Lanka"),
    ("MM", "Myanmar"),
    ("KH", "Cambodia"),
    ("LA", "Laos"),
    ("NP", "Nepal"),
    ("ZW", "Zimbabwe"),
    ("ZM", "Zambia"),
    ("MW", "Malawi"),
    ("UG", "Uganda"),
    ("SD", "Sudan"),
    ("DZ", "Algeria"),
    ("MA", "Morocco"),
    ("TN", "Tunisia"),
    ("ET", "Ethiopia"),
    ("SN", "Senegal"),
    ("CI", "Ivory Coast"),
    ("ML", "Mali"),
    ("BF", "Burkina Faso"),
    ("SL", "Sierra Leone"),
    ("GM", "Gambia"),
    ("LR", "Liberia"),
    ("CM", "Cameroon"),
    ("CD", "Democratic Republic of Congo"),
    ("AO", "Angola"),
    ("MZ", "Mozambique"),
    ("BW", "Botswana"),
    ("NA", "Namibia"),
    ("SZ", "Eswatini"),
    ("LS", "Lesotho"),
    ("BJ", "Benin"),
    ("TG", "Togo"),
    ("GA", "Gabon"),
    ("GN", "Guinea"),
    ("TD", "Chad"),
    ("NE", "Niger"),
    ("ER", "Eritrea"),
    ("SO", "Somalia"),
    ("CF", "Central African Republic"),
    ("RW", "Rwanda"),
    ("BI", "Burundi"),
    ("MQ", "Martinique"),
    ("GP", "Guadeloupe"),
    ("RE", "Réunion"),
];

pub fn countries() -> &'static [(&'static str, &'static str)] {
    COUNTRIES
}

/// Look up a country name by its two letter code, ignoring case.
pub fn country_name(code: &str) -> Option<&'static str> {
    COUNTRIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|&(_, name)| name)
}

/// Countries whose name contains `term`, ignoring case. An empty term
/// matches everything.
pub fn search_countries(term: &str) -> Vec<(&'static str, &'static str)> {
    let term = term.to_lowercase();
    COUNTRIES
        .iter()
        .filter(|(_, name)| name.to_lowercase().contains(&term))
        .copied()
        .collect()
}

/// Colors of one flag with their proportions, in extraction order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagPalette {
    pub colors: Vec<Color>,
    pub proportions: Vec<f64>,
}

impl FlagPalette {
    pub fn from_result(result: &ClusterResult) -> Self {
        Self {
            colors: result.colors(),
            proportions: result.proportions(),
        }
    }

    pub fn shares(&self) -> Result<Vec<ColorShare>> {
        if self.colors.len() != self.proportions.len() {
            return Err(ColorError::invalid(
                "palette",
                format!(
                    "{} colors but {} proportions",
                    self.colors.len(),
                    self.proportions.len()
                ),
            ));
        }
        Ok(self
            .colors
            .iter()
            .zip(&self.proportions)
            .map(|(&color, &proportion)| ColorShare { color, proportion })
            .collect())
    }

    /// Blend weighted by the stored proportions.
    pub fn weighted_mix(&self) -> Result<Color> {
        self.shares()?;
        crate::mix::mix(&self.colors, Some(&self.proportions))
    }

    pub fn equal_mix(&self) -> Result<Color> {
        crate::mix::equal_mix(&self.colors)
    }
}

/// Palettes keyed by country name, in name order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    palettes: BTreeMap<String, FlagPalette>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, country: impl Into<String>, palette: FlagPalette) -> Option<FlagPalette> {
        self.palettes.insert(country.into(), palette)
    }

    pub fn insert_result(&mut self, country: impl Into<String>, result: &ClusterResult) {
        self.insert(country, FlagPalette::from_result(result));
    }

    pub fn get(&self, country: &str) -> Option<&FlagPalette> {
        self.palettes.get(country)
    }

    pub fn remove(&mut self, country: &str) -> Option<FlagPalette> {
        self.palettes.remove(country)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagPalette)> {
        self.palettes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn france() -> FlagPalette {
        FlagPalette {
            colors: vec![
                Color::new(255, 255, 255),
                Color::new(206, 17, 38),
                Color::new(0, 38, 84),
            ],
            proportions: vec![0.34, 0.33, 0.33],
        }
    }

    #[test]
    fn country_lookup_ignores_case() {
        assert_eq!(country_name("fr"), Some("France"));
        assert_eq!(country_name("JP"), Some("Japan"));
        assert_eq!(country_name("XX"), None);
    }

    #[test]
    fn search_matches_substrings() {
        let hits: Vec<&str> = search_countries("guinea").into_iter().map(|(c, _)| c).collect();
        assert_eq!(hits, vec!["GN"]);
        assert_eq!(search_countries("").len(), countries().len());
    }

    #[test]
    fn country_codes_are_unique() {
        let mut codes: Vec<&str> = countries().iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), countries().len());
    }

    #[test]
    fn json_layout_uses_lowercase_hex() {
        let mut corpus = Corpus::new();
        corpus.insert("France", france());
        let json = corpus.to_json_pretty().unwrap();
        assert!(json.contains("\"#ce1126\""));
        assert!(json.starts_with("{\n  \"France\": {"));
        let back = Corpus::from_json(&json).unwrap();
        assert_eq!(back, corpus);
    }

    #[test]
    fn reads_exported_documents() {
        let json = r##"{"Japan": {"colors": ["#FFFFFF", "#bc002d"], "proportions": [0.8, 0.2]}}"##;
        let corpus = Corpus::from_json(json).unwrap();
        let japan = corpus.get("Japan").unwrap();
        assert_eq!(japan.colors[0], Color::WHITE);
        assert_eq!(japan.weighted_mix().unwrap(), Color::new(242, 204, 213));
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(matches!(
            Corpus::from_json(r#"{"X": {"colors": ["red"], "proportions": [1.0]}}"#),
            Err(ColorError::Json(_))
        ));
        let lopsided = FlagPalette {
            colors: vec![Color::BLACK],
            proportions: vec![0.5, 0.5],
        };
        assert!(lopsided.shares().is_err());
        assert!(lopsided.weighted_mix().is_err());
    }
}
