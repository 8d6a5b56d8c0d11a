//! Palette registry and per-label colours
//!
//! Loads categorical palettes from palettes.json (embedded at compile time) and
//! assigns one colour per streamgraph label. Colours repeat after exhausting
//! the palette.

use super::error::{Result, StreamError};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Default palette name (colour-blind friendly qualitative scale)
pub const DEFAULT_PALETTE: &str = "Paired";

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a colour by index (wraps around)
    pub fn get_color(&self, index: usize) -> Option<&str> {
        if self.colors.is_empty() {
            return None;
        }
        Some(self.colors[index % self.colors.len()].as_str())
    }

    /// Get the number of colours in this palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    /// Palette names in file order (for listing)
    names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    ///
    /// Colours are normalized to `#RRGGBB`; unparseable entries are dropped.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)?;

        let mut registry = Self::default();

        for mut def in definitions {
            def.colors = def
                .colors
                .iter()
                .filter_map(|hex| parse_hex_color(hex).map(to_hex))
                .collect();
            registry.names.push(def.name.clone());
            registry.palettes.insert(def.name.to_lowercase(), def);
        }

        tracing::debug!("PaletteRegistry: loaded {} palettes", registry.palettes.len());

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Get the default palette
    pub fn default_palette(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_PALETTE)
    }

    /// List all palette names
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Parse a hex colour string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` (without #)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        tracing::warn!("Invalid hex colour length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}

fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Colour of every label, in label order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelColors {
    colors: Vec<(String, String)>,
}

impl LabelColors {
    /// Assign colours to labels
    ///
    /// A custom map must contain exactly the label set. Otherwise colours come
    /// from the named palette, falling back to the default palette when the
    /// name is unknown.
    pub fn resolve(
        labels: &[String],
        custom: Option<&HashMap<String, String>>,
        palette_name: &str,
    ) -> Result<Self> {
        if let Some(custom) = custom {
            let wanted: HashSet<&str> = labels.iter().map(|s| s.as_str()).collect();
            let given: HashSet<&str> = custom.keys().map(|s| s.as_str()).collect();
            if wanted != given {
                let mut missing: Vec<&str> = wanted.difference(&given).copied().collect();
                let mut extra: Vec<&str> = given.difference(&wanted).copied().collect();
                missing.sort_unstable();
                extra.sort_unstable();
                return Err(StreamError::invalid(format!(
                    "colour map must contain colours for all labels and nothing else \
                     (missing: {:?}, unknown: {:?})",
                    missing, extra
                )));
            }
            return Ok(Self {
                colors: labels
                    .iter()
                    .filter_map(|label| {
                        custom
                            .get(label.as_str())
                            .map(|color| (label.clone(), color.clone()))
                    })
                    .collect(),
            });
        }

        let palette = match PALETTE_REGISTRY.get(palette_name) {
            Some(p) if !p.is_empty() => p,
            _ => {
                tracing::warn!(
                    "Unknown palette '{}', using default '{}'",
                    palette_name,
                    DEFAULT_PALETTE
                );
                PALETTE_REGISTRY
                    .default_palette()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| StreamError::invalid("no colour palette available"))?
            }
        };

        if labels.len() > palette.len() {
            tracing::debug!(
                "{} labels exceed the {} colours of palette '{}', colours will repeat",
                labels.len(),
                palette.len(),
                palette.name
            );
        }

        Ok(Self {
            colors: labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let color = palette.get_color(i).unwrap_or("#808080");
                    (label.clone(), color.to_string())
                })
                .collect(),
        })
    }

    /// Colour of one label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_str())
    }

    /// (label, colour) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(l, c)| (l.as_str(), c.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("1F78B4"), Some([31, 120, 180]));
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn test_palette_registry_loads() {
        let registry = &*PALETTE_REGISTRY;
        assert!(registry.names().contains(&"Paired".to_string()));

        let paired = registry.get("paired").unwrap();
        assert_eq!(paired.len(), 10);
        assert_eq!(paired.get_color(1), Some("#1F78B4"));
    }

    #[test]
    fn test_registry_normalizes_colors() {
        let registry =
            PaletteRegistry::from_json(r##"[{"name": "Mini", "colors": ["#ff0000", "00ff00aa", "bad"]}]"##)
                .unwrap();
        let mini = registry.get("MINI").unwrap();
        assert_eq!(mini.colors, vec!["#FF0000", "#00FF00"]);
    }

    #[test]
    fn test_palette_color_wrapping() {
        let colors = LabelColors::resolve(
            &labels(&["a", "b", "c", "d", "e", "f", "g", "h", "i"]),
            None,
            "Set1",
        )
        .unwrap();
        let palette = PALETTE_REGISTRY.get("Set1").unwrap();
        assert_eq!(palette.len(), 9);
        assert_eq!(colors.get("a"), Some("#E41A1C"));
        assert_eq!(colors.get("i"), Some("#999999"));

        let ten = LabelColors::resolve(
            &labels(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]),
            None,
            "Set1",
        )
        .unwrap();
        assert_eq!(ten.get("j"), ten.get("a"));
    }

    #[test]
    fn test_unknown_palette_falls_back_to_default() {
        let colors = LabelColors::resolve(&labels(&["a", "b"]), None, "nope").unwrap();
        assert_eq!(colors.get("b"), Some("#1F78B4"));
    }

    #[test]
    fn test_custom_colors_must_match_labels() {
        let mut custom = HashMap::new();
        custom.insert("a".to_string(), "red".to_string());

        let err = LabelColors::resolve(&labels(&["a", "b"]), Some(&custom), DEFAULT_PALETTE)
            .unwrap_err();
        assert!(matches!(err, StreamError::InvalidInput(_)));
        assert!(err.to_string().contains("missing: [\"b\"]"));

        custom.insert("b".to_string(), "blue".to_string());
        let colors =
            LabelColors::resolve(&labels(&["a", "b"]), Some(&custom), DEFAULT_PALETTE).unwrap();
        let pairs: Vec<(&str, &str)> = colors.iter().collect();
        assert_eq!(pairs, vec![("a", "red"), ("b", "blue")]);
    }
}
