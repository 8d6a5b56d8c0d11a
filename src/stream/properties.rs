//! Property definitions with defaults from stream.json
//!
//! stream.json is embedded at compile time and holds every configurable
//! property with its kind, default value and, for enumerations, the accepted
//! values. Defaults live in that one file; readers never hardcode fallbacks.

use super::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// stream.json embedded at compile time
const STREAM_JSON: &str = include_str!("../../stream.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
    #[serde(rename = "BooleanProperty")]
    Boolean,
    #[serde(rename = "DoubleProperty")]
    Double,
}

/// Property definition from stream.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// Accepted values of an enumerated property
    #[serde(rename = "values")]
    pub valid_values: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct PropertyFile {
    properties: Vec<PropertyDef>,
}

/// All known properties, keyed by name
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a property file
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PropertyFile = serde_json::from_str(json)?;
        let properties = file
            .properties
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Ok(Self { properties })
    }

    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check a value against an enumerated property (case-insensitive)
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true)
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Global registry parsed from the embedded stream.json
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(STREAM_JSON).unwrap_or_else(|e| {
            tracing::error!("Failed to load stream.json: {}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader over user-set string values
///
/// Empty user values count as unset. Invalid values are logged and replaced by
/// the default from stream.json.
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(values: &HashMap<String, String>) -> Self {
        let user_values = values
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();
        Self { user_values }
    }

    /// User value, or the default
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Enumerated value, validated against the accepted values
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.clone();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Boolean value: true/false, yes/no, 1/0
    pub fn get_bool(&self, name: &str) -> bool {
        let default = parse_bool(registry().get_default(name).unwrap_or("")).unwrap_or(false);

        match self.user_values.get(name) {
            None => default,
            Some(value) => parse_bool(value).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid boolean value '{}' for property '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }),
        }
    }

    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        self.get_optional_f64(name).unwrap_or(default)
    }

    /// Numeric value, None when neither user value nor default is set
    pub fn get_optional_f64(&self, name: &str) -> Option<f64> {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok());

        match self.user_values.get(name) {
            None => default,
            Some(value) => match value.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(
                        "Invalid numeric value '{}' for property '{}'. Using default: {:?}",
                        value,
                        name,
                        default
                    );
                    default
                }
            },
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
