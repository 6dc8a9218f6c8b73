//! Element descriptions and property values.

use serde::{Deserialize, Serialize};

/// Property value that can be various types.
///
/// Strings are parsed against the target property's type, so enum nicks
/// (`"smpte"`), caps strings and flags can all be given as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl PropertyValue {
    /// Short name of the value's variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Int(_) => "integer",
            PropertyValue::UInt(_) => "unsigned integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Bool(_) => "boolean",
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int(i64::from(i))
    }
}

impl From<u64> for PropertyValue {
    fn from(u: u64) -> Self {
        PropertyValue::UInt(u)
    }
}

impl From<u32> for PropertyValue {
    fn from(u: u32) -> Self {
        PropertyValue::UInt(u64::from(u))
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Declarative description of an element to create.
///
/// Properties keep their insertion order and are applied in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// GStreamer factory name (e.g., "videotestsrc", "tee")
    pub kind: String,
    /// Element name; GStreamer picks `<kind><n>` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Properties as ordered name/value pairs
    #[serde(default)]
    pub properties: Vec<(String, PropertyValue)>,
}

impl ElementSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            properties: Vec::new(),
        }
    }

    /// Set the element name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a property. A later value for the same name wins when applied.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_property_order() {
        let spec = ElementSpec::new("videotestsrc")
            .property("is-live", true)
            .property("pattern", "ball")
            .property("background-color", 0xFF00FF00u32)
            .name("surface");

        assert_eq!(spec.kind, "videotestsrc");
        assert_eq!(spec.name.as_deref(), Some("surface"));
        let names: Vec<&str> = spec.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["is-live", "pattern", "background-color"]);
        assert_eq!(spec.properties[2].1, PropertyValue::UInt(0xFF00FF00));
    }

    #[test]
    fn test_property_value_untagged_json() {
        let values: Vec<PropertyValue> =
            serde_json::from_str(r#"["smpte", -3, 15, 0.5, true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                PropertyValue::String("smpte".to_string()),
                PropertyValue::Int(-3),
                // Untagged: non-negative integers match `Int` first.
                PropertyValue::Int(15),
                PropertyValue::Float(0.5),
                PropertyValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_spec_from_json_without_name() {
        let spec: ElementSpec = serde_json::from_str(
            r#"{"kind": "tee", "properties": [["allow-not-linked", true]]}"#,
        )
        .unwrap();
        assert_eq!(spec, ElementSpec::new("tee").property("allow-not-linked", true));
    }
}
