//! Declarative schema rules
//!
//! Schemas are data: a tagged enum of constraint kinds, deserialized from
//! contract JSON and walked by the single evaluator in `validator.rs`.
//!
//! Supported field types:
//! - string: UTF-8 string (`pattern`, `minLength`, `maxLength`)
//! - binary: raw bytes (`minBytesLength`, `maxBytesLength`)
//! - integer: 64-bit signed integer (`minimum`, `maximum`)
//! - boolean
//! - object: nested properties with their own object-level rules

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A compiled string pattern.
///
/// Compiled while the schema is deserialized, so an invalid expression
/// fails schema loading rather than document validation.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.0.is_match(s)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source)
            .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{}': {}", source, e)))
    }
}

/// String constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

/// Binary constraints, measured on the decoded byte length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bytes_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes_length: Option<usize>,
}

impl BinaryRules {
    /// Binary field of exactly `len` bytes
    pub fn exact(len: usize) -> Self {
        Self {
            description: None,
            min_bytes_length: Some(len),
            max_bytes_length: Some(len),
        }
    }
}

/// Integer constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegerRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

/// Schema of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldSchema {
    String(StringRules),
    Binary(BinaryRules),
    Integer(IntegerRules),
    Boolean,
    Object(ObjectSchema),
}

impl FieldSchema {
    /// Returns the type name used in `type` errors
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldSchema::String(_) => "string",
            FieldSchema::Binary(_) => "binary",
            FieldSchema::Integer(_) => "integer",
            FieldSchema::Boolean => "boolean",
            FieldSchema::Object(_) => "object",
        }
    }
}

fn default_additional_properties() -> bool {
    true
}

/// Object-level rules. Also the root schema of every document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared properties, in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, FieldSchema>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default = "default_additional_properties")]
    pub additional_properties: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<usize>,
    /// Groups of keys of which exactly one must be present
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusive_choices: Vec<Vec<String>>,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            description: None,
            properties: IndexMap::new(),
            required: Vec::new(),
            additional_properties: true,
            min_properties: None,
            max_properties: None,
            exclusive_choices: Vec::new(),
        }
    }
}

impl ObjectSchema {
    /// Closed object: undeclared keys are rejected
    pub fn closed() -> Self {
        Self {
            additional_properties: false,
            ..Self::default()
        }
    }

    /// Declares a property
    pub fn property(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Declares a required property
    pub fn required_property(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, schema);
        self
    }

    /// Adds an exactly-one-of group over already declared keys
    pub fn exclusive_choice<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_choices
            .push(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Checks the schema definition itself (not a document).
    ///
    /// `path` is the location of this object inside the document schema,
    /// used only to make the returned message precise.
    pub fn validate_structure(&self, path: &str) -> Result<(), String> {
        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(format!(
                    "required property '{}' is not declared at '{}'",
                    name, path
                ));
            }
        }

        check_bounds(path, "minProperties", self.min_properties, self.max_properties)?;

        for group in &self.exclusive_choices {
            if group.len() < 2 {
                return Err(format!(
                    "exclusive choice at '{}' needs at least two keys",
                    path
                ));
            }
            for key in group {
                if !self.properties.contains_key(key) {
                    return Err(format!(
                        "exclusive choice key '{}' is not declared at '{}'",
                        key, path
                    ));
                }
                if self.required.contains(key) {
                    return Err(format!(
                        "exclusive choice key '{}' cannot be required at '{}'",
                        key, path
                    ));
                }
            }
        }

        for (name, field) in &self.properties {
            let field_path = format!("{}.{}", path, name);
            match field {
                FieldSchema::String(rules) => {
                    check_bounds(&field_path, "minLength", rules.min_length, rules.max_length)?
                }
                FieldSchema::Binary(rules) => check_bounds(
                    &field_path,
                    "minBytesLength",
                    rules.min_bytes_length,
                    rules.max_bytes_length,
                )?,
                FieldSchema::Integer(rules) => {
                    if let (Some(min), Some(max)) = (rules.minimum, rules.maximum) {
                        if min > max {
                            return Err(format!(
                                "minimum {} exceeds maximum {} at '{}'",
                                min, max, field_path
                            ));
                        }
                    }
                }
                FieldSchema::Boolean => {}
                FieldSchema::Object(nested) => nested.validate_structure(&field_path)?,
            }
        }

        Ok(())
    }
}

fn check_bounds(
    path: &str,
    keyword: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), String> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(format!(
            "{} {} exceeds its upper bound {} at '{}'",
            keyword, min, max, path
        )),
        _ => Ok(()),
    }
}
