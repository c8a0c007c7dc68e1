//! Schema validator for document properties
//!
//! Validation semantics, per object at path `p`:
//! 1. `required`: one error per missing key, in declaration order
//! 2. `minProperties` / `maxProperties` over the key count
//! 3. exclusive choices: none present is `minProperties`, several is `maxProperties`
//! 4. `additionalProperties: false`: one error per undeclared key, sorted
//! 5. present declared keys, recursively at `p.key`, in declaration order
//!
//! A value of the wrong type yields one `type` error and is not checked
//! further. Every other violation is reported; the validator never stops
//! at the first error and never mutates its input.

use serde_json::json;

use super::errors::SchemaResult;
use super::loader::SchemaLoader;
use super::result::{Keyword, ValidationError, ValidationResult};
use super::types::{BinaryRules, FieldSchema, IntegerRules, ObjectSchema, StringRules};
use crate::document::{Properties, Value};

/// Validates documents against the schemas of a [`SchemaLoader`].
///
/// Stateless apart from the borrowed registry; safe to share across threads.
pub struct SchemaValidator<'a> {
    loader: &'a SchemaLoader,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(loader: &'a SchemaLoader) -> Self {
        Self { loader }
    }

    /// Validates `properties` against the schema of `document_type`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` (DPNS_UNKNOWN_DOCUMENT_TYPE) if the type is not
    /// declared. Document violations are reported in the `ValidationResult`.
    pub fn validate(&self, document_type: &str, properties: &Properties) -> SchemaResult<ValidationResult> {
        let schema = self.loader.require(document_type)?;
        Ok(validate_properties(schema, properties))
    }
}

/// Validates a properties mapping against a root object schema.
pub fn validate_properties(schema: &ObjectSchema, properties: &Properties) -> ValidationResult {
    let mut result = ValidationResult::new();
    check_object(schema, properties, "", &mut result);
    result
}

fn check_object(schema: &ObjectSchema, obj: &Properties, path: &str, result: &mut ValidationResult) {
    for name in &schema.required {
        if !obj.contains_key(name) {
            result.add_error(ValidationError::required(path, name));
        }
    }

    if let Some(min) = schema.min_properties {
        if obj.len() < min {
            result.add_error(ValidationError::limit(Keyword::MinProperties, path, min));
        }
    }
    if let Some(max) = schema.max_properties {
        if obj.len() > max {
            result.add_error(ValidationError::limit(Keyword::MaxProperties, path, max));
        }
    }

    for group in &schema.exclusive_choices {
        let present = group.iter().filter(|key| obj.contains_key(*key)).count();
        if present == 0 {
            result.add_error(
                ValidationError::limit(Keyword::MinProperties, path, 1).with_param("oneOf", json!(group)),
            );
        } else if present > 1 {
            result.add_error(
                ValidationError::limit(Keyword::MaxProperties, path, 1).with_param("oneOf", json!(group)),
            );
        }
    }

    if !schema.additional_properties {
        // BTreeMap keys are already sorted
        for key in obj.keys() {
            if !schema.properties.contains_key(key) {
                result.add_error(ValidationError::additional_property(path, key));
            }
        }
    }

    for (name, field) in &schema.properties {
        if let Some(value) = obj.get(name) {
            check_value(field, value, &make_path(path, name), result);
        }
    }
}

fn check_value(field: &FieldSchema, value: &Value, path: &str, result: &mut ValidationResult) {
    match (field, value) {
        (FieldSchema::String(rules), Value::String(s)) => check_string(rules, s, path, result),
        (FieldSchema::Binary(rules), Value::Bytes(bytes)) => check_binary(rules, bytes, path, result),
        (FieldSchema::Integer(rules), Value::Integer(i)) => check_integer(rules, *i, path, result),
        (FieldSchema::Boolean, Value::Bool(_)) => {}
        (FieldSchema::Object(nested), Value::Object(obj)) => check_object(nested, obj, path, result),
        (expected, actual) => result.add_error(ValidationError::type_mismatch(
            path,
            expected.type_name(),
            actual.type_name(),
        )),
    }
}

fn check_string(rules: &StringRules, s: &str, path: &str, result: &mut ValidationResult) {
    let len = s.chars().count();

    if let Some(min) = rules.min_length {
        if len < min {
            result.add_error(ValidationError::limit(Keyword::MinLength, path, min));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            result.add_error(ValidationError::limit(Keyword::MaxLength, path, max));
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(s) {
            result.add_error(ValidationError::pattern(path, pattern.as_str()));
        }
    }
}

fn check_binary(rules: &BinaryRules, bytes: &[u8], path: &str, result: &mut ValidationResult) {
    let len = bytes.len();

    if let Some(min) = rules.min_bytes_length {
        if len < min {
            result.add_error(ValidationError::limit(Keyword::MinBytesLength, path, min));
        }
    }
    if let Some(max) = rules.max_bytes_length {
        if len > max {
            result.add_error(ValidationError::limit(Keyword::MaxBytesLength, path, max));
        }
    }
}

fn check_integer(rules: &IntegerRules, value: i64, path: &str, result: &mut ValidationResult) {
    if let Some(min) = rules.minimum {
        if value < min {
            result.add_error(ValidationError::limit(Keyword::Minimum, path, min));
        }
    }
    if let Some(max) = rules.maximum {
        if value > max {
            result.add_error(ValidationError::limit(Keyword::Maximum, path, max));
        }
    }
}

/// `""` + `records` is `.records`; `.records` + `id` is `.records.id`
fn make_path(prefix: &str, field: &str) -> String {
    format!("{}.{}", prefix, field)
}
