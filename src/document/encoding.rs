//! Transport encoding of binary fields
//!
//! JSON has no binary type, so binary fields travel as base64 or hex text
//! (or as arrays of byte values). Decoding is schema-driven: only fields
//! declared `binary` are touched. Text that does not decode is left as a
//! string and is later reported as a `type` error.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::value::{Properties, Value};
use crate::schema::{FieldSchema, ObjectSchema};

/// Text encoding used for binary fields at the JSON boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryEncoding {
    Base64,
    Hex,
}

impl Default for BinaryEncoding {
    fn default() -> Self {
        Self::Base64
    }
}

impl BinaryEncoding {
    pub fn decode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            BinaryEncoding::Base64 => STANDARD.decode(text).ok(),
            BinaryEncoding::Hex => hex::decode(text).ok(),
        }
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            BinaryEncoding::Base64 => STANDARD.encode(bytes),
            BinaryEncoding::Hex => hex::encode(bytes),
        }
    }
}

/// Replaces encoded binary fields with their raw bytes, following `schema`.
pub fn decode_binary_fields(schema: &ObjectSchema, properties: &mut Properties, encoding: BinaryEncoding) {
    for (name, field) in &schema.properties {
        let Some(value) = properties.get_mut(name) else {
            continue;
        };

        match field {
            FieldSchema::Binary(_) => {
                if let Some(bytes) = decode_value(value, encoding) {
                    *value = Value::Bytes(bytes);
                }
            }
            FieldSchema::Object(nested) => {
                if let Value::Object(obj) = value {
                    decode_binary_fields(nested, obj, encoding);
                }
            }
            _ => {}
        }
    }
}

fn decode_value(value: &Value, encoding: BinaryEncoding) -> Option<Vec<u8>> {
    match value {
        Value::String(text) => encoding.decode(text),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Integer(i) => u8::try_from(*i).ok(),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}
