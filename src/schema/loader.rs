//! Schema loader for contract document definitions
//!
//! A contract's documents definition is a JSON object mapping each document
//! type to its root object schema:
//!
//! ```json
//! { "preorder": { "properties": { ... }, "required": [...], "additionalProperties": false } }
//! ```
//!
//! Malformed definitions are FATAL: they are caught here, at startup, and
//! never surface during document validation.

use indexmap::IndexMap;
use std::fs;
use std::path::Path;

use super::errors::{SchemaError, SchemaResult};
use super::types::ObjectSchema;

/// In-memory registry of document schemas keyed by document type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaLoader {
    schemas: IndexMap<String, ObjectSchema>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a documents definition held in memory.
    pub fn from_json_str(source: &str) -> SchemaResult<Self> {
        let mut loader = Self::new();
        loader.load_str("<inline>", source)?;
        Ok(loader)
    }

    /// Loads a documents definition file and registers every type in it.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        self.load_str(&path.display().to_string(), &content)
    }

    fn load_str(&mut self, origin: &str, content: &str) -> SchemaResult<()> {
        let documents: IndexMap<String, ObjectSchema> = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(origin, format!("Invalid JSON: {}", e)))?;

        for (document_type, schema) in documents {
            self.insert(origin, document_type, schema)?;
        }

        Ok(())
    }

    /// Registers a schema built in code.
    pub fn register(&mut self, document_type: impl Into<String>, schema: ObjectSchema) -> SchemaResult<()> {
        self.insert("<in-memory>", document_type.into(), schema)
    }

    fn insert(&mut self, origin: &str, document_type: String, schema: ObjectSchema) -> SchemaResult<()> {
        schema
            .validate_structure("")
            .map_err(|e| SchemaError::malformed(origin, format!("document type '{}': {}", document_type, e)))?;

        if self.schemas.contains_key(&document_type) {
            return Err(SchemaError::immutable(document_type));
        }

        self.schemas.insert(document_type, schema);
        Ok(())
    }

    pub fn get(&self, document_type: &str) -> Option<&ObjectSchema> {
        self.schemas.get(document_type)
    }

    /// Like [`get`](Self::get), but an unknown type is a REJECT error.
    pub fn require(&self, document_type: &str) -> SchemaResult<&ObjectSchema> {
        self.get(document_type)
            .ok_or_else(|| SchemaError::unknown_document_type(document_type))
    }

    pub fn exists(&self, document_type: &str) -> bool {
        self.schemas.contains_key(document_type)
    }

    /// Declared document types, in definition order
    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Serializes the documents definition back to JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.schemas).unwrap_or(serde_json::Value::Null)
    }
}
