//! Schema Validator subsystem
//!
//! A generic engine that checks a document's properties against a
//! declarative schema for its document type.
//!
//! # Design Principles
//!
//! - Schemas are data (a tagged rule enum), interpreted by one evaluator
//! - Malformed schemas fail at load time (FATAL)
//! - Malformed documents are reported as values, never raised
//! - All violations are reported, in a deterministic order
//! - Binary bounds apply to decoded bytes, not transport text

mod errors;
mod loader;
mod result;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::SchemaLoader;
pub use result::{ErrorCategory, Keyword, ValidationError, ValidationResult};
pub use types::{BinaryRules, FieldSchema, IntegerRules, ObjectSchema, Pattern, StringRules};
pub use validator::{validate_properties, SchemaValidator};
