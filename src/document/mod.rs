//! Documents and data contracts
//!
//! A document is a typed properties mapping owned by an identity; a data
//! contract declares the schemas its documents must satisfy.

mod contract;
#[allow(clippy::module_inception)]
mod document;
mod encoding;
mod errors;
mod factory;
mod identifier;
mod value;

pub use contract::DataContract;
pub use document::{Document, DocumentType};
pub use encoding::{decode_binary_fields, BinaryEncoding};
pub use errors::{DocumentError, DocumentResult};
pub use factory::DocumentFactory;
pub use identifier::Identifier;
pub use value::{Properties, Value};
