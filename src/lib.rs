//! dpns - Validation core of a decentralized name service
//!
//! A declarative schema engine plus the commit-reveal rules that link a
//! domain document to the preorder it reveals.

pub mod config;
pub mod crypto;
pub mod document;
pub mod dpns;
pub mod observability;
pub mod schema;
pub mod state;

pub use config::ValidatorConfig;
pub use document::{Document, DocumentType, Identifier, Properties, Value};
pub use dpns::{DpnsValidator, ValidationContext};
pub use schema::{Keyword, ValidationError, ValidationResult};
pub use state::{InfrastructureError, StateRepository};
