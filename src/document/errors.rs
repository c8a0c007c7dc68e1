//! # Document Errors

use thiserror::Error;

use super::identifier::Identifier;
use crate::schema::SchemaError;
use crate::state::RepositoryError;

/// Result type for document creation
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Failures while building a document from caller input
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    #[error("Data contract not found: {0}")]
    ContractNotFound(Identifier),

    #[error("Identity not found: {0}")]
    IdentityNotFound(Identifier),

    #[error("Document data must be a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
