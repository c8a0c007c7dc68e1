//! Schema subsystem errors
//!
//! These are configuration faults, not document violations (those live in
//! [`super::ValidationResult`]).
//!
//! Error codes:
//! - DPNS_SCHEMA_MALFORMED (FATAL)
//! - DPNS_SCHEMA_MISSING (FATAL)
//! - DPNS_UNKNOWN_DOCUMENT_TYPE (REJECT)
//! - DPNS_SCHEMA_IMMUTABLE (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected
    Reject,
    /// Startup must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema definition cannot be parsed or is inconsistent
    DpnsSchemaMalformed,
    /// A document type the protocol needs has no schema
    DpnsSchemaMissing,
    /// Document type not declared by the contract
    DpnsUnknownDocumentType,
    /// Attempt to replace an existing document schema
    DpnsSchemaImmutable,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DpnsSchemaMalformed => "DPNS_SCHEMA_MALFORMED",
            SchemaErrorCode::DpnsSchemaMissing => "DPNS_SCHEMA_MISSING",
            SchemaErrorCode::DpnsUnknownDocumentType => "DPNS_UNKNOWN_DOCUMENT_TYPE",
            SchemaErrorCode::DpnsSchemaImmutable => "DPNS_SCHEMA_IMMUTABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::DpnsSchemaMalformed | SchemaErrorCode::DpnsSchemaMissing => {
                Severity::Fatal
            }
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    document_type: Option<String>,
}

impl SchemaError {
    /// Schema source could not be parsed or failed its structure check
    pub fn malformed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::DpnsSchemaMalformed,
            message: format!("Malformed schema '{}': {}", source.into(), reason.into()),
            document_type: None,
        }
    }

    /// Schema parses but does not declare what the name service rules read
    pub fn incompatible(document_type: impl Into<String>, reason: impl Into<String>) -> Self {
        let doc_type = document_type.into();
        Self {
            code: SchemaErrorCode::DpnsSchemaMalformed,
            message: format!(
                "Schema for document type '{}' is incompatible: {}",
                doc_type,
                reason.into()
            ),
            document_type: Some(doc_type),
        }
    }

    pub fn missing(document_type: impl Into<String>) -> Self {
        let doc_type = document_type.into();
        Self {
            code: SchemaErrorCode::DpnsSchemaMissing,
            message: format!("No schema defined for document type '{}'", doc_type),
            document_type: Some(doc_type),
        }
    }

    pub fn unknown_document_type(document_type: impl Into<String>) -> Self {
        let doc_type = document_type.into();
        Self {
            code: SchemaErrorCode::DpnsUnknownDocumentType,
            message: format!("Document type '{}' not found", doc_type),
            document_type: Some(doc_type),
        }
    }

    pub fn immutable(document_type: impl Into<String>) -> Self {
        let doc_type = document_type.into();
        Self {
            code: SchemaErrorCode::DpnsSchemaImmutable,
            message: format!("Schema for document type '{}' is immutable", doc_type),
            document_type: Some(doc_type),
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn document_type(&self) -> Option<&str> {
        self.document_type.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::DpnsSchemaMalformed.code(), "DPNS_SCHEMA_MALFORMED");
        assert_eq!(SchemaErrorCode::DpnsUnknownDocumentType.code(), "DPNS_UNKNOWN_DOCUMENT_TYPE");
        assert_eq!(SchemaErrorCode::DpnsSchemaImmutable.code(), "DPNS_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_severity_levels() {
        assert!(SchemaError::malformed("<inline>", "bad").is_fatal());
        assert!(SchemaError::missing("domain").is_fatal());
        assert!(SchemaError::incompatible("domain", "'.label' is not declared").is_fatal());
        assert!(!SchemaError::unknown_document_type("profile").is_fatal());
        assert!(!SchemaError::immutable("domain").is_fatal());
    }

    #[test]
    fn test_display_includes_severity_and_code() {
        let err = SchemaError::unknown_document_type("profile");
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] DPNS_UNKNOWN_DOCUMENT_TYPE"));
        assert!(display.contains("profile"));
        assert_eq!(err.document_type(), Some("profile"));
    }
}
