//! Observable events
//!
//! Events are explicit and typed; each carries its own log severity.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Validator configuration loaded
    ConfigLoaded,
    /// Contract document schemas loaded
    ContractLoaded,
    /// Contract document schemas could not be loaded (FATAL)
    SchemaLoadFailed,

    // Validation
    /// Document passed validation
    DocumentValidated,
    /// Document failed validation
    DocumentRejected,
    /// State repository lookup returned an error
    LookupFailed,
    /// State repository lookup exceeded its timeout
    LookupTimedOut,

    // State transitions
    /// Preorder accepted (name PREORDERED)
    PreorderAccepted,
    /// Preorder consumed by its domain document
    PreorderConsumed,
    /// Domain accepted (name REGISTERED)
    DomainRegistered,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ContractLoaded => "CONTRACT_LOADED",
            Event::SchemaLoadFailed => "SCHEMA_LOAD_FAILED",
            Event::DocumentValidated => "DOCUMENT_VALIDATED",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
            Event::LookupFailed => "LOOKUP_FAILED",
            Event::LookupTimedOut => "LOOKUP_TIMED_OUT",
            Event::PreorderAccepted => "PREORDER_ACCEPTED",
            Event::PreorderConsumed => "PREORDER_CONSUMED",
            Event::DomainRegistered => "DOMAIN_REGISTERED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaLoadFailed => Severity::Fatal,
            Event::LookupFailed | Event::LookupTimedOut => Severity::Warn,
            Event::DocumentValidated => Severity::Trace,
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
