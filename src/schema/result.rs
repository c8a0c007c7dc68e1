//! Validation results
//!
//! Document violations are ordinary values: they are collected into a
//! [`ValidationResult`] and never raised as errors.

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Whether a violation concerns document shape or cross-document state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Structural,
    Semantic,
}

/// The rule a validation error violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Required,
    Type,
    Pattern,
    MinLength,
    MaxLength,
    MinBytesLength,
    MaxBytesLength,
    Minimum,
    Maximum,
    MinProperties,
    MaxProperties,
    AdditionalProperties,

    /// No matching, owned, unconsumed preorder for the revealed name
    InvalidPreorderReference,
    /// `normalizedLabel` is not the lower-cased `label`
    InvalidNormalizedLabel,
    /// The full domain name is already registered
    DomainAlreadyRegistered,
    /// The parent domain does not exist
    ParentDomainNotFound,
    /// The parent domain does not allow subdomains
    SubdomainsNotAllowed,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Required => "required",
            Keyword::Type => "type",
            Keyword::Pattern => "pattern",
            Keyword::MinLength => "minLength",
            Keyword::MaxLength => "maxLength",
            Keyword::MinBytesLength => "minBytesLength",
            Keyword::MaxBytesLength => "maxBytesLength",
            Keyword::Minimum => "minimum",
            Keyword::Maximum => "maximum",
            Keyword::MinProperties => "minProperties",
            Keyword::MaxProperties => "maxProperties",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::InvalidPreorderReference => "invalidPreorderReference",
            Keyword::InvalidNormalizedLabel => "invalidNormalizedLabel",
            Keyword::DomainAlreadyRegistered => "domainAlreadyRegistered",
            Keyword::ParentDomainNotFound => "parentDomainNotFound",
            Keyword::SubdomainsNotAllowed => "subdomainsNotAllowed",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Keyword::InvalidPreorderReference
            | Keyword::InvalidNormalizedLabel
            | Keyword::DomainAlreadyRegistered
            | Keyword::ParentDomainNotFound
            | Keyword::SubdomainsNotAllowed => ErrorCategory::Semantic,
            _ => ErrorCategory::Structural,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single, precisely attributed violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub keyword: Keyword,
    /// Dot-delimited location, `""` for the document root
    pub path: String,
    pub params: BTreeMap<String, JsonValue>,
}

impl ValidationError {
    pub fn new(keyword: Keyword, path: impl Into<String>) -> Self {
        Self {
            keyword,
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a rule-specific parameter
    pub fn with_param(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn required(path: &str, missing: &str) -> Self {
        Self::new(Keyword::Required, path).with_param("missingProperty", missing)
    }

    pub fn additional_property(path: &str, key: &str) -> Self {
        Self::new(Keyword::AdditionalProperties, path).with_param("additionalProperty", key)
    }

    pub fn type_mismatch(path: &str, expected: &str, actual: &str) -> Self {
        Self::new(Keyword::Type, path)
            .with_param("type", expected)
            .with_param("actual", actual)
    }

    /// Bound violation (`minLength`, `maxBytesLength`, `minProperties`, ...)
    pub fn limit(keyword: Keyword, path: &str, limit: impl Into<JsonValue>) -> Self {
        Self::new(keyword, path).with_param("limit", limit)
    }

    pub fn pattern(path: &str, pattern: &str) -> Self {
        Self::new(Keyword::Pattern, path).with_param("pattern", pattern)
    }

    pub fn category(&self) -> ErrorCategory {
        self.keyword.category()
    }

    /// Returns a string parameter, if present
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|v| v.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(f, "{}: {}", path, self.keyword)?;
        if !self.params.is_empty() {
            write!(f, " {}", json!(self.params))?;
        }
        Ok(())
    }
}

/// Outcome of validating one document: valid, or an ordered error list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Errors with the given keyword, in report order
    pub fn errors_with(&self, keyword: Keyword) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.keyword == keyword)
    }

    pub fn has_semantic_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.category() == ErrorCategory::Semantic)
    }

    /// `{ "isValid": bool, "errors": [...] }`
    pub fn to_json(&self) -> JsonValue {
        json!({
            "isValid": self.is_valid(),
            "errors": self.errors,
        })
    }
}

impl From<Vec<ValidationError>> for ValidationResult {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_names() {
        assert_eq!(Keyword::MinBytesLength.as_str(), "minBytesLength");
        assert_eq!(Keyword::AdditionalProperties.as_str(), "additionalProperties");
        assert_eq!(
            serde_json::to_value(Keyword::InvalidPreorderReference).unwrap(),
            json!("invalidPreorderReference")
        );
    }

    #[test]
    fn test_categories_are_disjoint() {
        assert_eq!(Keyword::Required.category(), ErrorCategory::Structural);
        assert_eq!(Keyword::MaxProperties.category(), ErrorCategory::Structural);
        assert_eq!(Keyword::InvalidPreorderReference.category(), ErrorCategory::Semantic);
    }

    #[test]
    fn test_result_json_shape() {
        let mut result = ValidationResult::new();
        assert_eq!(result.to_json()["isValid"], json!(true));

        result.add_error(ValidationError::required("", "label"));
        let out = result.to_json();
        assert_eq!(out["isValid"], json!(false));
        assert_eq!(out["errors"][0]["keyword"], json!("required"));
        assert_eq!(out["errors"][0]["params"]["missingProperty"], json!("label"));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::additional_property(".records", "extra");
        let display = err.to_string();
        assert!(display.starts_with(".records: additionalProperties"));
        assert!(display.contains("extra"));
        assert!(ValidationError::required("", "x").to_string().starts_with("<root>"));
    }
}
