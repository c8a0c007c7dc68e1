//! Name service protocol rules
//!
//! Structural validation first; the commit-reveal checks against platform
//! state only run for documents that are structurally valid. Semantic
//! violations are reported in the result like any other error. Lookup
//! failures abort validation with an [`InfrastructureError`].

use crate::config::ValidatorConfig;
use crate::document::{Document, DocumentType, Identifier, Properties};
use crate::observability::{log_event_with_fields, Event, ValidationMetrics};
use crate::schema::{
    validate_properties, FieldSchema, Keyword, ObjectSchema, SchemaError, SchemaLoader,
    SchemaResult, ValidationError, ValidationResult,
};
use crate::state::{InfrastructureError, RepositoryFuture, StateRepository};

use super::contract::{dpns_schemas, fields};
use super::hash::normalize_label;
use super::registration::RevealedDomain;

/// Why a domain document's preorder reference was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreorderRejection {
    NotFound,
    OwnerMismatch,
    AlreadyConsumed,
    /// A preorder with the same hash was already accepted
    AlreadyExists,
    /// The commitment fields could not be read from the document
    Unreadable,
}

impl PreorderRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreorderRejection::NotFound => "notFound",
            PreorderRejection::OwnerMismatch => "ownerMismatch",
            PreorderRejection::AlreadyConsumed => "alreadyConsumed",
            PreorderRejection::AlreadyExists => "alreadyExists",
            PreorderRejection::Unreadable => "unreadable",
        }
    }

    /// The `invalidPreorderReference` error for this rejection
    pub fn error(self, path: &str) -> ValidationError {
        ValidationError::new(Keyword::InvalidPreorderReference, path).with_param("reason", self.as_str())
    }

    /// Same as [`error`](Self::error), naming the salted hash that was looked up
    pub fn to_error(self, path: &str, salted_domain_hash: &[u8; 32]) -> ValidationError {
        self.error(path)
            .with_param("saltedDomainHash", hex::encode(salted_domain_hash))
    }
}

/// Everything a validation call may read besides the document itself
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Identity submitting the document
    pub owner_id: Identifier,
    pub state_repository: &'a dyn StateRepository,
}

impl<'a> ValidationContext<'a> {
    pub fn new(owner_id: Identifier, state_repository: &'a dyn StateRepository) -> Self {
        Self {
            owner_id,
            state_repository,
        }
    }
}

/// Validates preorder and domain documents.
///
/// Holds no per-call state; share one instance across tasks.
#[derive(Debug)]
pub struct DpnsValidator {
    preorder_schema: ObjectSchema,
    domain_schema: ObjectSchema,
    config: ValidatorConfig,
    metrics: ValidationMetrics,
}

impl DpnsValidator {
    /// Validator over the embedded contract definition
    pub fn new(config: ValidatorConfig) -> SchemaResult<Self> {
        let schemas = dpns_schemas().map_err(|err| {
            let message = err.to_string();
            log_event_with_fields(Event::SchemaLoadFailed, &[("error", message.as_str())]);
            err
        })?;
        Self::with_schemas(&schemas, config)
    }

    /// Validator over caller-supplied schemas.
    ///
    /// Both document types must be present and must require every field the
    /// commit-reveal rules read, with the type they read it as.
    pub fn with_schemas(schemas: &SchemaLoader, config: ValidatorConfig) -> SchemaResult<Self> {
        let schema_for = |document_type: DocumentType| -> SchemaResult<ObjectSchema> {
            let schema = schemas
                .get(document_type.as_str())
                .ok_or_else(|| SchemaError::missing(document_type.as_str()))?;
            check_protocol_fields(document_type, schema).map_err(|reason| {
                log_event_with_fields(
                    Event::SchemaLoadFailed,
                    &[("document_type", document_type.as_str()), ("error", reason.as_str())],
                );
                SchemaError::incompatible(document_type.as_str(), reason)
            })?;
            Ok(schema.clone())
        };

        Ok(Self {
            preorder_schema: schema_for(DocumentType::Preorder)?,
            domain_schema: schema_for(DocumentType::Domain)?,
            config,
            metrics: ValidationMetrics::new(),
        })
    }

    /// Skips the protocol field check so tests can feed open schemas
    #[cfg(test)]
    pub(crate) fn with_unchecked_schemas(
        preorder_schema: ObjectSchema,
        domain_schema: ObjectSchema,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            preorder_schema,
            domain_schema,
            config,
            metrics: ValidationMetrics::new(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ValidationMetrics {
        &self.metrics
    }

    /// Structural validation of a preorder. Preorders need no state.
    pub fn validate_preorder(&self, properties: &Properties) -> ValidationResult {
        let result = self.check_preorder(properties);
        self.record(DocumentType::Preorder, &result);
        result
    }

    /// Full validation of a domain document submitted by `owner_id`.
    pub async fn validate_domain(
        &self,
        owner_id: &Identifier,
        properties: &Properties,
        repository: &dyn StateRepository,
    ) -> Result<ValidationResult, InfrastructureError> {
        let result = self.check_domain(owner_id, properties, repository).await?;
        self.record(DocumentType::Domain, &result);
        Ok(result)
    }

    /// `validate_preorder` without metrics or logs; the caller records the
    /// final outcome.
    pub(crate) fn check_preorder(&self, properties: &Properties) -> ValidationResult {
        validate_properties(&self.preorder_schema, properties)
    }

    /// `validate_domain` without metrics or logs
    pub(crate) async fn check_domain(
        &self,
        owner_id: &Identifier,
        properties: &Properties,
        repository: &dyn StateRepository,
    ) -> Result<ValidationResult, InfrastructureError> {
        let mut result = validate_properties(&self.domain_schema, properties);
        if !result.is_valid() {
            return Ok(result);
        }

        match RevealedDomain::from_properties(properties) {
            Some(revealed) => {
                let semantic = self.check_reveal(owner_id, &revealed, repository).await?;
                result.merge(semantic);
            }
            None => result.add_error(PreorderRejection::Unreadable.error("")),
        }
        Ok(result)
    }

    pub async fn validate(
        &self,
        document_type: DocumentType,
        properties: &Properties,
        context: &ValidationContext<'_>,
    ) -> Result<ValidationResult, InfrastructureError> {
        match document_type {
            DocumentType::Preorder => Ok(self.validate_preorder(properties)),
            DocumentType::Domain => {
                self.validate_domain(&context.owner_id, properties, context.state_repository)
                    .await
            }
        }
    }

    pub async fn validate_document(
        &self,
        document: &Document,
        repository: &dyn StateRepository,
    ) -> Result<ValidationResult, InfrastructureError> {
        let context = ValidationContext::new(*document.owner_id(), repository);
        self.validate(document.document_type(), document.properties(), &context)
            .await
    }

    /// Semantic checks of a structurally valid domain document
    async fn check_reveal(
        &self,
        owner_id: &Identifier,
        revealed: &RevealedDomain,
        repository: &dyn StateRepository,
    ) -> Result<ValidationResult, InfrastructureError> {
        let mut result = ValidationResult::new();
        let normalized_label_path = format!(".{}", fields::NORMALIZED_LABEL);

        if self.config.enforce_normalized_label {
            let expected = normalize_label(&revealed.label);
            if revealed.normalized_label != expected {
                result.add_error(
                    ValidationError::new(Keyword::InvalidNormalizedLabel, normalized_label_path.as_str())
                        .with_param("expected", expected)
                        .with_param("actual", revealed.normalized_label.as_str()),
                );
            }
        }

        let expected_hash = revealed.salted_domain_hash();
        let preorder = self
            .lookup("preorder", repository.fetch_preorder_by_hash(&expected_hash))
            .await?;
        let rejection = match preorder {
            None => Some(PreorderRejection::NotFound),
            Some(stored) if stored.owner_id != *owner_id => Some(PreorderRejection::OwnerMismatch),
            Some(stored) if stored.consumed => Some(PreorderRejection::AlreadyConsumed),
            Some(_) => None,
        };
        if let Some(rejection) = rejection {
            let path = format!(".{}", fields::PREORDER_SALT);
            result.add_error(rejection.to_error(&path, &expected_hash));
        }

        let full_name = revealed.full_domain_name();
        if self
            .lookup("domain", repository.fetch_domain(&full_name))
            .await?
            .is_some()
        {
            result.add_error(
                ValidationError::new(Keyword::DomainAlreadyRegistered, normalized_label_path.as_str())
                    .with_param("fullDomainName", full_name.as_str()),
            );
        }

        let parent = revealed.normalized_parent_domain_name.as_str();
        if self.config.enforce_subdomain_rules && !parent.is_empty() {
            let path = format!(".{}", fields::NORMALIZED_PARENT_DOMAIN_NAME);
            match self.lookup("parent domain", repository.fetch_domain(parent)).await? {
                None => result.add_error(
                    ValidationError::new(Keyword::ParentDomainNotFound, path.as_str())
                        .with_param("parentDomainName", parent),
                ),
                // The parent's owner may always create children
                Some(stored) if !stored.allow_subdomains && stored.owner_id != *owner_id => {
                    result.add_error(
                        ValidationError::new(Keyword::SubdomainsNotAllowed, path.as_str())
                            .with_param("parentDomainName", parent),
                    )
                }
                Some(_) => {}
            }
        }

        Ok(result)
    }

    /// Awaits one repository lookup under the configured timeout
    async fn lookup<T>(
        &self,
        lookup: &'static str,
        future: RepositoryFuture<'_, T>,
    ) -> Result<T, InfrastructureError> {
        match tokio::time::timeout(self.config.lookup_timeout(), future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                self.metrics.increment_lookup_failures();
                let message = source.to_string();
                log_event_with_fields(
                    Event::LookupFailed,
                    &[("lookup", lookup), ("error", message.as_str())],
                );
                Err(InfrastructureError::Repository { lookup, source })
            }
            Err(_) => {
                self.metrics.increment_lookup_timeouts();
                let timeout_ms = self.config.lookup_timeout_ms.to_string();
                log_event_with_fields(
                    Event::LookupTimedOut,
                    &[("lookup", lookup), ("timeout_ms", timeout_ms.as_str())],
                );
                Err(InfrastructureError::LookupTimeout {
                    lookup,
                    timeout_ms: self.config.lookup_timeout_ms,
                })
            }
        }
    }

    /// Counts and logs one final validation outcome
    pub(crate) fn record(&self, document_type: DocumentType, result: &ValidationResult) {
        if result.is_valid() {
            self.metrics.increment_documents_validated();
            log_event_with_fields(
                Event::DocumentValidated,
                &[("document_type", document_type.as_str())],
            );
            return;
        }

        self.metrics.increment_documents_rejected();
        if result.has_semantic_errors() {
            self.metrics.increment_semantic_rejections();
        }

        let error_count = result.errors().len().to_string();
        let first = result
            .errors()
            .first()
            .map(|e| e.keyword.as_str())
            .unwrap_or_default();
        log_event_with_fields(
            Event::DocumentRejected,
            &[
                ("document_type", document_type.as_str()),
                ("error_count", error_count.as_str()),
                ("first_keyword", first),
            ],
        );
    }
}

/// Checks that `schema` requires every field the rules read for
/// `document_type`, typed the way they read it.
fn check_protocol_fields(document_type: DocumentType, schema: &ObjectSchema) -> Result<(), String> {
    match document_type {
        DocumentType::Preorder => {
            let hash = required_field(schema, "", fields::SALTED_DOMAIN_HASH)?;
            require_identifier_bytes(hash, &format!(".{}", fields::SALTED_DOMAIN_HASH))
        }
        DocumentType::Domain => check_domain_fields(schema),
    }
}

fn check_domain_fields(schema: &ObjectSchema) -> Result<(), String> {
    for name in [
        fields::LABEL,
        fields::NORMALIZED_LABEL,
        fields::NORMALIZED_PARENT_DOMAIN_NAME,
    ] {
        if !matches!(required_field(schema, "", name)?, FieldSchema::String(_)) {
            return Err(format!("'.{}' must be a string", name));
        }
    }

    let salt = required_field(schema, "", fields::PREORDER_SALT)?;
    require_identifier_bytes(salt, &format!(".{}", fields::PREORDER_SALT))?;

    let records_path = format!(".{}", fields::RECORDS);
    let FieldSchema::Object(records) = required_field(schema, "", fields::RECORDS)? else {
        return Err(format!("'{}' must be an object", records_path));
    };
    let identities = [fields::DASH_UNIQUE_IDENTITY_ID, fields::DASH_ALIAS_IDENTITY_ID];
    for name in identities {
        let path = format!("{}.{}", records_path, name);
        let field = records
            .properties
            .get(name)
            .ok_or_else(|| format!("'{}' is not declared", path))?;
        require_identifier_bytes(field, &path)?;
    }
    let one_identity = records.exclusive_choices.iter().any(|group| {
        group.len() == identities.len() && identities.iter().all(|name| group.iter().any(|k| k == name))
    });
    if !one_identity {
        return Err(format!(
            "'{}' must hold exactly one of {} and {}",
            records_path, identities[0], identities[1]
        ));
    }

    let rules_path = format!(".{}", fields::SUBDOMAIN_RULES);
    let FieldSchema::Object(rules) = required_field(schema, "", fields::SUBDOMAIN_RULES)? else {
        return Err(format!("'{}' must be an object", rules_path));
    };
    if !matches!(
        required_field(rules, &rules_path, fields::ALLOW_SUBDOMAINS)?,
        FieldSchema::Boolean
    ) {
        return Err(format!("'{}.{}' must be a boolean", rules_path, fields::ALLOW_SUBDOMAINS));
    }

    Ok(())
}

fn required_field<'s>(schema: &'s ObjectSchema, path: &str, name: &str) -> Result<&'s FieldSchema, String> {
    let field = schema
        .properties
        .get(name)
        .ok_or_else(|| format!("'{}.{}' is not declared", path, name))?;
    if !schema.required.iter().any(|required| required == name) {
        return Err(format!("'{}.{}' must be required", path, name));
    }
    Ok(field)
}

fn require_identifier_bytes(field: &FieldSchema, path: &str) -> Result<(), String> {
    match field {
        FieldSchema::Binary(rules)
            if rules.min_bytes_length == Some(Identifier::LENGTH)
                && rules.max_bytes_length == Some(Identifier::LENGTH) =>
        {
            Ok(())
        }
        _ => Err(format!("'{}' must be binary of exactly {} bytes", path, Identifier::LENGTH)),
    }
}
