//! In-memory state repository
//!
//! Reference implementation of [`StateRepository`] that also applies
//! accepted documents. A domain document consumes its preorder under the
//! same write locks that insert the domain, so a preorder is consumed at
//! most once even when two reveals race.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use super::errors::{InfrastructureError, RepositoryError, RepositoryResult};
use super::repository::{Identity, RepositoryFuture, StateRepository, StoredDomain, StoredPreorder};
use crate::document::{DataContract, Document, DocumentType, Identifier, Properties, Value};
use crate::dpns::{fields, DpnsValidator, PreorderRejection, RevealedDomain};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{Keyword, ValidationError, ValidationResult};

fn lock_poisoned() -> RepositoryError {
    RepositoryError::Internal("Lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryStateRepository {
    preorders: RwLock<HashMap<[u8; 32], StoredPreorder>>,
    /// Keyed by normalized full domain name
    domains: RwLock<HashMap<String, StoredDomain>>,
    identities: RwLock<HashMap<Identifier, Identity>>,
    contracts: RwLock<HashMap<Identifier, DataContract>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_preorder(&self, preorder: StoredPreorder) -> RepositoryResult<()> {
        let mut preorders = self.preorders.write().map_err(|_| lock_poisoned())?;
        if preorders.contains_key(&preorder.salted_domain_hash) {
            return Err(RepositoryError::Duplicate(hex::encode(preorder.salted_domain_hash)));
        }
        preorders.insert(preorder.salted_domain_hash, preorder);
        Ok(())
    }

    pub fn insert_domain(&self, domain: StoredDomain) -> RepositoryResult<()> {
        let mut domains = self.domains.write().map_err(|_| lock_poisoned())?;
        let name = domain.full_domain_name();
        if domains.contains_key(&name) {
            return Err(RepositoryError::Duplicate(name));
        }
        domains.insert(name, domain);
        Ok(())
    }

    pub fn insert_identity(&self, identity: Identity) -> RepositoryResult<()> {
        let mut identities = self.identities.write().map_err(|_| lock_poisoned())?;
        identities.insert(identity.id, identity);
        Ok(())
    }

    pub fn insert_contract(&self, contract: DataContract) -> RepositoryResult<()> {
        let mut contracts = self.contracts.write().map_err(|_| lock_poisoned())?;
        contracts.insert(*contract.id(), contract);
        Ok(())
    }

    pub fn preorder(&self, salted_domain_hash: &[u8; 32]) -> RepositoryResult<Option<StoredPreorder>> {
        let preorders = self.preorders.read().map_err(|_| lock_poisoned())?;
        Ok(preorders.get(salted_domain_hash).cloned())
    }

    pub fn domain(&self, full_domain_name: &str) -> RepositoryResult<Option<StoredDomain>> {
        let domains = self.domains.read().map_err(|_| lock_poisoned())?;
        Ok(domains.get(full_domain_name).cloned())
    }

    pub fn preorder_count(&self) -> RepositoryResult<usize> {
        Ok(self.preorders.read().map_err(|_| lock_poisoned())?.len())
    }

    pub fn domain_count(&self) -> RepositoryResult<usize> {
        Ok(self.domains.read().map_err(|_| lock_poisoned())?.len())
    }

    /// Validates and applies a document of either type.
    pub async fn apply_document(
        &self,
        validator: &DpnsValidator,
        document: &Document,
    ) -> Result<ValidationResult, InfrastructureError> {
        match document.document_type() {
            DocumentType::Preorder => {
                self.apply_preorder(validator, document.owner_id(), document.properties())
            }
            DocumentType::Domain => {
                self.apply_domain(validator, document.owner_id(), document.properties())
                    .await
            }
        }
    }

    /// Validates a preorder and, if valid, stores it (name PREORDERED).
    ///
    /// Metrics and logs reflect the returned result, including a rejection
    /// of a hash that is already stored.
    pub fn apply_preorder(
        &self,
        validator: &DpnsValidator,
        owner_id: &Identifier,
        properties: &Properties,
    ) -> Result<ValidationResult, InfrastructureError> {
        let mut result = validator.check_preorder(properties);
        if result.is_valid() {
            if let Some(error) = self.store_preorder(validator, owner_id, properties)? {
                result.add_error(error);
            }
        }

        validator.record(DocumentType::Preorder, &result);
        Ok(result)
    }

    /// Validates a domain document and, if valid, consumes its preorder and
    /// registers the name (name REGISTERED).
    pub async fn apply_domain(
        &self,
        validator: &DpnsValidator,
        owner_id: &Identifier,
        properties: &Properties,
    ) -> Result<ValidationResult, InfrastructureError> {
        let mut result = validator.check_domain(owner_id, properties, self).await?;
        if result.is_valid() {
            if let Some(error) = self.register_domain(validator, owner_id, properties)? {
                result.add_error(error);
            }
        }

        validator.record(DocumentType::Domain, &result);
        Ok(result)
    }

    /// Stores a structurally valid preorder; returns the violation instead
    /// if its hash cannot be read or is already stored.
    fn store_preorder(
        &self,
        validator: &DpnsValidator,
        owner_id: &Identifier,
        properties: &Properties,
    ) -> Result<Option<ValidationError>, InfrastructureError> {
        let path = format!(".{}", fields::SALTED_DOMAIN_HASH);
        let Some(hash) = properties
            .get(fields::SALTED_DOMAIN_HASH)
            .and_then(Value::as_bytes)
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
        else {
            return Ok(Some(PreorderRejection::Unreadable.error(&path)));
        };

        let mut preorders = self.preorders.write().map_err(|_| InfrastructureError::Repository {
            lookup: "preorder",
            source: lock_poisoned(),
        })?;

        if preorders.contains_key(&hash) {
            return Ok(Some(PreorderRejection::AlreadyExists.to_error(&path, &hash)));
        }
        preorders.insert(hash, StoredPreorder::new(*owner_id, hash));
        drop(preorders);

        validator.metrics().increment_preorders_accepted();
        let owner = owner_id.to_hex();
        let hash_hex = hex::encode(hash);
        log_event_with_fields(
            Event::PreorderAccepted,
            &[("owner_id", owner.as_str()), ("salted_domain_hash", hash_hex.as_str())],
        );

        Ok(None)
    }

    /// Registers a validated domain document; returns the violation instead
    /// if it cannot be read back or another reveal committed first.
    fn register_domain(
        &self,
        validator: &DpnsValidator,
        owner_id: &Identifier,
        properties: &Properties,
    ) -> Result<Option<ValidationError>, InfrastructureError> {
        let Some(revealed) = RevealedDomain::from_properties(properties) else {
            return Ok(Some(PreorderRejection::Unreadable.error("")));
        };

        if let Some(error) = self.commit_domain(owner_id, &revealed)? {
            return Ok(Some(error));
        }

        validator.metrics().increment_preorders_consumed();
        let owner = owner_id.to_hex();
        let full_name = revealed.full_domain_name();
        log_event_with_fields(Event::PreorderConsumed, &[("owner_id", owner.as_str())]);
        log_event_with_fields(
            Event::DomainRegistered,
            &[("owner_id", owner.as_str()), ("full_domain_name", full_name.as_str())],
        );

        Ok(None)
    }

    /// Re-checks the reveal and consumes the preorder while holding both
    /// write locks. Returns the violation if another reveal got there first.
    fn commit_domain(
        &self,
        owner_id: &Identifier,
        revealed: &RevealedDomain,
    ) -> Result<Option<ValidationError>, InfrastructureError> {
        // Lock order: preorders, then domains
        let mut preorders = self.preorders.write().map_err(|_| InfrastructureError::Repository {
            lookup: "preorder",
            source: lock_poisoned(),
        })?;
        let mut domains = self.domains.write().map_err(|_| InfrastructureError::Repository {
            lookup: "domain",
            source: lock_poisoned(),
        })?;

        let hash = revealed.salted_domain_hash();
        let salt_path = format!(".{}", fields::PREORDER_SALT);
        let preorder = match preorders.get_mut(&hash) {
            None => return Ok(Some(PreorderRejection::NotFound.to_error(&salt_path, &hash))),
            Some(p) if p.owner_id != *owner_id => {
                return Ok(Some(PreorderRejection::OwnerMismatch.to_error(&salt_path, &hash)))
            }
            Some(p) if p.consumed => {
                return Ok(Some(PreorderRejection::AlreadyConsumed.to_error(&salt_path, &hash)))
            }
            Some(p) => p,
        };

        let full_name = revealed.full_domain_name();
        if domains.contains_key(&full_name) {
            let path = format!(".{}", fields::NORMALIZED_LABEL);
            return Ok(Some(
                ValidationError::new(Keyword::DomainAlreadyRegistered, path)
                    .with_param("fullDomainName", full_name.as_str()),
            ));
        }

        preorder.consumed = true;
        domains.insert(
            full_name,
            StoredDomain {
                owner_id: *owner_id,
                normalized_label: revealed.normalized_label.clone(),
                normalized_parent_domain_name: revealed.normalized_parent_domain_name.clone(),
                record: revealed.record,
                allow_subdomains: revealed.allow_subdomains,
                preorder_hash: hash,
                registered_at: Utc::now(),
            },
        );

        Ok(None)
    }
}

impl StateRepository for InMemoryStateRepository {
    fn fetch_preorder_by_hash<'a>(&'a self, salted_domain_hash: &'a [u8; 32]) -> RepositoryFuture<'a, Option<StoredPreorder>> {
        Box::pin(async move { self.preorder(salted_domain_hash) })
    }

    fn fetch_domain<'a>(&'a self, full_domain_name: &'a str) -> RepositoryFuture<'a, Option<StoredDomain>> {
        Box::pin(async move { self.domain(full_domain_name) })
    }

    fn fetch_identity<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<Identity>> {
        Box::pin(async move {
            let identities = self.identities.read().map_err(|_| lock_poisoned())?;
            Ok(identities.get(id).cloned())
        })
    }

    fn fetch_data_contract<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<DataContract>> {
        Box::pin(async move {
            let contracts = self.contracts.read().map_err(|_| lock_poisoned())?;
            Ok(contracts.get(id).cloned())
        })
    }
}
