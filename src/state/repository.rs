//! State repository interface
//!
//! The surrounding platform owns ledger state; the validation core only
//! reads it through this trait, injected explicitly into each call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

use super::errors::RepositoryError;
use crate::document::{DataContract, Identifier};
use crate::dpns::{full_domain_name, DomainRecord};

/// Boxed future returned by repository lookups
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// An accepted preorder (commit phase)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPreorder {
    pub owner_id: Identifier,
    pub salted_domain_hash: [u8; 32],
    /// Set once a domain document has revealed this preorder
    pub consumed: bool,
    pub accepted_at: DateTime<Utc>,
}

impl StoredPreorder {
    pub fn new(owner_id: Identifier, salted_domain_hash: [u8; 32]) -> Self {
        Self {
            owner_id,
            salted_domain_hash,
            consumed: false,
            accepted_at: Utc::now(),
        }
    }
}

/// A registered domain (reveal phase completed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDomain {
    pub owner_id: Identifier,
    pub normalized_label: String,
    pub normalized_parent_domain_name: String,
    pub record: DomainRecord,
    pub allow_subdomains: bool,
    pub preorder_hash: [u8; 32],
    pub registered_at: DateTime<Utc>,
}

impl StoredDomain {
    pub fn full_domain_name(&self) -> String {
        full_domain_name(&self.normalized_label, &self.normalized_parent_domain_name)
    }
}

/// A platform identity, as far as document creation needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Identifier,
}

impl Identity {
    pub fn new(id: Identifier) -> Self {
        Self { id }
    }
}

/// Read access to platform state.
///
/// Lookups of absent entries resolve to `Ok(None)`; `Err` is reserved for
/// infrastructure failures.
pub trait StateRepository: Send + Sync {
    fn fetch_preorder_by_hash<'a>(&'a self, salted_domain_hash: &'a [u8; 32]) -> RepositoryFuture<'a, Option<StoredPreorder>>;

    /// Looks up a registered domain by its normalized full name
    fn fetch_domain<'a>(&'a self, full_domain_name: &'a str) -> RepositoryFuture<'a, Option<StoredDomain>>;

    fn fetch_identity<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<Identity>>;

    fn fetch_data_contract<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<DataContract>>;
}
