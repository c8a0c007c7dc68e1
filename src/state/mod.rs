//! Platform state access
//!
//! Validation reads preorders, domains, identities and data contracts
//! through [`StateRepository`]. Absent entries are `Ok(None)`; failures are
//! errors and never look like "not found".

mod errors;
mod memory;
mod repository;

pub use errors::{InfrastructureError, RepositoryError, RepositoryResult};
pub use memory::InMemoryStateRepository;
pub use repository::{
    Identity, RepositoryFuture, StateRepository, StoredDomain, StoredPreorder,
};
