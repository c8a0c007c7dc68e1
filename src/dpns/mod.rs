//! Name service protocol
//!
//! Names are registered in two phases. A preorder commits to
//! `sha256d(salt || fullName)` without revealing the name; a later domain
//! document reveals salt and name and is only accepted when it matches an
//! unconsumed preorder of the same owner.

mod contract;
mod hash;
mod registration;
mod rules;

pub use contract::{dpns_contract, dpns_schemas, fields, DPNS_DOCUMENTS};
pub use hash::{full_domain_name, normalize_label, salted_domain_hash};
pub use registration::{DomainRecord, DomainRegistration, PreorderCommitment, RevealedDomain};
pub use rules::{DpnsValidator, PreorderRejection, ValidationContext};
