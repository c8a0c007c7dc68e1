//! Building both halves of a registration
//!
//! A registrant first submits the preorder (only the salted hash is public),
//! then, once it is accepted, the domain document revealing salt and name.

use serde::Serialize;

use super::contract::fields;
use super::hash::{full_domain_name, normalize_label, salted_domain_hash};
use crate::crypto::random_bytes32;
use crate::document::{Document, DocumentType, Identifier, Properties, Value};

/// What a registered name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainRecord {
    UniqueIdentity(Identifier),
    AliasIdentity(Identifier),
}

impl DomainRecord {
    pub fn field_name(&self) -> &'static str {
        match self {
            DomainRecord::UniqueIdentity(_) => fields::DASH_UNIQUE_IDENTITY_ID,
            DomainRecord::AliasIdentity(_) => fields::DASH_ALIAS_IDENTITY_ID,
        }
    }

    pub fn identity_id(&self) -> &Identifier {
        match self {
            DomainRecord::UniqueIdentity(id) | DomainRecord::AliasIdentity(id) => id,
        }
    }

    /// The `records` object of a domain document
    pub fn to_properties(&self) -> Properties {
        let mut records = Properties::new();
        records.insert(
            self.field_name().to_string(),
            Value::Bytes(self.identity_id().as_bytes().to_vec()),
        );
        records
    }

    /// Reads a `records` object holding exactly one well-sized entry.
    pub fn from_properties(records: &Properties) -> Option<Self> {
        let unique = records
            .get(fields::DASH_UNIQUE_IDENTITY_ID)
            .and_then(Value::as_bytes)
            .and_then(Identifier::from_slice);
        let alias = records
            .get(fields::DASH_ALIAS_IDENTITY_ID)
            .and_then(Value::as_bytes)
            .and_then(Identifier::from_slice);

        match (unique, alias) {
            (Some(id), None) => Some(DomainRecord::UniqueIdentity(id)),
            (None, Some(id)) => Some(DomainRecord::AliasIdentity(id)),
            _ => None,
        }
    }
}

/// The commit half: a salt and the hash it produces for one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreorderCommitment {
    salt: [u8; 32],
    full_domain_name: String,
    salted_domain_hash: [u8; 32],
}

impl PreorderCommitment {
    /// Commits to `full_domain_name` with a fresh random salt.
    pub fn new(full_domain_name: impl Into<String>) -> Self {
        Self::with_salt(random_bytes32(), full_domain_name)
    }

    pub fn with_salt(salt: [u8; 32], full_domain_name: impl Into<String>) -> Self {
        let full_domain_name = full_domain_name.into();
        let salted_domain_hash = salted_domain_hash(&salt, &full_domain_name);
        Self {
            salt,
            full_domain_name,
            salted_domain_hash,
        }
    }

    pub fn salt(&self) -> &[u8; 32] {
        &self.salt
    }

    pub fn full_domain_name(&self) -> &str {
        &self.full_domain_name
    }

    pub fn salted_domain_hash(&self) -> &[u8; 32] {
        &self.salted_domain_hash
    }

    /// Properties of the matching preorder document
    pub fn preorder_properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert(fields::SALTED_DOMAIN_HASH.to_string(), self.salted_domain_hash.into());
        props
    }
}

/// A name registration request, producing both protocol documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRegistration {
    label: String,
    normalized_parent_domain_name: String,
    record: DomainRecord,
    allow_subdomains: bool,
    salt: [u8; 32],
}

impl DomainRegistration {
    /// Registration of `label` under `parent_domain_name` (empty for a
    /// top-level name), with a fresh random salt.
    pub fn new(label: impl Into<String>, parent_domain_name: &str, record: DomainRecord) -> Self {
        Self {
            label: label.into(),
            normalized_parent_domain_name: parent_domain_name.to_ascii_lowercase(),
            record,
            allow_subdomains: false,
            salt: random_bytes32(),
        }
    }

    pub fn with_salt(mut self, salt: [u8; 32]) -> Self {
        self.salt = salt;
        self
    }

    pub fn allow_subdomains(mut self, allow: bool) -> Self {
        self.allow_subdomains = allow;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn normalized_label(&self) -> String {
        normalize_label(&self.label)
    }

    pub fn full_domain_name(&self) -> String {
        full_domain_name(&self.normalized_label(), &self.normalized_parent_domain_name)
    }

    pub fn commitment(&self) -> PreorderCommitment {
        PreorderCommitment::with_salt(self.salt, self.full_domain_name())
    }

    pub fn preorder_document(&self, owner_id: Identifier) -> Document {
        Document::new(DocumentType::Preorder, owner_id, self.commitment().preorder_properties())
    }

    pub fn domain_properties(&self) -> Properties {
        let mut subdomain_rules = Properties::new();
        subdomain_rules.insert(fields::ALLOW_SUBDOMAINS.to_string(), self.allow_subdomains.into());

        let mut props = Properties::new();
        props.insert(fields::LABEL.to_string(), self.label.clone().into());
        props.insert(fields::NORMALIZED_LABEL.to_string(), self.normalized_label().into());
        props.insert(
            fields::NORMALIZED_PARENT_DOMAIN_NAME.to_string(),
            self.normalized_parent_domain_name.clone().into(),
        );
        props.insert(fields::PREORDER_SALT.to_string(), self.salt.into());
        props.insert(fields::RECORDS.to_string(), self.record.to_properties().into());
        props.insert(fields::SUBDOMAIN_RULES.to_string(), subdomain_rules.into());
        props
    }

    pub fn domain_document(&self, owner_id: Identifier) -> Document {
        Document::new(DocumentType::Domain, owner_id, self.domain_properties())
    }
}

/// The revealed content of a structurally valid domain document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedDomain {
    pub label: String,
    pub normalized_label: String,
    pub normalized_parent_domain_name: String,
    pub preorder_salt: Vec<u8>,
    pub record: DomainRecord,
    pub allow_subdomains: bool,
}

impl RevealedDomain {
    /// Extracts the revealed fields; `None` unless every field is present
    /// with the expected type.
    pub fn from_properties(props: &Properties) -> Option<Self> {
        let text = |name: &str| props.get(name).and_then(Value::as_str).map(str::to_string);

        let records = props.get(fields::RECORDS).and_then(Value::as_object)?;
        let allow_subdomains = props
            .get(fields::SUBDOMAIN_RULES)
            .and_then(Value::as_object)
            .and_then(|rules| rules.get(fields::ALLOW_SUBDOMAINS))
            .and_then(Value::as_bool)?;

        Some(Self {
            label: text(fields::LABEL)?,
            normalized_label: text(fields::NORMALIZED_LABEL)?,
            normalized_parent_domain_name: text(fields::NORMALIZED_PARENT_DOMAIN_NAME)?,
            preorder_salt: props
                .get(fields::PREORDER_SALT)
                .and_then(Value::as_bytes)?
                .to_vec(),
            record: DomainRecord::from_properties(records)?,
            allow_subdomains,
        })
    }

    pub fn full_domain_name(&self) -> String {
        full_domain_name(&self.normalized_label, &self.normalized_parent_domain_name)
    }

    /// Hash the matching preorder must have committed to
    pub fn salted_domain_hash(&self) -> [u8; 32] {
        salted_domain_hash(&self.preorder_salt, &self.full_domain_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> DomainRegistration {
        DomainRegistration::new(
            "Wallet",
            "dash",
            DomainRecord::UniqueIdentity(Identifier::new([5; 32])),
        )
        .with_salt([9; 32])
    }

    #[test]
    fn test_commitment_matches_reveal() {
        let reg = registration();
        let revealed = RevealedDomain::from_properties(&reg.domain_properties()).unwrap();

        assert_eq!(revealed.full_domain_name(), "wallet.dash");
        assert_eq!(&revealed.salted_domain_hash(), reg.commitment().salted_domain_hash());
    }

    #[test]
    fn test_domain_properties_shape() {
        let props = registration().domain_properties();
        assert_eq!(props.len(), 6);
        assert_eq!(props[fields::LABEL], Value::String("Wallet".into()));
        assert_eq!(props[fields::NORMALIZED_LABEL], Value::String("wallet".into()));

        let records = props[fields::RECORDS].as_object().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.contains_key(fields::DASH_UNIQUE_IDENTITY_ID));
    }

    #[test]
    fn test_fresh_salts_differ() {
        let a = PreorderCommitment::new("wallet.dash");
        let b = PreorderCommitment::new("wallet.dash");
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.salted_domain_hash(), b.salted_domain_hash());
    }

    #[test]
    fn test_record_requires_exactly_one_entry() {
        let id = Identifier::new([1; 32]);
        let mut records = DomainRecord::AliasIdentity(id).to_properties();
        assert_eq!(DomainRecord::from_properties(&records), Some(DomainRecord::AliasIdentity(id)));

        records.insert(fields::DASH_UNIQUE_IDENTITY_ID.to_string(), Value::Bytes(vec![1; 32]));
        assert_eq!(DomainRecord::from_properties(&records), None);
        assert_eq!(DomainRecord::from_properties(&Properties::new()), None);
    }
}
