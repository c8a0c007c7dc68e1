//! The name service data contract

use crate::document::{DataContract, Identifier};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{SchemaLoader, SchemaResult};

/// Documents definition of the name service contract
pub const DPNS_DOCUMENTS: &str = include_str!("schema/dpns-documents.json");

/// Property names used by the protocol rules
pub mod fields {
    pub const SALTED_DOMAIN_HASH: &str = "saltedDomainHash";
    pub const LABEL: &str = "label";
    pub const NORMALIZED_LABEL: &str = "normalizedLabel";
    pub const NORMALIZED_PARENT_DOMAIN_NAME: &str = "normalizedParentDomainName";
    pub const PREORDER_SALT: &str = "preorderSalt";
    pub const RECORDS: &str = "records";
    pub const DASH_UNIQUE_IDENTITY_ID: &str = "dashUniqueIdentityId";
    pub const DASH_ALIAS_IDENTITY_ID: &str = "dashAliasIdentityId";
    pub const SUBDOMAIN_RULES: &str = "subdomainRules";
    pub const ALLOW_SUBDOMAINS: &str = "allowSubdomains";
}

/// Parses the embedded documents definition.
pub fn dpns_schemas() -> SchemaResult<SchemaLoader> {
    SchemaLoader::from_json_str(DPNS_DOCUMENTS)
}

/// Builds the name service contract for `owner_id`.
pub fn dpns_contract(owner_id: Identifier, entropy: [u8; 32]) -> SchemaResult<DataContract> {
    let contract = DataContract::new(owner_id, entropy, dpns_schemas()?);

    let contract_id = contract.id().to_hex();
    let document_types = contract.schemas().schema_count().to_string();
    log_event_with_fields(
        Event::ContractLoaded,
        &[
            ("contract_id", contract_id.as_str()),
            ("document_types", document_types.as_str()),
        ],
    );

    Ok(contract)
}
