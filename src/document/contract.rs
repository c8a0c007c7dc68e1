//! Data contracts: an owner plus the schemas of its document types

use std::sync::Arc;

use super::identifier::Identifier;
use crate::crypto::sha256d;
use crate::schema::{ObjectSchema, SchemaLoader, SchemaResult};

/// A registered data contract.
///
/// The contract id is `sha256d(owner_id || entropy)`. Schemas are shared,
/// so cloning a contract is cheap.
#[derive(Debug, Clone)]
pub struct DataContract {
    id: Identifier,
    owner_id: Identifier,
    schemas: Arc<SchemaLoader>,
}

impl DataContract {
    pub fn new(owner_id: Identifier, entropy: [u8; 32], schemas: SchemaLoader) -> Self {
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(owner_id.as_bytes());
        preimage.extend_from_slice(&entropy);

        Self {
            id: Identifier::new(sha256d(&preimage)),
            owner_id,
            schemas: Arc::new(schemas),
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn owner_id(&self) -> &Identifier {
        &self.owner_id
    }

    pub fn schemas(&self) -> &SchemaLoader {
        &self.schemas
    }

    /// Schema of a document type declared by this contract
    pub fn document_schema(&self, document_type: &str) -> SchemaResult<&ObjectSchema> {
        self.schemas.require(document_type)
    }
}
