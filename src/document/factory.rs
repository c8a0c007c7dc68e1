//! Building documents from caller JSON

use super::document::{Document, DocumentType};
use super::encoding::{decode_binary_fields, BinaryEncoding};
use super::errors::{DocumentError, DocumentResult};
use super::identifier::Identifier;
use super::value::Value;
use crate::state::StateRepository;

/// Creates typed documents of a registered data contract.
///
/// The contract and the owner identity are resolved through the state
/// repository; binary fields are decoded from `encoding` according to the
/// contract's schema. The result is not validated.
pub struct DocumentFactory<'a> {
    repository: &'a dyn StateRepository,
    encoding: BinaryEncoding,
}

impl<'a> DocumentFactory<'a> {
    pub fn new(repository: &'a dyn StateRepository, encoding: BinaryEncoding) -> Self {
        Self {
            repository,
            encoding,
        }
    }

    pub async fn create(
        &self,
        contract_id: &Identifier,
        owner_id: &Identifier,
        document_type: &str,
        data: &serde_json::Value,
    ) -> DocumentResult<Document> {
        let document_type: DocumentType = document_type.parse()?;

        let contract = self
            .repository
            .fetch_data_contract(contract_id)
            .await?
            .ok_or(DocumentError::ContractNotFound(*contract_id))?;
        let identity = self
            .repository
            .fetch_identity(owner_id)
            .await?
            .ok_or(DocumentError::IdentityNotFound(*owner_id))?;

        let schema = contract.document_schema(document_type.as_str())?;
        let Value::Object(mut properties) = Value::from_json(data) else {
            return Err(DocumentError::NotAnObject);
        };
        decode_binary_fields(schema, &mut properties, self.encoding);

        Ok(Document::new(document_type, identity.id, properties))
    }
}
