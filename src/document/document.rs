//! Typed documents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DocumentError;
use super::identifier::Identifier;
use super::value::{Properties, Value};

/// Document types of the name service contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Commit phase: hides the name behind a salted hash
    Preorder,
    /// Reveal phase: discloses salt and name, finalizes registration
    Domain,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Preorder => "preorder",
            DocumentType::Domain => "domain",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preorder" => Ok(DocumentType::Preorder),
            "domain" => Ok(DocumentType::Domain),
            other => Err(DocumentError::UnknownDocumentType(other.to_string())),
        }
    }
}

/// A document of a declared type, owned by an identity.
///
/// Immutable: the `with_*` methods return a new document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    document_type: DocumentType,
    owner_id: Identifier,
    properties: Properties,
}

impl Document {
    pub fn new(document_type: DocumentType, owner_id: Identifier, properties: Properties) -> Self {
        Self {
            document_type,
            owner_id,
            properties,
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn owner_id(&self) -> &Identifier {
        &self.owner_id
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns a copy with `name` set to `value`
    pub fn with_property(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut properties = self.properties.clone();
        properties.insert(name.into(), value.into());
        Self::new(self.document_type, self.owner_id, properties)
    }

    /// Returns a copy without `name`
    pub fn without_property(&self, name: &str) -> Self {
        let mut properties = self.properties.clone();
        properties.remove(name);
        Self::new(self.document_type, self.owner_id, properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("preorder".parse::<DocumentType>().unwrap(), DocumentType::Preorder);
        assert_eq!("domain".parse::<DocumentType>().unwrap(), DocumentType::Domain);
        assert!("profile".parse::<DocumentType>().is_err());
        assert_eq!(DocumentType::Domain.to_string(), "domain");
    }

    #[test]
    fn test_with_property_leaves_original_untouched() {
        let doc = Document::new(DocumentType::Preorder, Identifier::new([1; 32]), Properties::new());
        let updated = doc.with_property("saltedDomainHash", vec![0u8; 32]);

        assert!(doc.get("saltedDomainHash").is_none());
        assert_eq!(updated.get("saltedDomainHash"), Some(&Value::Bytes(vec![0u8; 32])));
        assert_eq!(updated.owner_id(), doc.owner_id());

        let removed = updated.without_property("saltedDomainHash");
        assert_eq!(removed, doc);
    }
}
