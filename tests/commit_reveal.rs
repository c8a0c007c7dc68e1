//! Commit-Reveal Protocol Tests
//!
//! End-to-end registration through the in-memory state repository:
//! - A domain is accepted only against a matching, owned, unconsumed preorder
//! - A preorder is consumed at most once
//! - Lookup failures and timeouts are infrastructure errors, not verdicts
//! - Subdomain rules, when enforced, follow the parent domain

use std::time::Duration;

use dpns::config::ValidatorConfig;
use dpns::document::{BinaryEncoding, DataContract, DocumentFactory, Identifier, Value};
use dpns::dpns::{
    dpns_contract, dpns_schemas, fields, salted_domain_hash, DomainRecord, DomainRegistration,
    DpnsValidator, ValidationContext,
};
use dpns::schema::{
    BinaryRules, ErrorCategory, FieldSchema, Keyword, ObjectSchema, SchemaLoader, ValidationResult,
};
use dpns::state::{
    Identity, InMemoryStateRepository, InfrastructureError, RepositoryError, RepositoryFuture,
    StateRepository, StoredDomain, StoredPreorder,
};
use serde_json::json;

const ALICE: Identifier = Identifier::new([0xa1; 32]);
const BOB: Identifier = Identifier::new([0xb0; 32]);

// =============================================================================
// Helper Functions
// =============================================================================

fn validator() -> DpnsValidator {
    DpnsValidator::new(ValidatorConfig::default()).unwrap()
}

fn wallet_dash(salt: [u8; 32]) -> DomainRegistration {
    DomainRegistration::new(
        "wallet",
        "dash",
        DomainRecord::UniqueIdentity(Identifier::new([0x33; 32])),
    )
    .with_salt(salt)
}

async fn register(
    repo: &InMemoryStateRepository,
    validator: &DpnsValidator,
    registration: &DomainRegistration,
    owner: Identifier,
) -> ValidationResult {
    let preorder = repo
        .apply_document(validator, &registration.preorder_document(owner))
        .await
        .unwrap();
    assert!(preorder.is_valid(), "{:?}", preorder.errors());

    repo.apply_document(validator, &registration.domain_document(owner))
        .await
        .unwrap()
}

/// Delays every lookup before answering from an in-memory store
struct SlowRepository {
    inner: InMemoryStateRepository,
    delay: Duration,
}

impl StateRepository for SlowRepository {
    fn fetch_preorder_by_hash<'a>(&'a self, hash: &'a [u8; 32]) -> RepositoryFuture<'a, Option<StoredPreorder>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner.fetch_preorder_by_hash(hash).await
        })
    }

    fn fetch_domain<'a>(&'a self, name: &'a str) -> RepositoryFuture<'a, Option<StoredDomain>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.inner.fetch_domain(name).await
        })
    }

    fn fetch_identity<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<Identity>> {
        self.inner.fetch_identity(id)
    }

    fn fetch_data_contract<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<DataContract>> {
        self.inner.fetch_data_contract(id)
    }
}

/// Finds preorders but fails on domain lookups
struct FlakyRepository {
    inner: InMemoryStateRepository,
}

impl StateRepository for FlakyRepository {
    fn fetch_preorder_by_hash<'a>(&'a self, hash: &'a [u8; 32]) -> RepositoryFuture<'a, Option<StoredPreorder>> {
        self.inner.fetch_preorder_by_hash(hash)
    }

    fn fetch_domain<'a>(&'a self, _: &'a str) -> RepositoryFuture<'a, Option<StoredDomain>> {
        Box::pin(async { Err(RepositoryError::Internal("index corrupted".into())) })
    }

    fn fetch_identity<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<Identity>> {
        self.inner.fetch_identity(id)
    }

    fn fetch_data_contract<'a>(&'a self, id: &'a Identifier) -> RepositoryFuture<'a, Option<DataContract>> {
        self.inner.fetch_data_contract(id)
    }
}

// =============================================================================
// Reveal Matching
// =============================================================================

/// The revealed salt and `wallet.dash` reproduce the stored hash.
#[tokio::test]
async fn test_reveal_matches_stored_preorder() {
    let salt = [0x42; 32];
    let repo = InMemoryStateRepository::new();
    repo.insert_preorder(StoredPreorder::new(ALICE, salted_domain_hash(&salt, "wallet.dash")))
        .unwrap();

    let props = wallet_dash(salt).domain_properties();
    let context = ValidationContext::new(ALICE, &repo);
    let result = validator()
        .validate(dpns::DocumentType::Domain, &props, &context)
        .await
        .unwrap();

    assert!(result.is_valid(), "{:?}", result.errors());
    assert_eq!(result.to_json(), json!({ "isValid": true, "errors": [] }));
}

/// One flipped salt byte breaks the link but nothing structural.
#[tokio::test]
async fn test_flipped_salt_byte() {
    let salt = [0x42; 32];
    let repo = InMemoryStateRepository::new();
    repo.insert_preorder(StoredPreorder::new(ALICE, salted_domain_hash(&salt, "wallet.dash")))
        .unwrap();

    let mut flipped = salt;
    flipped[31] ^= 0xff;
    let result = validator()
        .validate_domain(&ALICE, &wallet_dash(flipped).domain_properties(), &repo)
        .await
        .unwrap();

    assert_eq!(result.errors().len(), 1);
    let error = &result.errors()[0];
    assert_eq!(error.keyword, Keyword::InvalidPreorderReference);
    assert_eq!(error.category(), ErrorCategory::Semantic);
    assert_eq!(error.param_str("reason"), Some("notFound"));
    assert_eq!(
        error.param_str("saltedDomainHash"),
        Some(hex::encode(salted_domain_hash(&flipped, "wallet.dash")).as_str())
    );
}

/// Revealing someone else's preorder is rejected.
#[tokio::test]
async fn test_reveal_by_other_owner() {
    let repo = InMemoryStateRepository::new();
    let validator = validator();
    let registration = wallet_dash([1; 32]);
    repo.apply_document(&validator, &registration.preorder_document(ALICE))
        .await
        .unwrap();

    let result = repo
        .apply_document(&validator, &registration.domain_document(BOB))
        .await
        .unwrap();
    assert_eq!(result.errors()[0].param_str("reason"), Some("ownerMismatch"));
    assert_eq!(repo.domain_count().unwrap(), 0);
}

/// Structural errors are reported without consulting state.
#[tokio::test]
async fn test_structurally_invalid_reveal_has_no_semantic_errors() {
    let repo = InMemoryStateRepository::new();
    let mut props = wallet_dash([1; 32]).domain_properties();
    props.insert(fields::PREORDER_SALT.to_string(), Value::Bytes(vec![1; 16]));

    let result = validator().validate_domain(&ALICE, &props, &repo).await.unwrap();
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].keyword, Keyword::MinBytesLength);
    assert!(!result.has_semantic_errors());
}

// =============================================================================
// Single Use
// =============================================================================

#[tokio::test]
async fn test_preorder_consumed_once() {
    let repo = InMemoryStateRepository::new();
    let validator = validator();
    let registration = wallet_dash([9; 32]);

    assert!(register(&repo, &validator, &registration, ALICE).await.is_valid());

    let replay = repo
        .apply_document(&validator, &registration.domain_document(ALICE))
        .await
        .unwrap();
    assert!(replay
        .errors_with(Keyword::InvalidPreorderReference)
        .any(|e| e.param_str("reason") == Some("alreadyConsumed")));

    let metrics = validator.metrics().snapshot();
    assert_eq!(metrics.preorders_accepted, 1);
    assert_eq!(metrics.preorders_consumed, 1);
    assert!(metrics.semantic_rejections >= 1);
    assert_eq!(metrics.documents_validated, 2);
    assert_eq!(metrics.documents_rejected, 1);
}

/// A second owner cannot take a registered name with a fresh preorder.
#[tokio::test]
async fn test_registered_name_is_taken() {
    let repo = InMemoryStateRepository::new();
    let validator = validator();

    assert!(register(&repo, &validator, &wallet_dash([1; 32]), ALICE).await.is_valid());
    let second = register(&repo, &validator, &wallet_dash([2; 32]), BOB).await;

    assert_eq!(second.errors().len(), 1);
    assert_eq!(second.errors()[0].keyword, Keyword::DomainAlreadyRegistered);
    assert_eq!(second.errors()[0].param_str("fullDomainName"), Some("wallet.dash"));
}

// =============================================================================
// Infrastructure Failures
// =============================================================================

#[tokio::test]
async fn test_slow_lookup_times_out() {
    let registration = wallet_dash([3; 32]);
    let inner = InMemoryStateRepository::new();
    inner
        .insert_preorder(StoredPreorder::new(ALICE, *registration.commitment().salted_domain_hash()))
        .unwrap();
    let repo = SlowRepository {
        inner,
        delay: Duration::from_millis(500),
    };

    let config = ValidatorConfig::default().with_lookup_timeout(Duration::from_millis(20));
    let validator = DpnsValidator::new(config).unwrap();
    let err = validator
        .validate_domain(&ALICE, &registration.domain_properties(), &repo)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        InfrastructureError::LookupTimeout {
            lookup: "preorder",
            timeout_ms: 20
        }
    );
    assert!(err.is_retryable());
    assert_eq!(validator.metrics().snapshot().lookup_timeouts, 1);
}

/// A lookup that finishes within the timeout is unaffected.
#[tokio::test]
async fn test_slow_lookup_within_timeout() {
    let registration = wallet_dash([3; 32]);
    let inner = InMemoryStateRepository::new();
    inner
        .insert_preorder(StoredPreorder::new(ALICE, *registration.commitment().salted_domain_hash()))
        .unwrap();
    let repo = SlowRepository {
        inner,
        delay: Duration::from_millis(5),
    };

    let result = validator()
        .validate_domain(&ALICE, &registration.domain_properties(), &repo)
        .await
        .unwrap();
    assert!(result.is_valid());
}

#[tokio::test]
async fn test_failed_domain_lookup_is_not_a_verdict() {
    let registration = wallet_dash([3; 32]);
    let inner = InMemoryStateRepository::new();
    inner
        .insert_preorder(StoredPreorder::new(ALICE, *registration.commitment().salted_domain_hash()))
        .unwrap();
    let repo = FlakyRepository { inner };

    let err = validator()
        .validate_domain(&ALICE, &registration.domain_properties(), &repo)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DPNS_LOOKUP_FAILED");
    assert!(!err.is_retryable());
    assert!(matches!(err, InfrastructureError::Repository { lookup: "domain", .. }));
}

// =============================================================================
// Subdomain Rules
// =============================================================================

#[tokio::test]
async fn test_subdomain_rules_when_enforced() {
    let repo = InMemoryStateRepository::new();
    let validator = DpnsValidator::new(ValidatorConfig::default().with_subdomain_rules(true)).unwrap();
    let record = DomainRecord::AliasIdentity(Identifier::new([7; 32]));

    let open = DomainRegistration::new("dash", "", record).allow_subdomains(true);
    let closed = DomainRegistration::new("private", "", record);
    assert!(register(&repo, &validator, &open, ALICE).await.is_valid());
    assert!(register(&repo, &validator, &closed, ALICE).await.is_valid());

    let under_open = DomainRegistration::new("bob", "dash", record);
    assert!(register(&repo, &validator, &under_open, BOB).await.is_valid());

    let under_closed = DomainRegistration::new("bob", "private", record);
    let result = register(&repo, &validator, &under_closed, BOB).await;
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].keyword, Keyword::SubdomainsNotAllowed);
    assert_eq!(result.errors()[0].path, ".normalizedParentDomainName");

    // The parent's owner is not restricted
    let own_child = DomainRegistration::new("alice", "private", record);
    assert!(register(&repo, &validator, &own_child, ALICE).await.is_valid());

    let orphan = DomainRegistration::new("bob", "nowhere", record);
    let result = register(&repo, &validator, &orphan, BOB).await;
    assert_eq!(result.errors()[0].keyword, Keyword::ParentDomainNotFound);
    assert_eq!(result.errors()[0].param_str("parentDomainName"), Some("nowhere"));
}

/// Without enforcement only the preorder link matters.
#[tokio::test]
async fn test_subdomain_rules_off_by_default() {
    let repo = InMemoryStateRepository::new();
    let registration = DomainRegistration::new(
        "bob",
        "nowhere",
        DomainRecord::AliasIdentity(Identifier::new([7; 32])),
    );
    assert!(register(&repo, &validator(), &registration, BOB).await.is_valid());
}

// =============================================================================
// Documents From JSON
// =============================================================================

#[tokio::test]
async fn test_factory_to_registration() {
    let repo = InMemoryStateRepository::new();
    let contract = dpns_contract(ALICE, [0x10; 32]).unwrap();
    let contract_id = *contract.id();
    repo.insert_contract(contract).unwrap();
    repo.insert_identity(Identity::new(BOB)).unwrap();

    let validator = validator();
    let encoding = validator.config().binary_encoding;
    let factory = DocumentFactory::new(&repo, encoding);
    let salt = [0x55; 32];
    let hash = salted_domain_hash(&salt, "wallet.dash");

    let preorder = factory
        .create(
            &contract_id,
            &BOB,
            "preorder",
            &json!({ "saltedDomainHash": encoding.encode(&hash) }),
        )
        .await
        .unwrap();
    assert!(repo.apply_document(&validator, &preorder).await.unwrap().is_valid());

    let domain = factory
        .create(
            &contract_id,
            &BOB,
            "domain",
            &json!({
                "label": "Wallet",
                "normalizedLabel": "wallet",
                "normalizedParentDomainName": "dash",
                "preorderSalt": encoding.encode(&salt),
                "records": { "dashUniqueIdentityId": encoding.encode(BOB.as_bytes()) },
                "subdomainRules": { "allowSubdomains": false }
            }),
        )
        .await
        .unwrap();
    let result = repo.apply_document(&validator, &domain).await.unwrap();
    assert!(result.is_valid(), "{:?}", result.errors());

    let stored = repo.domain("wallet.dash").unwrap().unwrap();
    assert_eq!(stored.record, DomainRecord::UniqueIdentity(BOB));
    assert_eq!(stored.owner_id, BOB);
}

/// Binary text in the wrong encoding surfaces as a type error.
#[tokio::test]
async fn test_wrong_encoding_is_type_error() {
    let repo = InMemoryStateRepository::new();
    let contract = dpns_contract(ALICE, [0x10; 32]).unwrap();
    let contract_id = *contract.id();
    repo.insert_contract(contract).unwrap();
    repo.insert_identity(Identity::new(BOB)).unwrap();

    let factory = DocumentFactory::new(&repo, BinaryEncoding::Base64);
    let preorder = factory
        .create(&contract_id, &BOB, "preorder", &json!({ "saltedDomainHash": "zz" }))
        .await
        .unwrap();

    let result = validator().validate_document(&preorder, &repo).await.unwrap();
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].keyword, Keyword::Type);
    assert_eq!(result.errors()[0].param_str("actual"), Some("string"));
}

// =============================================================================
// Custom Schemas
// =============================================================================

/// Domain schema from the embedded contract with `records` replaced
fn schemas_with_records(records: ObjectSchema) -> SchemaLoader {
    let embedded = dpns_schemas().unwrap();
    let mut domain = embedded.get("domain").unwrap().clone();
    domain
        .properties
        .insert(fields::RECORDS.to_string(), FieldSchema::Object(records));

    let mut schemas = SchemaLoader::new();
    schemas
        .register("preorder", embedded.get("preorder").unwrap().clone())
        .unwrap();
    schemas.register("domain", domain).unwrap();
    schemas
}

/// A records rule the reveal cannot read back is refused at startup.
#[test]
fn test_loosened_identity_record_is_fatal() {
    let records = ObjectSchema::closed()
        .property(fields::DASH_UNIQUE_IDENTITY_ID, FieldSchema::Binary(BinaryRules::exact(20)))
        .property(fields::DASH_ALIAS_IDENTITY_ID, FieldSchema::Binary(BinaryRules::exact(32)))
        .exclusive_choice([fields::DASH_UNIQUE_IDENTITY_ID, fields::DASH_ALIAS_IDENTITY_ID]);

    let err = DpnsValidator::with_schemas(&schemas_with_records(records), ValidatorConfig::default())
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.document_type(), Some("domain"));
}

/// Schemas that accept anything are refused at startup.
#[test]
fn test_open_schemas_are_fatal() {
    let mut schemas = SchemaLoader::new();
    schemas.register("preorder", ObjectSchema::default()).unwrap();
    schemas.register("domain", ObjectSchema::default()).unwrap();

    let err = DpnsValidator::with_schemas(&schemas, ValidatorConfig::default()).unwrap_err();
    assert!(err.is_fatal());
}
