//! A kind defined outside this crate plugs into the registry through the
//! public builder API alone.

use std::any::Any;

use attest_asserts::checks::{check_mandatory, check_uint};
use attest_asserts::consistency::require_within_key_validity;
use attest_asserts::{
    AccountKey, AssertionBase, AssertionError, BitWidth, BuildContext, Envelope, MemoryTrustDb,
    Registry, SignatureProvenance, TrustDatabase, TypedAssertion, Validator, ValidityWindow,
};
use attest_core::{HeaderMap, KindId, SignerId, Timestamp};

const NOTE_KIND: &str = "release-note";

#[derive(Debug)]
struct ReleaseNote {
    base: AssertionBase,
    revision: u32,
}

impl TypedAssertion for ReleaseNote {
    fn base(&self) -> &AssertionBase {
        &self.base
    }

    fn timestamp(&self) -> Timestamp {
        // Release notes carry no clock of their own; this one is pinned.
        Timestamp::parse("2024-05-01T00:00:00Z").unwrap()
    }

    fn check_consistency(
        &self,
        db: &dyn TrustDatabase,
        signing_key: &AccountKey,
    ) -> Result<(), AssertionError> {
        require_within_key_validity(self.kind(), self.timestamp(), signing_key)?;
        let author = SignerId::new(check_mandatory(self.base.headers(), "author")?).unwrap();
        if db.key_valid_at(&author, &self.timestamp()) {
            Ok(())
        } else {
            Err(AssertionError::UnknownSigningKey {
                signer: author,
                key_id: "*".into(),
            })
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_note(
    base: AssertionBase,
    _ctx: &BuildContext,
) -> Result<Box<dyn TypedAssertion>, AssertionError> {
    check_mandatory(base.headers(), "author")?;
    let revision = check_uint(base.headers(), "revision", BitWidth::U32)? as u32;
    Ok(Box::new(ReleaseNote { base, revision }))
}

fn registry() -> Registry {
    let mut builder = Registry::builder(BuildContext::default());
    attest_asserts::build_record::register(&mut builder).unwrap();
    builder.register(NOTE_KIND, build_note, &["author", "revision"]).unwrap();
    builder.seal()
}

fn note(headers: HeaderMap) -> Envelope {
    Envelope::new(
        KindId::new(NOTE_KIND).unwrap(),
        SignerId::new("store").unwrap(),
        headers,
        b"free-form notes".to_vec(),
        SignatureProvenance {
            key_id: "k1".into(),
            algorithm: "ed25519".into(),
        },
    )
}

fn key(signer: &str) -> AccountKey {
    AccountKey::new(
        SignerId::new(signer).unwrap(),
        "k1",
        ValidityWindow::open_ended(Timestamp::parse("2024-01-01T00:00:00Z").unwrap()),
    )
}

#[test]
fn custom_kind_is_dispatched() {
    let registry = registry();
    let built = registry
        .build(&note(HeaderMap::new().with("author", "dev1").with("revision", "3")))
        .unwrap();
    let note = built.downcast_ref::<ReleaseNote>().unwrap();
    assert_eq!(note.revision, 3);
    assert_eq!(note.base().body(), b"free-form notes");
    assert_eq!(
        registry.primary_key_values(&*built),
        Some(vec!["dev1", "3"])
    );
}

#[test]
fn custom_kind_uses_shared_checkers() {
    let registry = registry();
    let err = registry
        .build(&note(HeaderMap::new().with("author", "dev1").with("revision", "70000000000")))
        .unwrap_err();
    assert!(matches!(err, AssertionError::InvalidInteger { bits: 32, .. }));
}

#[test]
fn custom_consistency_rule_consults_trust_db() {
    let registry = registry();
    let validator = Validator::new(&registry);
    let envelope = note(HeaderMap::new().with("author", "dev1").with("revision", "1"));

    let without_author: MemoryTrustDb = [key("store")].into_iter().collect();
    let err = validator.admit(&envelope, &without_author).unwrap_err();
    assert!(matches!(err, AssertionError::UnknownSigningKey { ref signer, .. } if signer.as_str() == "dev1"));

    let with_author: MemoryTrustDb = [key("store"), key("dev1")].into_iter().collect();
    assert!(validator.admit(&envelope, &with_author).is_ok());
}

#[test]
fn builtins_left_out_are_unknown() {
    let registry = registry();
    assert!(registry.contains(&KindId::new("build-record").unwrap()));
    assert!(!registry.contains(&KindId::new("revision-record").unwrap()));
}
