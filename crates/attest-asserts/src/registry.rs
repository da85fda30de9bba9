//! # Kind Registry
//!
//! Maps each kind identifier to its capability bundle: the builder function
//! and the primary-key field list. Dispatch looks the envelope's kind up here
//! and hands the generic attributes to the matching builder; the dispatch
//! code never changes when a kind is added.
//!
//! ## Lifecycle
//!
//! Single writer, then many readers:
//!
//! 1. During start-up, each kind's own `register()` function adds itself to a
//!    [`RegistryBuilder`]. Registering a kind twice is an error.
//! 2. [`RegistryBuilder::seal()`] produces an immutable [`Registry`]. There
//!    is no way to add kinds to a sealed registry.
//! 3. The sealed registry is `Send + Sync` and is shared across worker
//!    threads without locking, either by reference or through the
//!    process-wide instance behind [`global()`] / [`install()`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::OnceLock;

use attest_core::KindId;

use crate::assertion::{AssertionBase, BuildContext, TypedAssertion};
use crate::config::ValidatorConfig;
use crate::envelope::Envelope;
use crate::error::{AssertionError, RegistryError};
use crate::{build_record, revision_record};

/// Builder function for one assertion kind.
pub type BuildFn =
    fn(AssertionBase, &BuildContext) -> Result<Box<dyn TypedAssertion>, AssertionError>;

/// Registration function a kind exposes for start-up wiring.
pub type RegisterFn = fn(&mut RegistryBuilder) -> Result<(), RegistryError>;

/// Kinds shipped with this crate, in registration order.
const BUILTIN_KINDS: &[(&str, RegisterFn)] = &[
    (build_record::KIND, build_record::register),
    (revision_record::KIND, revision_record::register),
];

/// What the registry knows about one kind.
#[derive(Debug, Clone, Copy)]
struct Registration {
    builder: BuildFn,
    primary_key: &'static [&'static str],
}

impl Registration {
    /// Header fields identifying an assertion within its kind.
    fn primary_key(&self) -> &'static [&'static str] {
        self.primary_key
    }
}

/// Collects registrations before the registry is sealed.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    ctx: BuildContext,
    kinds: HashMap<KindId, Registration>,
}

impl RegistryBuilder {
    /// An empty builder whose builders will run with `ctx`.
    pub fn new(ctx: BuildContext) -> Self {
        Self {
            ctx,
            kinds: HashMap::new(),
        }
    }

    /// Register `kind`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateKind`] if `kind` is already registered; the
    /// existing registration is left untouched.
    pub fn register(
        &mut self,
        kind: &str,
        builder: BuildFn,
        primary_key: &'static [&'static str],
    ) -> Result<(), RegistryError> {
        let kind = KindId::new(kind)?;
        match self.kinds.entry(kind) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateKind(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(Registration {
                    builder,
                    primary_key,
                });
                Ok(())
            }
        }
    }

    /// Freeze the registrations.
    pub fn seal(self) -> Registry {
        tracing::info!(
            kinds = self.kinds.len(),
            timestamp_profile = ?self.ctx.timestamp_profile,
            "assertion registry sealed"
        );
        Registry {
            ctx: self.ctx,
            kinds: self.kinds,
        }
    }
}

/// Immutable kind registry and dispatch entry point.
#[derive(Debug)]
pub struct Registry {
    ctx: BuildContext,
    kinds: HashMap<KindId, Registration>,
}

impl Registry {
    /// Start an empty registry.
    pub fn builder(ctx: BuildContext) -> RegistryBuilder {
        RegistryBuilder::new(ctx)
    }

    /// Every built-in kind with default settings.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::from_config(&ValidatorConfig::default())
    }

    /// The built-in kinds enabled by `config`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownConfiguredKind`] if the allowlist names a kind
    /// this crate does not provide.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self, RegistryError> {
        if let Some(allowed) = &config.kinds {
            if let Some(unknown) = allowed
                .iter()
                .find(|k| !BUILTIN_KINDS.iter().any(|(name, _)| k.as_str() == *name))
            {
                return Err(RegistryError::UnknownConfiguredKind(unknown.clone()));
            }
        }

        let mut builder = RegistryBuilder::new(BuildContext::from(config));
        for (name, register) in BUILTIN_KINDS {
            if config.enables(&KindId::from_static(*name)) {
                register(&mut builder)?;
            }
        }
        Ok(builder.seal())
    }

    /// Structurally validate `envelope` into a typed assertion.
    ///
    /// # Errors
    ///
    /// [`AssertionError::UnknownKind`] if no builder is registered for the
    /// envelope's kind, whatever its headers; otherwise the first field
    /// error reported by the kind's builder.
    pub fn build(&self, envelope: &Envelope) -> Result<Box<dyn TypedAssertion>, AssertionError> {
        let registration =
            self.kinds
                .get(envelope.kind())
                .ok_or_else(|| AssertionError::UnknownKind {
                    kind: envelope.kind().clone(),
                })?;

        let result = (registration.builder)(AssertionBase::from_envelope(envelope), &self.ctx);
        match &result {
            Ok(_) => tracing::debug!(
                kind = %envelope.kind(),
                signer = %envelope.signer(),
                "assertion built"
            ),
            Err(err) => tracing::warn!(
                kind = %envelope.kind(),
                signer = %envelope.signer(),
                error = %err,
                "assertion rejected by builder"
            ),
        }
        result
    }

    /// Primary-key fields declared for `kind`.
    pub fn primary_key(&self, kind: &KindId) -> Option<&'static [&'static str]> {
        self.kinds.get(kind).map(Registration::primary_key)
    }

    /// Primary-key values of `assertion`, in declaration order.
    ///
    /// `None` if the assertion's kind is not registered here or a key header
    /// is absent.
    pub fn primary_key_values<'a>(&self, assertion: &'a dyn TypedAssertion) -> Option<Vec<&'a str>> {
        self.primary_key(assertion.kind())?
            .iter()
            .map(|field| assertion.header(field))
            .collect()
    }

    /// Whether `kind` has a builder.
    pub fn contains(&self, kind: &KindId) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&KindId> {
        let mut kinds: Vec<&KindId> = self.kinds.keys().collect();
        kinds.sort();
        kinds
    }

    /// Settings passed to every builder.
    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry.
///
/// Call once during start-up, before any validation traffic.
///
/// # Errors
///
/// [`RegistryError::AlreadyInstalled`] if a registry was already installed
/// or [`global()`] already initialized the standard one.
pub fn install(registry: Registry) -> Result<&'static Registry, RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    Ok(global())
}

/// The process-wide registry, initializing the standard one on first use.
///
/// # Panics
///
/// If the built-in kinds fail to register, which is a programming error
/// (for example two built-ins sharing a kind identifier).
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| match Registry::standard() {
        Ok(registry) => registry,
        Err(e) => panic!("standard assertion registry failed to initialize: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use attest_core::{HeaderMap, SignerId};

    use super::*;
    use crate::envelope::SignatureProvenance;

    fn envelope(kind: &str, headers: HeaderMap) -> Envelope {
        Envelope::new(
            KindId::new(kind).unwrap(),
            SignerId::new("store").unwrap(),
            headers,
            Vec::new(),
            SignatureProvenance {
                key_id: "k1".into(),
                algorithm: "ed25519".into(),
            },
        )
    }

    fn build_record_headers() -> HeaderMap {
        HeaderMap::new()
            .with("subject-id", "s1")
            .with("content-digest", "d1")
            .with("grade", "stable")
            .with("size", "1024")
            .with("timestamp", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn standard_registers_builtins() {
        let registry = Registry::standard().unwrap();
        let kinds: Vec<&str> = registry.kinds().iter().map(|k| k.as_str()).collect();
        assert_eq!(kinds, vec!["build-record", "revision-record"]);
    }

    #[test]
    fn duplicate_registration_fails_and_keeps_original() {
        let mut builder = RegistryBuilder::default();
        build_record::register(&mut builder).unwrap();
        let err = builder
            .register(build_record::KIND, revision_record::build, &["other"])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateKind(KindId::new("build-record").unwrap())
        );

        let registry = builder.seal();
        let built = registry
            .build(&envelope("build-record", build_record_headers()))
            .unwrap();
        assert!(built.is::<build_record::BuildRecord>());
        assert_eq!(
            registry.primary_key(built.kind()),
            Some(build_record::PRIMARY_KEY)
        );
    }

    #[test]
    fn register_rejects_malformed_kind() {
        let mut builder = RegistryBuilder::default();
        assert!(matches!(
            builder.register("Bad Kind", build_record::build, &[]),
            Err(RegistryError::InvalidKind(_))
        ));
    }

    #[test]
    fn unknown_kind_ignores_headers() {
        let registry = Registry::standard().unwrap();
        let err = registry
            .build(&envelope("future-record", build_record_headers()))
            .unwrap_err();
        assert_eq!(
            err,
            AssertionError::UnknownKind {
                kind: KindId::new("future-record").unwrap()
            }
        );
    }

    #[test]
    fn primary_key_values_follow_declaration_order() {
        let registry = Registry::standard().unwrap();
        let built = registry
            .build(&envelope("build-record", build_record_headers()))
            .unwrap();
        assert_eq!(
            registry.primary_key_values(&*built),
            Some(vec!["s1", "d1"])
        );
    }

    #[test]
    fn config_allowlist_limits_kinds() {
        let config = ValidatorConfig::from_yaml_str("kinds: [revision-record]").unwrap();
        let registry = Registry::from_config(&config).unwrap();
        assert!(!registry.contains(&KindId::new("build-record").unwrap()));
        assert!(registry.contains(&KindId::new("revision-record").unwrap()));
        assert!(matches!(
            registry.build(&envelope("build-record", build_record_headers())),
            Err(AssertionError::UnknownKind { .. })
        ));
    }

    #[test]
    fn config_profile_reaches_builders() {
        let config = ValidatorConfig::from_yaml_str("timestamp_profile: utc-only").unwrap();
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(
            registry.context().timestamp_profile,
            crate::config::TimestampProfile::UtcOnly
        );
        let headers = build_record_headers().with("timestamp", "2024-01-01T00:00:00+00:00");
        assert!(matches!(
            registry.build(&envelope("build-record", headers)),
            Err(AssertionError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn unconventional_kind_spelling_is_unknown_at_dispatch() {
        let registry = Registry::standard().unwrap();
        let err = registry
            .build(&envelope("Snap_Build", build_record_headers()))
            .unwrap_err();
        assert_eq!(
            err,
            AssertionError::UnknownKind {
                kind: KindId::new("Snap_Build").unwrap()
            }
        );
    }

    #[test]
    fn config_with_unknown_kind_fails() {
        let config = ValidatorConfig::from_yaml_str("kinds: [note-record]").unwrap();
        assert_eq!(
            Registry::from_config(&config).unwrap_err(),
            RegistryError::UnknownConfiguredKind(KindId::new("note-record").unwrap())
        );
    }

    #[test]
    fn global_is_initialized_once() {
        let first = global();
        let second = global();
        assert!(std::ptr::eq(first, second));
        assert!(first.contains(&KindId::new("build-record").unwrap()));
        assert_eq!(
            install(Registry::standard().unwrap()).unwrap_err(),
            RegistryError::AlreadyInstalled
        );
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
