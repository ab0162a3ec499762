use crate::error::{ErrorKind, Result};
use crate::{Serialisable, TypeTag, VersionedBlob};
use std::collections::BTreeMap;
use tracing::instrument;

type Loader<T> = Box<dyn Fn(VersionedBlob) -> Result<T> + Send + Sync>;

struct Entry<T> {
    version: u32,
    load: Loader<T>,
    migrate: fn(VersionedBlob) -> Result<VersionedBlob>,
}

/// Maps type tags to loaders producing a common type `T`, typically a closed
/// enum of variants.
///
/// Built once through [`RegistryBuilder`] and immutable afterwards, so it can
/// live in a `static`. Registration checks each type's migration table, which
/// means a gapped table fails at startup instead of on the first old blob.
pub struct Registry<T> {
    entries: BTreeMap<TypeTag, Entry<T>>,
}
impl<T> Registry<T> {
    pub fn builder() -> RegistryBuilder<T> {
        RegistryBuilder { entries: BTreeMap::new() }
    }

    /// Loads a blob of any registered type and any supported version.
    #[instrument(skip_all, fields(tag = %blob.tag, version = blob.version))]
    pub fn load(&self, blob: VersionedBlob) -> Result<T> {
        let entry = self.entry(blob.tag)?;
        (entry.load)(blob)
    }

    /// Upgrades a blob of any registered type to its current version.
    pub fn migrate(&self, blob: VersionedBlob) -> Result<VersionedBlob> {
        let entry = self.entry(blob.tag)?;
        (entry.migrate)(blob)
    }

    /// Current version of a registered type.
    pub fn current_version(&self, tag: TypeTag) -> Option<u32> {
        self.entries.get(&tag).map(|entry| entry.version)
    }

    /// Registered tags, in code order.
    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.entries.keys().copied()
    }

    fn entry(&self, tag: TypeTag) -> Result<&Entry<T>> {
        match self.entries.get(&tag) {
            Some(entry) => Ok(entry),
            None => exn::bail!(ErrorKind::Unregistered(tag)),
        }
    }
}

pub struct RegistryBuilder<T> {
    entries: BTreeMap<TypeTag, Entry<T>>,
}
impl<T: 'static> RegistryBuilder<T> {
    /// Registers `S`, wrapping each loaded value with `wrap`.
    ///
    /// Fails if the migration table of `S` is not contiguous from version 1
    /// up to its current version, or if the tag is already taken.
    pub fn register<S: Serialisable + 'static>(mut self, wrap: fn(S) -> T) -> Result<Self> {
        S::MIGRATIONS.validate(S::TAG, S::VERSION)?;
        if self.entries.contains_key(&S::TAG) {
            exn::bail!(ErrorKind::DuplicateType(S::TAG));
        }
        tracing::trace!(tag = %S::TAG, version = S::VERSION, "registered serialisable type");
        self.entries.insert(
            S::TAG,
            Entry {
                version: S::VERSION,
                load: Box::new(move |blob| crate::load::<S>(blob).map(wrap)),
                migrate: crate::migrate::<S>,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> Registry<T> {
        Registry { entries: self.entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Migrations, Step, unpack};
    use serde_json::{Value, json};

    #[derive(Debug, PartialEq)]
    struct Flag(bool);
    impl Serialisable for Flag {
        const TAG: TypeTag = TypeTag::StringMatch;
        const VERSION: u32 = 1;
        fn to_payload(&self) -> Value {
            json!(self.0)
        }
        fn from_payload(payload: Value) -> Result<Self> {
            Ok(Self(unpack(Self::TAG, Self::VERSION, payload)?))
        }
    }

    #[derive(Debug, PartialEq)]
    struct Label(String);
    fn label_from_v1(_: Value) -> Result<Value> {
        Ok(json!("unnamed"))
    }
    impl Serialisable for Label {
        const TAG: TypeTag = TypeTag::StringSplitter;
        const VERSION: u32 = 2;
        const MIGRATIONS: Migrations = Migrations::new(&[(1, label_from_v1 as Step)]);
        fn to_payload(&self) -> Value {
            json!(self.0)
        }
        fn from_payload(payload: Value) -> Result<Self> {
            Ok(Self(unpack(Self::TAG, Self::VERSION, payload)?))
        }
    }

    /// Claims version 3 with only the v1 step: the table has a gap.
    struct Broken;
    impl Serialisable for Broken {
        const TAG: TypeTag = TypeTag::StringConverter;
        const VERSION: u32 = 3;
        const MIGRATIONS: Migrations = Migrations::new(&[(1, label_from_v1 as Step)]);
        fn to_payload(&self) -> Value {
            Value::Null
        }
        fn from_payload(_: Value) -> Result<Self> {
            Ok(Self)
        }
    }

    #[derive(Debug, PartialEq)]
    enum Any {
        Flag(Flag),
        Label(Label),
    }

    fn registry() -> Registry<Any> {
        Registry::builder()
            .register::<Flag>(Any::Flag)
            .and_then(|b| b.register::<Label>(Any::Label))
            .unwrap()
            .build()
    }

    #[test]
    fn test_dispatches_on_tag() {
        let registry = registry();
        let flag = registry.load(VersionedBlob::new(TypeTag::StringMatch, 1, json!(true))).unwrap();
        assert_eq!(flag, Any::Flag(Flag(true)));
        let label = registry.load(VersionedBlob::new(TypeTag::StringSplitter, 1, json!(null))).unwrap();
        assert_eq!(label, Any::Label(Label("unnamed".to_string())));
    }

    #[test]
    fn test_migrate_through_registry() {
        let registry = registry();
        let blob = registry.migrate(VersionedBlob::new(TypeTag::StringSplitter, 1, json!(null))).unwrap();
        assert_eq!(blob, VersionedBlob::new(TypeTag::StringSplitter, 2, json!("unnamed")));
        assert_eq!(registry.current_version(TypeTag::StringSplitter), Some(2));
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec![TypeTag::StringMatch, TypeTag::StringSplitter]);
    }

    #[test]
    fn test_unregistered_tag() {
        let err = registry().load(VersionedBlob::new(TypeTag::JsonFormula, 1, json!(null))).unwrap_err();
        assert_eq!(*err, ErrorKind::Unregistered(TypeTag::JsonFormula));
    }

    #[test]
    fn test_rejects_gapped_tables() {
        let err = Registry::<()>::builder().register::<Broken>(|_| ()).err().unwrap();
        assert!(matches!(*err, ErrorKind::InvalidMigrations { tag: TypeTag::StringConverter, .. }));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = Registry::<Any>::builder()
            .register::<Flag>(Any::Flag)
            .and_then(|b| b.register::<Flag>(Any::Flag))
            .err()
            .unwrap();
        assert_eq!(*err, ErrorKind::DuplicateType(TypeTag::StringMatch));
    }
}
