//! Versioned persistence for tagport's configuration objects.
//!
//! Every persistable object is written as a [`VersionedBlob`]: a type tag, a
//! schema version and a positional payload. Reading an older blob runs its
//! type's [`Migrations`] until the payload reaches the current shape, then
//! hands it to [`Serialisable::from_payload`].
//!
//! Objects nest: an importer's payload contains its string processor's blob
//! verbatim, and that inner blob is migrated by its own table when loaded.
//! Types version independently of whatever contains them.

mod blob;
pub mod error;
mod migrate;
mod registry;
mod tag;

pub use crate::blob::VersionedBlob;
pub use crate::migrate::{Migrations, Step};
pub use crate::registry::{Registry, RegistryBuilder};
pub use crate::tag::TypeTag;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

/// A value with a stable, versioned, positional persisted form.
pub trait Serialisable: Sized {
    /// Type tag written into every blob of this type.
    const TAG: TypeTag;
    /// Current payload version. Starts at 1.
    const VERSION: u32;
    /// Steps taking any released version up to [`VERSION`](Self::VERSION).
    const MIGRATIONS: Migrations = Migrations::NONE;

    /// Produces the current-version payload.
    fn to_payload(&self) -> Value;

    /// Materializes a value from a current-version payload.
    fn from_payload(payload: Value) -> Result<Self>;
}

/// Serializes a value as a current-version blob.
pub fn dump<T: Serialisable>(value: &T) -> VersionedBlob {
    VersionedBlob::new(T::TAG, T::VERSION, value.to_payload())
}

/// Upgrades a blob of type `T` to the current version without materializing it.
///
/// Running this on a blob that is already current returns it unchanged.
#[instrument(skip(blob), fields(tag = %T::TAG, version = blob.version))]
pub fn migrate<T: Serialisable>(blob: VersionedBlob) -> Result<VersionedBlob> {
    if blob.tag != T::TAG {
        exn::bail!(ErrorKind::TypeMismatch { expected: T::TAG, found: blob.tag });
    }
    let payload = T::MIGRATIONS.upgrade(T::TAG, T::VERSION, blob.version, blob.payload)?;
    Ok(VersionedBlob::new(T::TAG, T::VERSION, payload))
}

/// Loads a value of type `T` from a blob of any supported version.
pub fn load<T: Serialisable>(blob: VersionedBlob) -> Result<T> {
    let blob = migrate::<T>(blob)?;
    T::from_payload(blob.payload)
}

/// Loads a nested value from its `[tag, version, payload]` envelope, as found
/// inside another type's payload.
pub fn load_value<T: Serialisable>(value: Value) -> Result<T> {
    load(VersionedBlob::from_value(value)?)
}

/// Writes a nested value as the envelope another type's payload embeds.
pub fn dump_value<T: Serialisable>(value: &T) -> Value {
    dump(value).to_value()
}

/// Checks the migration table of a type that is only ever loaded nested inside
/// others, and so never goes through [`RegistryBuilder::register`].
pub fn validate<T: Serialisable>() -> Result<()> {
    T::MIGRATIONS.validate(T::TAG, T::VERSION)
}

/// Destructures a payload into its positional shape, usually a tuple.
///
/// Any mismatch is reported as [`MalformedPayload`](ErrorKind::MalformedPayload)
/// for the given type and version.
pub fn unpack<P: DeserializeOwned>(tag: TypeTag, version: u32, payload: Value) -> Result<P> {
    serde_json::from_value(payload).or_raise(|| ErrorKind::MalformedPayload { tag, version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Stand-in with a two step history: v1 `name`, v2 `(name, count)`,
    /// v3 `(name, enabled, count)`.
    #[derive(Debug, PartialEq)]
    struct Counter {
        name: String,
        enabled: bool,
        count: u32,
    }

    fn counter_from_v1(old: Value) -> Result<Value> {
        let name: String = unpack(TypeTag::StringSplitter, 1, old)?;
        Ok(json!([name, 0]))
    }

    fn counter_from_v2(old: Value) -> Result<Value> {
        let (name, count): (String, u32) = unpack(TypeTag::StringSplitter, 2, old)?;
        Ok(json!([name, true, count]))
    }

    impl Serialisable for Counter {
        const TAG: TypeTag = TypeTag::StringSplitter;
        const VERSION: u32 = 3;
        const MIGRATIONS: Migrations =
            Migrations::new(&[(1, counter_from_v1 as Step), (2, counter_from_v2 as Step)]);

        fn to_payload(&self) -> Value {
            json!([self.name, self.enabled, self.count])
        }

        fn from_payload(payload: Value) -> Result<Self> {
            let (name, enabled, count): (String, bool, u32) = unpack(Self::TAG, Self::VERSION, payload)?;
            Ok(Self { name, enabled, count })
        }
    }

    #[test]
    fn test_loads_every_released_version() {
        let expected = Counter { name: "tags".to_string(), enabled: true, count: 0 };
        for blob in [
            VersionedBlob::new(TypeTag::StringSplitter, 1, json!("tags")),
            VersionedBlob::new(TypeTag::StringSplitter, 2, json!(["tags", 0])),
            VersionedBlob::new(TypeTag::StringSplitter, 3, json!(["tags", true, 0])),
        ] {
            assert_eq!(load::<Counter>(blob).unwrap(), expected);
        }
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let current = dump(&Counter { name: "a".to_string(), enabled: false, count: 3 });
        let once = migrate::<Counter>(current.clone()).unwrap();
        assert_eq!(once, current);
        assert_eq!(migrate::<Counter>(once.clone()).unwrap(), once);
    }

    #[test]
    fn test_rejects_other_types() {
        let blob = VersionedBlob::new(TypeTag::StringMatch, 1, json!(null));
        let err = load::<Counter>(blob).unwrap_err();
        assert_eq!(*err, ErrorKind::TypeMismatch { expected: TypeTag::StringSplitter, found: TypeTag::StringMatch });
    }

    #[test]
    fn test_rejects_future_versions() {
        let blob = VersionedBlob::new(TypeTag::StringSplitter, 4, json!(["a", true, 0, "extra"]));
        let err = load::<Counter>(blob).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedVersion { tag: TypeTag::StringSplitter, version: 4 });
    }

    #[test]
    fn test_nested_values() {
        let counter = Counter { name: "nested".to_string(), enabled: true, count: 9 };
        let value = dump_value(&counter);
        assert_eq!(value, json!([3, 3, ["nested", true, 9]]));
        assert_eq!(load_value::<Counter>(value).unwrap(), counter);
    }

    #[test]
    fn test_malformed_current_payload() {
        let blob = VersionedBlob::new(TypeTag::StringSplitter, 3, json!(["only a name"]));
        let err = load::<Counter>(blob).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedPayload { tag: TypeTag::StringSplitter, version: 3 });
    }

    #[test]
    fn test_validate_nested_type() {
        assert!(validate::<Counter>().is_ok());
    }
}
