//! Schema migration tables.
//!
//! Each serialisable type owns a table of pure upgrade steps, keyed by the
//! version they upgrade *from*. A step turns a version `n` payload into a
//! version `n + 1` payload. Once a version has been released, its step is
//! frozen: new versions only ever append a step.

use crate::TypeTag;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::Value;

/// Upgrades a payload from one version to the next.
pub type Step = fn(Value) -> Result<Value>;

/// Contiguous table of upgrade steps for one type.
///
/// Built in a `const` so that the table is fixed at compile time:
///
/// ```
/// use serde_json::{Value, json};
/// use tagport_serialise::error::Result;
/// use tagport_serialise::{Migrations, Step, TypeTag};
///
/// fn wrap_in_array(old: Value) -> Result<Value> {
///     Ok(json!([old]))
/// }
///
/// const MIGRATIONS: Migrations = Migrations::new(&[(1, wrap_in_array as Step)]);
///
/// assert!(MIGRATIONS.validate(TypeTag::StringMatch, 2).is_ok());
/// assert!(MIGRATIONS.validate(TypeTag::StringMatch, 3).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct Migrations {
    steps: &'static [(u32, Step)],
}
impl Migrations {
    /// Table for a type still on its first version.
    pub const NONE: Self = Self { steps: &[] };

    pub const fn new(steps: &'static [(u32, Step)]) -> Self {
        Self { steps }
    }

    /// Checks the table has exactly one step for each of `1..current`, in
    /// order, and nothing else.
    pub fn validate(&self, tag: TypeTag, current: u32) -> Result<()> {
        if current == 0 {
            exn::bail!(ErrorKind::InvalidMigrations {
                tag,
                reason: "current version must be at least 1".to_string(),
            });
        }
        let expected = (1..current).collect::<Vec<_>>();
        let found = self.steps.iter().map(|(from, _)| *from).collect::<Vec<_>>();
        if expected != found {
            exn::bail!(ErrorKind::InvalidMigrations {
                tag,
                reason: format!("expected steps from versions {expected:?}, found {found:?}"),
            });
        }
        Ok(())
    }

    fn step(&self, from: u32) -> Option<Step> {
        self.steps.iter().find(|(version, _)| *version == from).map(|(_, step)| *step)
    }

    /// Runs the chain from `version` up to `current`.
    ///
    /// A payload already at `current` is returned untouched. A version of
    /// zero, a version above `current`, or a version with no step is
    /// [`UnsupportedVersion`](ErrorKind::UnsupportedVersion).
    pub fn upgrade(&self, tag: TypeTag, current: u32, version: u32, payload: Value) -> Result<Value> {
        if version == 0 || version > current {
            exn::bail!(ErrorKind::UnsupportedVersion { tag, version });
        }
        let mut version = version;
        let mut payload = payload;
        while version < current {
            let Some(step) = self.step(version) else {
                exn::bail!(ErrorKind::UnsupportedVersion { tag, version });
            };
            payload = step(payload).or_raise(|| ErrorKind::MalformedPayload { tag, version })?;
            version += 1;
            tracing::trace!(%tag, version, "upgraded payload");
        }
        Ok(payload)
    }
}
