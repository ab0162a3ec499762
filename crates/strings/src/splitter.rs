use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{Serialisable, TypeTag, unpack};

/// Splits one string into many on a fixed separator. Empty pieces are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSplitter {
    separator: String,
    max_splits: Option<usize>,
}
impl StringSplitter {
    pub fn new(separator: impl Into<String>, max_splits: Option<usize>) -> Result<Self> {
        let separator = separator.into();
        if separator.is_empty() {
            exn::bail!(ErrorKind::EmptySeparator);
        }
        Ok(Self { separator, max_splits })
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn split(&self, s: &str) -> Vec<String> {
        let separator = self.separator.as_str();
        let keep = |piece: &&str| !piece.is_empty();
        match self.max_splits {
            Some(max) => s.splitn(max.saturating_add(1), separator).filter(keep).map(str::to_string).collect(),
            None => s.split(separator).filter(keep).map(str::to_string).collect(),
        }
    }
}
impl Display for StringSplitter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "split on \"{}\"", self.separator)?;
        if let Some(max) = self.max_splits {
            write!(f, " at most {max} times")?;
        }
        Ok(())
    }
}
impl Serialisable for StringSplitter {
    const TAG: TypeTag = TypeTag::StringSplitter;
    const VERSION: u32 = 1;

    fn to_payload(&self) -> Value {
        json!([self.separator, self.max_splits])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let (separator, max_splits): (String, Option<usize>) = unpack(Self::TAG, Self::VERSION, payload)?;
        Self::new(separator, max_splits)
            .or_raise(|| SerialiseErrorKind::MalformedPayload { tag: Self::TAG, version: Self::VERSION })
    }
}
