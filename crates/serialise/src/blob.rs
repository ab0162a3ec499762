use crate::TypeTag;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Value, json};

/// The persisted form of any [`Serialisable`](crate::Serialisable) value.
///
/// On disk this is the JSON array `[tag, version, payload]`. The shape of
/// `payload` is determined entirely by `tag` and `version`; payloads are
/// positional tuples (JSON arrays), never named records, so field order is
/// part of the contract.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedBlob {
    pub tag: TypeTag,
    pub version: u32,
    pub payload: Value,
}
impl VersionedBlob {
    pub fn new(tag: TypeTag, version: u32, payload: impl Into<Value>) -> Self {
        Self { tag, version, payload: payload.into() }
    }

    /// Builds the `[tag, version, payload]` envelope.
    pub fn to_value(&self) -> Value {
        json!([self.tag.code(), self.version, self.payload])
    }

    /// Reads a `[tag, version, payload]` envelope.
    ///
    /// Only the envelope is checked here. Whether the payload matches its
    /// version is decided when the blob is loaded.
    pub fn from_value(value: Value) -> Result<Self> {
        let (code, version, payload): (u16, u32, Value) =
            serde_json::from_value(value).or_raise(|| ErrorKind::Envelope)?;
        let tag = TypeTag::try_from(code)?;
        Ok(Self { tag, version, payload })
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    pub fn from_json(json: impl AsRef<str>) -> Result<Self> {
        let value = serde_json::from_str::<Value>(json.as_ref()).or_raise(|| ErrorKind::Envelope)?;
        Self::from_value(value)
    }
}
