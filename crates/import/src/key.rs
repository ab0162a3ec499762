use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Identifies the service holding every tag a file has, across all tag services.
pub const COMBINED_TAG_SERVICE_KEY: &[u8] = b"all known tags";

/// Opaque identifier of a tag service.
///
/// Persisted (and displayed) as lowercase hexadecimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey(Vec<u8>);
impl ServiceKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn combined_tags() -> Self {
        Self::new(COMBINED_TAG_SERVICE_KEY)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}
impl Default for ServiceKey {
    fn default() -> Self {
        Self::combined_tags()
    }
}
impl Display for ServiceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_hex())
    }
}
impl FromStr for ServiceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).or_raise(|| ErrorKind::InvalidServiceKey(s.to_string()))?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_key_hex() {
        let key = ServiceKey::combined_tags();
        assert_eq!(key.to_hex(), "616c6c206b6e6f776e2074616773");
        assert_eq!(key, ServiceKey::default());
    }

    #[test]
    fn test_parses_either_case() {
        let key: ServiceKey = "DEADbeef".parse().unwrap();
        assert_eq!(key.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(key.to_string(), "deadbeef");
    }

    #[test]
    fn test_rejects_non_hex() {
        let err = "not hex".parse::<ServiceKey>().unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidServiceKey("not hex".to_string()));
    }
}
