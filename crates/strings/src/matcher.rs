use crate::Pattern;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{Serialisable, TypeTag, unpack};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchKind {
    #[default]
    Any,
    Fixed(String),
    /// Matches anywhere in the string unless the pattern anchors itself.
    Regex(Pattern),
}

/// A predicate over strings: a [`MatchKind`] plus optional length bounds,
/// counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringMatch {
    kind: MatchKind,
    min_chars: Option<usize>,
    max_chars: Option<usize>,
}
impl StringMatch {
    pub fn new(kind: MatchKind, min_chars: Option<usize>, max_chars: Option<usize>) -> Result<Self> {
        if let (Some(min), Some(max)) = (min_chars, max_chars)
            && min > max
        {
            exn::bail!(ErrorKind::InvalidBounds { min, max });
        }
        Ok(Self { kind, min_chars, max_chars })
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        Self { kind: MatchKind::Fixed(text.into()), ..Self::default() }
    }

    pub fn regex(pattern: impl AsRef<str>) -> Result<Self> {
        Ok(Self { kind: MatchKind::Regex(Pattern::new(pattern)?), ..Self::default() })
    }

    pub fn kind(&self) -> &MatchKind {
        &self.kind
    }

    /// `false` when every string matches, i.e. filtering with this is a no-op.
    pub fn makes_changes(&self) -> bool {
        self.kind != MatchKind::Any || self.min_chars.is_some() || self.max_chars.is_some()
    }

    pub fn matches(&self, s: &str) -> bool {
        if self.min_chars.is_some() || self.max_chars.is_some() {
            let len = s.chars().count();
            if self.min_chars.is_some_and(|min| len < min) || self.max_chars.is_some_and(|max| len > max) {
                return false;
            }
        }
        match &self.kind {
            MatchKind::Any => true,
            MatchKind::Fixed(text) => s == text,
            MatchKind::Regex(pattern) => pattern.is_match(s),
        }
    }
}
impl Display for StringMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            MatchKind::Any => write!(f, "any string")?,
            MatchKind::Fixed(text) => write!(f, "exactly \"{text}\"")?,
            MatchKind::Regex(pattern) => write!(f, "matching {pattern}")?,
        }
        match (self.min_chars, self.max_chars) {
            (Some(min), Some(max)) => write!(f, " of {min} to {max} characters"),
            (Some(min), None) => write!(f, " of at least {min} characters"),
            (None, Some(max)) => write!(f, " of at most {max} characters"),
            (None, None) => Ok(()),
        }
    }
}
impl Serialisable for StringMatch {
    const TAG: TypeTag = TypeTag::StringMatch;
    const VERSION: u32 = 1;

    fn to_payload(&self) -> Value {
        let (code, data) = match &self.kind {
            MatchKind::Any => (0, Value::Null),
            MatchKind::Fixed(text) => (1, json!(text)),
            MatchKind::Regex(pattern) => (2, json!(pattern.as_str())),
        };
        json!([code, data, self.min_chars, self.max_chars])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let malformed = || SerialiseErrorKind::MalformedPayload { tag: Self::TAG, version: Self::VERSION };
        let (code, data, min_chars, max_chars): (u8, Value, Option<usize>, Option<usize>) =
            unpack(Self::TAG, Self::VERSION, payload)?;
        let kind = match code {
            0 => MatchKind::Any,
            1 => MatchKind::Fixed(unpack(Self::TAG, Self::VERSION, data)?),
            2 => {
                let pattern: String = unpack(Self::TAG, Self::VERSION, data)?;
                MatchKind::Regex(Pattern::new(pattern).or_raise(malformed)?)
            },
            _ => exn::bail!(malformed()),
        };
        Self::new(kind, min_chars, max_chars).or_raise(malformed)
    }
}
