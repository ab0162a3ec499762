use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::ops::Deref;

/// A compiled regular expression that compares by its source text.
#[derive(Clone)]
pub struct Pattern(Regex);
impl Pattern {
    pub fn new(pattern: impl AsRef<str>) -> Result<Self> {
        let pattern = pattern.as_ref();
        Regex::new(pattern)
            .map(Self)
            .or_raise(|| ErrorKind::InvalidRegex(pattern.to_string()))
    }
}
impl Deref for Pattern {
    type Target = Regex;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}
impl Eq for Pattern {}
impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Pattern({:?})", self.0.as_str())
    }
}
impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "/{}/", self.0.as_str())
    }
}
