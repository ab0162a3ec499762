use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Every type that can be persisted as a [`VersionedBlob`](crate::VersionedBlob).
///
/// The numeric codes are part of the on-disk format. Never renumber a variant,
/// only append new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    StringConverter,
    StringMatch,
    StringSplitter,
    StringProcessor,
    JsonFormula,
    MediaTagsImporter,
    MediaUrlsImporter,
    JsonSidecarImporter,
    TxtSidecarImporter,
}
impl TypeTag {
    /// Stable numeric code written into blobs.
    pub const fn code(&self) -> u16 {
        match self {
            Self::StringConverter => 1,
            Self::StringMatch => 2,
            Self::StringSplitter => 3,
            Self::StringProcessor => 4,
            Self::JsonFormula => 10,
            Self::MediaTagsImporter => 20,
            Self::MediaUrlsImporter => 21,
            Self::JsonSidecarImporter => 22,
            Self::TxtSidecarImporter => 23,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StringConverter => "string converter",
            Self::StringMatch => "string match",
            Self::StringSplitter => "string splitter",
            Self::StringProcessor => "string processor",
            Self::JsonFormula => "json formula",
            Self::MediaTagsImporter => "media tags importer",
            Self::MediaUrlsImporter => "media urls importer",
            Self::JsonSidecarImporter => "json sidecar importer",
            Self::TxtSidecarImporter => "txt sidecar importer",
        }
    }
}
impl TryFrom<u16> for TypeTag {
    type Error = Error;
    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Ok(match code {
            1 => Self::StringConverter,
            2 => Self::StringMatch,
            3 => Self::StringSplitter,
            4 => Self::StringProcessor,
            10 => Self::JsonFormula,
            20 => Self::MediaTagsImporter,
            21 => Self::MediaUrlsImporter,
            22 => Self::JsonSidecarImporter,
            23 => Self::TxtSidecarImporter,
            _ => exn::bail!(ErrorKind::UnknownType(code)),
        })
    }
}
impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
