//! The closed family of importers.
//!
//! Media importers read from a record the host has already loaded. Sidecar
//! importers read a file derived from the target's path, through the
//! [`SidecarImporter`] capability.

mod json;
mod media_tags;
mod media_urls;
mod txt;

pub use self::json::JsonSidecarImporter;
pub use self::media_tags::MediaTagsImporter;
pub use self::media_urls::MediaUrlsImporter;
pub use self::txt::{TxtSidecarImporter, split_lines};

use crate::error::{ErrorKind, Result};
use crate::registry::importers;
use crate::sidecar::{Sidecar, SidecarImporter};
use crate::{MediaRecord, ServiceRegistry};
use std::path::{Path, PathBuf};
use tagport_serialise::error::Result as SerialiseResult;
use tagport_serialise::{Serialisable, TypeTag, VersionedBlob, dump};
use tagport_strings::StringProcessor;

/// What an importer reads from.
#[derive(Clone, Copy)]
pub enum Source<'a> {
    /// An already-loaded record, for media importers.
    Media(&'a dyn MediaRecord),
    /// The target file's path, for sidecar importers.
    File(&'a Path),
}

/// Any importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Importer {
    MediaTags(MediaTagsImporter),
    MediaUrls(MediaUrlsImporter),
    JsonSidecar(JsonSidecarImporter),
    TxtSidecar(TxtSidecarImporter),
}
impl Importer {
    /// Loads an importer of any kind from a blob of any released version.
    pub fn from_blob(blob: VersionedBlob) -> SerialiseResult<Self> {
        importers().load(blob)
    }

    /// Current-version blob.
    pub fn to_blob(&self) -> VersionedBlob {
        match self {
            Self::MediaTags(importer) => dump(importer),
            Self::MediaUrls(importer) => dump(importer),
            Self::JsonSidecar(importer) => dump(importer),
            Self::TxtSidecar(importer) => dump(importer),
        }
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Self::MediaTags(_) => MediaTagsImporter::TAG,
            Self::MediaUrls(_) => MediaUrlsImporter::TAG,
            Self::JsonSidecar(_) => JsonSidecarImporter::TAG,
            Self::TxtSidecar(_) => TxtSidecarImporter::TAG,
        }
    }

    /// Extracts strings from `source`, which must be the kind this importer reads.
    pub fn import(&self, source: Source<'_>) -> Result<Vec<String>> {
        match (self, source) {
            (Self::MediaTags(importer), Source::Media(record)) => Ok(importer.import(record)),
            (Self::MediaUrls(importer), Source::Media(record)) => Ok(importer.import(record)),
            (Self::JsonSidecar(importer), Source::File(target)) => importer.import(target),
            (Self::TxtSidecar(importer), Source::File(target)) => importer.import(target),
            (importer, _) => {
                let expected = match importer.sidecar() {
                    Some(_) => "a file path",
                    None => "a media record",
                };
                exn::bail!(ErrorKind::SourceMismatch { importer: importer.tag().as_str(), expected })
            },
        }
    }

    /// Human-readable label. Only media tag importers consult `services`.
    pub fn describe(&self, services: &dyn ServiceRegistry) -> String {
        match self {
            Self::MediaTags(importer) => importer.describe(services),
            Self::MediaUrls(importer) => importer.to_string(),
            Self::JsonSidecar(importer) => importer.to_string(),
            Self::TxtSidecar(importer) => importer.to_string(),
        }
    }

    pub fn string_processor(&self) -> &StringProcessor {
        match self {
            Self::MediaTags(importer) => importer.string_processor(),
            Self::MediaUrls(importer) => importer.string_processor(),
            Self::JsonSidecar(importer) => importer.string_processor(),
            Self::TxtSidecar(importer) => importer.string_processor(),
        }
    }

    /// Sidecar location settings, for importers that read one.
    pub fn sidecar(&self) -> Option<&Sidecar> {
        match self {
            Self::JsonSidecar(importer) => Some(importer.sidecar()),
            Self::TxtSidecar(importer) => Some(importer.sidecar()),
            Self::MediaTags(_) | Self::MediaUrls(_) => None,
        }
    }

    /// `None` for media importers.
    pub fn expected_sidecar_path(&self, target: &Path) -> Result<Option<PathBuf>> {
        match self {
            Self::JsonSidecar(importer) => importer.expected_sidecar_path(target).map(Some),
            Self::TxtSidecar(importer) => importer.expected_sidecar_path(target).map(Some),
            Self::MediaTags(_) | Self::MediaUrls(_) => Ok(None),
        }
    }
}
impl From<MediaTagsImporter> for Importer {
    fn from(importer: MediaTagsImporter) -> Self {
        Self::MediaTags(importer)
    }
}
impl From<MediaUrlsImporter> for Importer {
    fn from(importer: MediaUrlsImporter) -> Self {
        Self::MediaUrls(importer)
    }
}
impl From<JsonSidecarImporter> for Importer {
    fn from(importer: JsonSidecarImporter) -> Self {
        Self::JsonSidecar(importer)
    }
}
impl From<TxtSidecarImporter> for Importer {
    fn from(importer: TxtSidecarImporter) -> Self {
        Self::TxtSidecar(importer)
    }
}

fn process(processor: &StringProcessor, strings: Vec<String>) -> Vec<String> {
    match processor.makes_changes() {
        true => processor.process_strings(strings),
        false => strings,
    }
}

/// Label tail describing `processor`, empty when it changes nothing.
fn applying(processor: &StringProcessor) -> String {
    match processor.makes_changes() {
        true => format!(", applying {processor}"),
        false => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockMedia, MockServices};
    use crate::ServiceKey;
    use std::fs;

    #[test]
    fn test_dispatches_by_source() {
        let media = MockMedia::new().with_tags(ServiceKey::combined_tags(), ["skirt"]).with_urls(["https://a.example"]);
        let tags = Importer::from(MediaTagsImporter::default());
        assert_eq!(tags.import(Source::Media(&media)).unwrap(), vec!["skirt"]);
        let urls = Importer::from(MediaUrlsImporter::default());
        assert_eq!(urls.import(Source::Media(&media)).unwrap(), vec!["https://a.example"]);

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photo.jpg");
        fs::write(dir.path().join("photo.jpg.txt"), "one\ntwo").unwrap();
        let txt = Importer::from(TxtSidecarImporter::default());
        assert_eq!(txt.import(Source::File(&target)).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_rejects_wrong_source() {
        let media = MockMedia::new();
        let err = Importer::from(JsonSidecarImporter::default()).import(Source::Media(&media)).unwrap_err();
        assert_eq!(*err, ErrorKind::SourceMismatch { importer: "json sidecar importer", expected: "a file path" });
        let err = Importer::from(MediaUrlsImporter::default()).import(Source::File(Path::new("photo.jpg"))).unwrap_err();
        assert_eq!(*err, ErrorKind::SourceMismatch { importer: "media urls importer", expected: "a media record" });
    }

    #[test]
    fn test_sidecar_capability() {
        let json = Importer::from(JsonSidecarImporter::default());
        assert!(json.sidecar().is_some());
        assert_eq!(
            json.expected_sidecar_path(Path::new("photo.jpg")).unwrap(),
            Some(PathBuf::from("photo.jpg.json"))
        );
        let tags = Importer::from(MediaTagsImporter::default());
        assert!(tags.sidecar().is_none());
        assert_eq!(tags.expected_sidecar_path(Path::new("photo.jpg")).unwrap(), None);
    }

    #[test]
    fn test_describe() {
        let services = MockServices::new();
        assert_eq!(Importer::from(MediaTagsImporter::default()).describe(&services), "\"unknown service\" tags from media");
        assert_eq!(Importer::from(MediaUrlsImporter::default()).describe(&services), "urls from media");
        assert_eq!(Importer::from(JsonSidecarImporter::default()).describe(&services), "from JSON sidecar");
        assert_eq!(Importer::from(TxtSidecarImporter::default()).describe(&services), "from .txt sidecar");
    }

    #[test]
    fn test_noop_processor_is_identity() {
        use tagport_strings::{ProcessingStep, StringConverter, StringMatch};
        let noop = StringProcessor::new([
            ProcessingStep::Convert(StringConverter::with_example("x")),
            ProcessingStep::Filter(StringMatch::any()),
        ]);
        let strings = vec!["  Padded ".to_string(), String::new(), "b".to_string()];
        assert_eq!(process(&noop, strings.clone()), strings);
        assert_eq!(applying(&noop), "");
    }

    #[test]
    fn test_blob_round_trip_through_registry() {
        let importer = Importer::from(TxtSidecarImporter::default());
        let blob = importer.to_blob();
        assert_eq!(blob.tag, TypeTag::TxtSidecarImporter);
        assert_eq!(Importer::from_blob(blob).unwrap(), importer);
    }
}
