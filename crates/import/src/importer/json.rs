use super::{applying, process};
use crate::error::{ErrorKind, Result};
use crate::sidecar::{self, Sidecar, SidecarImporter};
use exn::ResultExt;
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use tagport_query::{JsonFormula, ParsingContext};
use tagport_serialise::error::Result as SerialiseResult;
use tagport_serialise::{Migrations, Serialisable, Step, TypeTag, dump_value, load_value, unpack};
use tagport_strings::{StringConverter, StringProcessor};
use tracing::instrument;

const FILENAME_EXAMPLE: &str = "my_image.jpg.json";

/// Imports strings from a JSON document next to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSidecarImporter {
    processor: StringProcessor,
    sidecar: Sidecar,
    formula: JsonFormula,
}
impl Default for JsonSidecarImporter {
    fn default() -> Self {
        Self::new(StringProcessor::default(), Sidecar::with_example(FILENAME_EXAMPLE), JsonFormula::default())
    }
}
impl JsonSidecarImporter {
    pub fn new(processor: StringProcessor, sidecar: Sidecar, formula: JsonFormula) -> Self {
        Self { processor, sidecar, formula }
    }

    /// Default sidecar location (`<file name>.json`) with the given formula.
    pub fn with_formula(formula: JsonFormula) -> Self {
        Self { formula, ..Self::default() }
    }

    pub fn string_processor(&self) -> &StringProcessor {
        &self.processor
    }

    pub fn formula(&self) -> &JsonFormula {
        &self.formula
    }

    /// Runs the formula over the sidecar, in the formula's order.
    ///
    /// No sidecar means no strings. A sidecar that cannot be read, or is not
    /// JSON, is an error.
    #[instrument(skip_all, fields(target = %target.display()))]
    pub fn import(&self, target: &Path) -> Result<Vec<String>> {
        let path = self.expected_sidecar_path(target)?;
        let Some(raw) = sidecar::read(&path)? else {
            return Ok(Vec::new());
        };
        let rows = self
            .formula
            .parse(&ParsingContext::default(), &raw, false)
            .or_raise(|| ErrorKind::SidecarParse(path))?;
        Ok(process(&self.processor, rows))
    }
}
impl SidecarImporter for JsonSidecarImporter {
    const EXTENSION: &'static str = "json";

    fn sidecar(&self) -> &Sidecar {
        &self.sidecar
    }
}
impl Display for JsonSidecarImporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "from JSON sidecar{}", applying(&self.processor))
    }
}

/// v1: `(suffix, formula)`.
fn upgrade_from_v1(old: Value) -> SerialiseResult<Value> {
    let (suffix, formula): (String, Value) = unpack(TypeTag::JsonSidecarImporter, 1, old)?;
    Ok(json!([dump_value(&StringProcessor::default()), suffix, formula]))
}

/// v2: `(processor, suffix, formula)`.
fn upgrade_from_v2(old: Value) -> SerialiseResult<Value> {
    let (processor, suffix, formula): (Value, String, Value) = unpack(TypeTag::JsonSidecarImporter, 2, old)?;
    let converter = StringConverter::with_example(FILENAME_EXAMPLE);
    Ok(json!([processor, false, suffix, dump_value(&converter), formula]))
}

impl Serialisable for JsonSidecarImporter {
    const TAG: TypeTag = TypeTag::JsonSidecarImporter;
    const VERSION: u32 = 3;
    const MIGRATIONS: Migrations = Migrations::new(&[(1, upgrade_from_v1 as Step), (2, upgrade_from_v2 as Step)]);

    /// `(processor, remove_source_extension, suffix, filename_converter, formula)`.
    fn to_payload(&self) -> Value {
        json!([
            dump_value(&self.processor),
            self.sidecar.remove_source_extension(),
            self.sidecar.suffix(),
            dump_value(self.sidecar.filename_converter()),
            dump_value(&self.formula),
        ])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let (processor, remove_source_extension, suffix, converter, formula): (Value, bool, String, Value, Value) =
            unpack(Self::TAG, Self::VERSION, payload)?;
        Ok(Self {
            processor: load_value(processor)?,
            sidecar: Sidecar::new(remove_source_extension, suffix, load_value(converter)?),
            formula: load_value(formula)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tagport_query::{Content, JsonRule};
    use tagport_serialise::{VersionedBlob, dump, load};
    use tagport_strings::{Conversion, ProcessingStep, StringMatch};

    #[test]
    fn test_imports_string_leaves() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photo.jpg");
        fs::write(dir.path().join("photo.jpg.json"), r#"["a","b"]"#).unwrap();
        assert_eq!(JsonSidecarImporter::default().import(&target).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_sidecar_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let imported = JsonSidecarImporter::default().import(&dir.path().join("photo.jpg")).unwrap();
        assert!(imported.is_empty());
    }

    #[test]
    fn test_formula_and_processor() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photo.jpg");
        fs::write(
            dir.path().join("photo_meta.json"),
            r#"{"title": "ignored", "tags": ["blue eyes", "skirt"]}"#,
        )
        .unwrap();
        let formula = JsonFormula::new([JsonRule::Key(StringMatch::fixed("tags")), JsonRule::All], Content::String);
        let processor =
            StringProcessor::new([ProcessingStep::Convert(StringConverter::new([Conversion::Append("!".to_string())], ""))]);
        let importer = JsonSidecarImporter::new(processor, Sidecar::new(true, "_meta", StringConverter::default()), formula);
        assert_eq!(importer.import(&target).unwrap(), vec!["blue eyes!", "skirt!"]);
        assert_eq!(importer.to_string(), "from JSON sidecar, applying append \"!\"");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = dir.path().join("photo.jpg.json");
        fs::write(&sidecar, "{oops").unwrap();
        let err = JsonSidecarImporter::default().import(&dir.path().join("photo.jpg")).unwrap_err();
        assert_eq!(*err, ErrorKind::SidecarParse(sidecar));
    }

    #[test]
    fn test_expected_sidecar_path() {
        let importer = JsonSidecarImporter::default();
        assert_eq!(importer.expected_sidecar_path(Path::new("a/photo.jpg")).unwrap(), Path::new("a/photo.jpg.json"));
        assert_eq!(importer.sidecar().filename_converter().example(), "my_image.jpg.json");
    }

    #[test]
    fn test_upgrades_v1_blob() {
        let formula = dump_value(&JsonFormula::default());
        let v1 = VersionedBlob::new(TypeTag::JsonSidecarImporter, 1, json!(["_tags", formula]));
        let importer = load::<JsonSidecarImporter>(v1).unwrap();
        assert_eq!(
            importer,
            JsonSidecarImporter::new(
                StringProcessor::default(),
                Sidecar::new(false, "_tags", StringConverter::with_example("my_image.jpg.json")),
                JsonFormula::default(),
            )
        );
        assert_eq!(
            dump(&importer).payload,
            json!([
                [4, 1, []],
                false,
                "_tags",
                [1, 1, [[], "my_image.jpg.json"]],
                [10, 2, [[[3, null]], 0, [4, 1, []]]],
            ])
        );
    }
}
