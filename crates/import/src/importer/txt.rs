use super::process;
use crate::error::Result;
use crate::sidecar::{self, Sidecar, SidecarImporter};
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use tagport_serialise::error::Result as SerialiseResult;
use tagport_serialise::{Migrations, Serialisable, Step, TypeTag, dump_value, load_value, unpack};
use tagport_strings::{StringConverter, StringProcessor};
use tracing::instrument;

const FILENAME_EXAMPLE: &str = "my_image.jpg.txt";

/// Imports one string per non-empty line of a text file next to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtSidecarImporter {
    processor: StringProcessor,
    sidecar: Sidecar,
}
impl Default for TxtSidecarImporter {
    fn default() -> Self {
        Self::new(StringProcessor::default(), Sidecar::with_example(FILENAME_EXAMPLE))
    }
}
impl TxtSidecarImporter {
    pub fn new(processor: StringProcessor, sidecar: Sidecar) -> Self {
        Self { processor, sidecar }
    }

    pub fn string_processor(&self) -> &StringProcessor {
        &self.processor
    }

    #[instrument(skip_all, fields(target = %target.display()))]
    pub fn import(&self, target: &Path) -> Result<Vec<String>> {
        let path = self.expected_sidecar_path(target)?;
        let Some(text) = sidecar::read(&path)? else {
            return Ok(Vec::new());
        };
        Ok(process(&self.processor, split_lines(&text)))
    }
}
impl SidecarImporter for TxtSidecarImporter {
    const EXTENSION: &'static str = "txt";

    fn sidecar(&self) -> &Sidecar {
        &self.sidecar
    }
}
impl Display for TxtSidecarImporter {
    /// Never mentions the processor, even one that makes changes.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "from .txt sidecar")
    }
}

/// Splits text on `\n`, `\r\n` or a lone `\r`, dropping a leading byte order
/// mark. Lines are trimmed of surrounding whitespace; blank ones are dropped.
pub fn split_lines(text: &str) -> Vec<String> {
    text.strip_prefix('\u{feff}')
        .unwrap_or(text)
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// v1 was the bare suffix.
fn upgrade_from_v1(old: Value) -> SerialiseResult<Value> {
    let suffix: String = unpack(TypeTag::TxtSidecarImporter, 1, old)?;
    Ok(json!([dump_value(&StringProcessor::default()), suffix]))
}

/// v2: `(processor, suffix)`.
fn upgrade_from_v2(old: Value) -> SerialiseResult<Value> {
    let (processor, suffix): (Value, String) = unpack(TypeTag::TxtSidecarImporter, 2, old)?;
    let converter = StringConverter::with_example(FILENAME_EXAMPLE);
    Ok(json!([processor, false, suffix, dump_value(&converter)]))
}

impl Serialisable for TxtSidecarImporter {
    const TAG: TypeTag = TypeTag::TxtSidecarImporter;
    const VERSION: u32 = 3;
    const MIGRATIONS: Migrations = Migrations::new(&[(1, upgrade_from_v1 as Step), (2, upgrade_from_v2 as Step)]);

    /// `(processor, remove_source_extension, suffix, filename_converter)`.
    fn to_payload(&self) -> Value {
        json!([
            dump_value(&self.processor),
            self.sidecar.remove_source_extension(),
            self.sidecar.suffix(),
            dump_value(self.sidecar.filename_converter()),
        ])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let (processor, remove_source_extension, suffix, converter): (Value, bool, String, Value) =
            unpack(Self::TAG, Self::VERSION, payload)?;
        Ok(Self {
            processor: load_value(processor)?,
            sidecar: Sidecar::new(remove_source_extension, suffix, load_value(converter)?),
        })
    }
}
