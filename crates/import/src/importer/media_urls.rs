use super::{applying, process};
use crate::MediaRecord;
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tagport_serialise::error::Result as SerialiseResult;
use tagport_serialise::{Migrations, Serialisable, Step, TypeTag, dump_value, load_value};
use tagport_strings::StringProcessor;
use tracing::instrument;

const EXAMPLES: &[&str] = &[
    "https://example.com/gallery/index.php?post=123456&page=show",
    "https://cdn3.expl.com/files/file_id?id=123456&token=0123456789abcdef",
];

/// Imports every URL known for a file, in the host's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaUrlsImporter {
    processor: StringProcessor,
}
impl MediaUrlsImporter {
    pub fn new(processor: StringProcessor) -> Self {
        Self { processor }
    }

    pub fn string_processor(&self) -> &StringProcessor {
        &self.processor
    }

    pub fn example_strings(&self) -> &'static [&'static str] {
        EXAMPLES
    }

    #[instrument(level = "debug", skip_all)]
    pub fn import(&self, record: &dyn MediaRecord) -> Vec<String> {
        process(&self.processor, record.urls())
    }
}
impl Display for MediaUrlsImporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "urls from media{}", applying(&self.processor))
    }
}

/// v1 carried nothing worth keeping.
fn upgrade_from_v1(_old: Value) -> SerialiseResult<Value> {
    Ok(dump_value(&StringProcessor::default()))
}

impl Serialisable for MediaUrlsImporter {
    const TAG: TypeTag = TypeTag::MediaUrlsImporter;
    const VERSION: u32 = 2;
    const MIGRATIONS: Migrations = Migrations::new(&[(1, upgrade_from_v1 as Step)]);

    fn to_payload(&self) -> Value {
        dump_value(&self.processor)
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        Ok(Self { processor: load_value(payload)? })
    }
}
