use super::{applying, process};
use crate::{MediaRecord, ServiceKey, ServiceRegistry};
use exn::ResultExt;
use serde_json::{Value, json};
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{Migrations, Serialisable, Step, TypeTag, dump_value, load_value, unpack};
use tagport_strings::StringProcessor;
use tracing::{debug, instrument};

const EXAMPLES: &[&str] = &[
    "blue eyes",
    "blonde hair",
    "skirt",
    "character:jane smith",
    "series:jane smith adventures",
    "creator:some guy",
];

/// Imports a file's current tags on one tag service.
///
/// Defaults to the combined service holding every tag the file has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaTagsImporter {
    processor: StringProcessor,
    service: ServiceKey,
}
impl MediaTagsImporter {
    pub fn new(processor: StringProcessor, service: ServiceKey) -> Self {
        Self { processor, service }
    }

    pub fn service(&self) -> &ServiceKey {
        &self.service
    }

    pub fn set_service(&mut self, service: ServiceKey) {
        self.service = service;
    }

    pub fn string_processor(&self) -> &StringProcessor {
        &self.processor
    }

    /// Preview values for editing a processor before any file is at hand.
    pub fn example_strings(&self) -> &'static [&'static str] {
        EXAMPLES
    }

    /// Tags come back in lexicographic order.
    #[instrument(level = "debug", skip_all, fields(service = %self.service))]
    pub fn import(&self, record: &dyn MediaRecord) -> Vec<String> {
        let tags = record.current_tags(&self.service).into_iter().collect();
        process(&self.processor, tags)
    }

    /// Label naming the service, or `unknown service` when the registry has
    /// never heard of it.
    pub fn describe(&self, services: &dyn ServiceRegistry) -> String {
        let name = services.name(&self.service).unwrap_or_else(|| {
            debug!(service = %self.service, "service name unavailable");
            "unknown service".to_string()
        });
        format!("\"{name}\" tags from media{}", applying(&self.processor))
    }
}

/// v1 was the bare hex service key.
fn upgrade_from_v1(old: Value) -> SerialiseResult<Value> {
    let service: String = unpack(TypeTag::MediaTagsImporter, 1, old)?;
    Ok(json!([dump_value(&StringProcessor::default()), service]))
}

impl Serialisable for MediaTagsImporter {
    const TAG: TypeTag = TypeTag::MediaTagsImporter;
    const VERSION: u32 = 2;
    const MIGRATIONS: Migrations = Migrations::new(&[(1, upgrade_from_v1 as Step)]);

    fn to_payload(&self) -> Value {
        json!([dump_value(&self.processor), self.service.to_hex()])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let (processor, service): (Value, String) = unpack(Self::TAG, Self::VERSION, payload)?;
        let service = service
            .parse::<ServiceKey>()
            .or_raise(|| SerialiseErrorKind::MalformedPayload { tag: Self::TAG, version: Self::VERSION })?;
        Ok(Self { processor: load_value(processor)?, service })
    }
}
