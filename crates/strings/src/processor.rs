use crate::{StringConverter, StringMatch, StringSplitter};
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{Serialisable, TypeTag, VersionedBlob, dump_value, load, unpack};
use tracing::instrument;

/// One stage of a [`StringProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStep {
    /// Rewrite every string.
    Convert(StringConverter),
    /// Keep only strings that match.
    Filter(StringMatch),
    /// Replace every string with its pieces.
    Split(StringSplitter),
}
impl ProcessingStep {
    pub fn makes_changes(&self) -> bool {
        match self {
            Self::Convert(converter) => converter.makes_changes(),
            Self::Filter(matcher) => matcher.makes_changes(),
            Self::Split(_) => true,
        }
    }

    fn apply(&self, strings: Vec<String>) -> Vec<String> {
        match self {
            Self::Convert(converter) => strings.iter().map(|s| converter.convert(s)).collect(),
            Self::Filter(matcher) => strings.into_iter().filter(|s| matcher.matches(s)).collect(),
            Self::Split(splitter) => strings.iter().flat_map(|s| splitter.split(s)).collect(),
        }
    }
}
impl Display for ProcessingStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Convert(converter) => write!(f, "{converter}"),
            Self::Filter(matcher) => write!(f, "keep {matcher}"),
            Self::Split(splitter) => write!(f, "{splitter}"),
        }
    }
}

/// An ordered, possibly empty pipeline of [`ProcessingStep`]s applied to a
/// whole list of strings at once.
///
/// The default processor has no steps and [`makes_changes`](Self::makes_changes)
/// returns `false`; callers use that to skip processing entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringProcessor {
    steps: Vec<ProcessingStep>,
}
impl StringProcessor {
    pub fn new(steps: impl IntoIterator<Item = ProcessingStep>) -> Self {
        Self { steps: steps.into_iter().collect() }
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn push(&mut self, step: ProcessingStep) {
        self.steps.push(step);
    }

    pub fn makes_changes(&self) -> bool {
        self.steps.iter().any(ProcessingStep::makes_changes)
    }

    #[instrument(level = "trace", skip_all, fields(count = strings.len(), steps = self.steps.len()))]
    pub fn process_strings(&self, strings: Vec<String>) -> Vec<String> {
        self.steps.iter().fold(strings, |strings, step| step.apply(strings))
    }
}
impl Display for StringProcessor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.steps.is_empty() {
            return write!(f, "no processing");
        }
        let parts = self.steps.iter().map(ProcessingStep::to_string).collect::<Vec<_>>();
        write!(f, "{}", parts.join(", then "))
    }
}
impl Serialisable for StringProcessor {
    const TAG: TypeTag = TypeTag::StringProcessor;
    const VERSION: u32 = 1;

    /// A list of step blobs, each carrying its own type tag and version.
    fn to_payload(&self) -> Value {
        Value::Array(
            self.steps
                .iter()
                .map(|step| match step {
                    ProcessingStep::Convert(converter) => dump_value(converter),
                    ProcessingStep::Filter(matcher) => dump_value(matcher),
                    ProcessingStep::Split(splitter) => dump_value(splitter),
                })
                .collect(),
        )
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let steps: Vec<Value> = unpack(Self::TAG, Self::VERSION, payload)?;
        let steps = steps
            .into_iter()
            .map(|step| -> SerialiseResult<ProcessingStep> {
                let blob = VersionedBlob::from_value(step)?;
                Ok(match blob.tag {
                    TypeTag::StringConverter => ProcessingStep::Convert(load(blob)?),
                    TypeTag::StringMatch => ProcessingStep::Filter(load(blob)?),
                    TypeTag::StringSplitter => ProcessingStep::Split(load(blob)?),
                    _ => exn::bail!(SerialiseErrorKind::MalformedPayload { tag: Self::TAG, version: Self::VERSION }),
                })
            })
            .collect::<SerialiseResult<Vec<_>>>()?;
        Ok(Self { steps })
    }
}
