//! JSON selector formulas.
//!
//! A [`JsonFormula`] walks a JSON document through an ordered list of
//! [`JsonRule`]s, then fetches [`Content`] from whatever values are left.
//! Output order is document order: objects keep their key order as written.
//!
//! ```
//! use tagport_query::{Content, JsonFormula, JsonRule, ParsingContext};
//! use tagport_strings::StringMatch;
//!
//! let formula = JsonFormula::new([JsonRule::Key(StringMatch::fixed("tags")), JsonRule::All], Content::String);
//! let raw = r#"{"tags": ["blue eyes", "skirt"], "title": "photo"}"#;
//! let strings = formula.parse(&ParsingContext::default(), raw, false).unwrap();
//! assert_eq!(strings, vec!["blue eyes", "skirt"]);
//! ```

pub mod error;
mod rule;

pub use crate::rule::JsonRule;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{Migrations, Serialisable, Step, TypeTag, dump_value, load_value, unpack};
use tagport_strings::StringProcessor;
use tracing::instrument;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// What to fetch from each selected value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Content {
    /// JSON string values, verbatim. Anything else is skipped.
    #[default]
    String,
    /// Compact JSON text of each selected value, whatever its type.
    Json,
}
impl Content {
    fn fetch(&self, value: &Value) -> Option<String> {
        match self {
            Self::String => value.as_str().map(str::to_string),
            Self::Json => Some(value.to_string()),
        }
    }

    fn code(&self) -> u8 {
        match self {
            Self::String => 0,
            Self::Json => 1,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::String),
            1 => Some(Self::Json),
            _ => None,
        }
    }
}

/// Values the caller knows about the document being parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingContext {
    /// Where the document came from, if it came from anywhere in particular.
    pub url: Option<String>,
}

/// A selector extracting strings from a JSON document.
///
/// The default formula selects every string leaf in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFormula {
    rules: Vec<JsonRule>,
    content: Content,
    processor: StringProcessor,
}
impl Default for JsonFormula {
    fn default() -> Self {
        Self::new([JsonRule::Descendants], Content::String)
    }
}
impl JsonFormula {
    pub fn new(rules: impl IntoIterator<Item = JsonRule>, content: Content) -> Self {
        Self {
            rules: rules.into_iter().collect(),
            content,
            processor: StringProcessor::default(),
        }
    }

    /// Post-processes everything the formula fetches.
    pub fn with_processor(mut self, processor: StringProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn rules(&self) -> &[JsonRule] {
        &self.rules
    }

    pub fn content(&self) -> Content {
        self.content
    }

    pub fn processor(&self) -> &StringProcessor {
        &self.processor
    }

    /// Parses `raw` as JSON and runs the formula over it.
    ///
    /// With `collapse_newlines`, every run of line breaks in a fetched string
    /// becomes a single space.
    #[instrument(skip_all, fields(url = context.url.as_deref(), raw_size = raw.len(), collapse_newlines = collapse_newlines))]
    pub fn parse(&self, context: &ParsingContext, raw: &str, collapse_newlines: bool) -> Result<Vec<String>> {
        let document = serde_json::from_str::<Value>(raw).or_raise(|| ErrorKind::InvalidJson)?;
        let mut strings = self.select(&document);
        if collapse_newlines {
            strings = strings.into_iter().map(|s| LINE_BREAKS.replace_all(&s, " ").into_owned()).collect();
        }
        if self.processor.makes_changes() {
            strings = self.processor.process_strings(strings);
        }
        Ok(strings)
    }

    /// Runs the formula over an already-parsed document.
    ///
    /// The formula's own processor is not applied here.
    pub fn select(&self, document: &Value) -> Vec<String> {
        self.rules
            .iter()
            .fold(vec![document], |roots, rule| rule.select(roots))
            .into_iter()
            .filter_map(|value| self.content.fetch(value))
            .collect()
    }
}
impl Display for JsonFormula {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let path = match self.rules.is_empty() {
            true => "the document".to_string(),
            false => self.rules.iter().map(JsonRule::to_string).collect::<Vec<_>>().join(" > "),
        };
        let content = match self.content {
            Content::String => "strings",
            Content::Json => "json",
        };
        write!(f, "{content} from {path}")?;
        if self.processor.makes_changes() {
            write!(f, ", applying {}", self.processor)?;
        }
        Ok(())
    }
}

/// v1 had no post-processing: `(rules, content)`.
fn upgrade_from_v1(old: Value) -> SerialiseResult<Value> {
    let (rules, content): (Value, Value) = unpack(TypeTag::JsonFormula, 1, old)?;
    Ok(json!([rules, content, dump_value(&StringProcessor::default())]))
}

impl Serialisable for JsonFormula {
    const TAG: TypeTag = TypeTag::JsonFormula;
    const VERSION: u32 = 2;
    const MIGRATIONS: Migrations = Migrations::new(&[(1, upgrade_from_v1 as Step)]);

    fn to_payload(&self) -> Value {
        let rules = self.rules.iter().map(JsonRule::to_value).collect::<Vec<_>>();
        json!([rules, self.content.code(), dump_value(&self.processor)])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let (rules, content, processor): (Vec<Value>, u8, Value) = unpack(Self::TAG, Self::VERSION, payload)?;
        let rules = rules
            .into_iter()
            .map(|rule| JsonRule::from_value(rule, Self::VERSION))
            .collect::<SerialiseResult<Vec<_>>>()?;
        let Some(content) = Content::from_code(content) else {
            exn::bail!(SerialiseErrorKind::MalformedPayload { tag: Self::TAG, version: Self::VERSION });
        };
        Ok(Self { rules, content, processor: load_value(processor)? })
    }
}
