//! Declarative importer definitions and their conversion into live importers.

use crate::Services;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use tagport_import::{
    Importer, JsonSidecarImporter, MediaTagsImporter, MediaUrlsImporter, ServiceKey, Sidecar, TxtSidecarImporter,
};
use tagport_query::{Content, JsonFormula, JsonRule};
use tagport_strings::{
    Conversion, MatchKind, Pattern, ProcessingStep, StringConverter, StringMatch, StringProcessor, StringSplitter,
};

/// One importer, as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImporterSpec {
    MediaTags {
        /// Service name; the combined tag service when omitted.
        #[serde(default)]
        service: Option<String>,
        #[serde(default)]
        processor: Vec<StepSpec>,
    },
    MediaUrls {
        #[serde(default)]
        processor: Vec<StepSpec>,
    },
    Json {
        #[serde(default)]
        suffix: String,
        #[serde(default)]
        remove_source_extension: bool,
        /// Conversions applied to the target's file name.
        #[serde(default)]
        filename: Vec<StepSpec>,
        /// Every string leaf when omitted.
        #[serde(default)]
        rules: Option<Vec<RuleSpec>>,
        #[serde(default)]
        content: ContentSpec,
        #[serde(default)]
        processor: Vec<StepSpec>,
    },
    Txt {
        #[serde(default)]
        suffix: String,
        #[serde(default)]
        remove_source_extension: bool,
        #[serde(default)]
        filename: Vec<StepSpec>,
        #[serde(default)]
        processor: Vec<StepSpec>,
    },
}

/// A string processing step. Consecutive conversions share one converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSpec {
    Prepend(String),
    Append(String),
    RemoveStart(usize),
    RemoveEnd(usize),
    ClipStart(usize),
    ClipEnd(usize),
    Reverse,
    Regex {
        pattern: String,
        #[serde(default)]
        replacement: String,
    },
    Filter(MatchSpec),
    Split {
        separator: String,
        #[serde(default)]
        max: Option<usize>,
    },
}

/// At most one of `fixed` and `regex`; neither matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSpec {
    pub fixed: Option<String>,
    pub regex: Option<String>,
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSpec {
    /// Object entries with exactly this key.
    Key(String),
    /// Object entries whose key matches this regular expression.
    KeyRegex(String),
    Index(i64),
    All,
    Descendants,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSpec {
    #[default]
    String,
    Json,
}

impl ImporterSpec {
    /// Builds the importer. `field` locates this definition in error reports.
    pub fn build(&self, services: &Services, field: &str) -> Result<Importer> {
        let processor_field = format!("{field}.processor");
        Ok(match self {
            Self::MediaTags { service, processor } => {
                let service = match service {
                    Some(name) => services.key(name).ok_or_raise(|| ErrorKind::invalid(format!("{field}.service")))?,
                    None => ServiceKey::combined_tags(),
                };
                MediaTagsImporter::new(build_processor(processor, &processor_field)?, service).into()
            },
            Self::MediaUrls { processor } => MediaUrlsImporter::new(build_processor(processor, &processor_field)?).into(),
            Self::Json { suffix, remove_source_extension, filename, rules, content, processor } => {
                let converter = build_converter(filename, "my_image.jpg.json", &format!("{field}.filename"))?;
                let formula = match rules {
                    Some(rules) => {
                        let rules = rules
                            .iter()
                            .enumerate()
                            .map(|(i, rule)| rule.build(&format!("{field}.rules[{i}]")))
                            .collect::<Result<Vec<_>>>()?;
                        JsonFormula::new(rules, content.build())
                    },
                    None => JsonFormula::new(JsonFormula::default().rules().to_vec(), content.build()),
                };
                JsonSidecarImporter::new(
                    build_processor(processor, &processor_field)?,
                    Sidecar::new(*remove_source_extension, suffix.as_str(), converter),
                    formula,
                )
                .into()
            },
            Self::Txt { suffix, remove_source_extension, filename, processor } => {
                let converter = build_converter(filename, "my_image.jpg.txt", &format!("{field}.filename"))?;
                TxtSidecarImporter::new(
                    build_processor(processor, &processor_field)?,
                    Sidecar::new(*remove_source_extension, suffix.as_str(), converter),
                )
                .into()
            },
        })
    }
}

impl StepSpec {
    /// `None` for steps that are not single-string conversions.
    fn conversion(&self, field: &str) -> Result<Option<Conversion>> {
        Ok(Some(match self {
            Self::Prepend(text) => Conversion::Prepend(text.clone()),
            Self::Append(text) => Conversion::Append(text.clone()),
            Self::RemoveStart(count) => Conversion::RemoveFromStart(*count),
            Self::RemoveEnd(count) => Conversion::RemoveFromEnd(*count),
            Self::ClipStart(count) => Conversion::ClipToStart(*count),
            Self::ClipEnd(count) => Conversion::ClipToEnd(*count),
            Self::Reverse => Conversion::Reverse,
            Self::Regex { pattern, replacement } => Conversion::RegexSub {
                pattern: Pattern::new(pattern).or_raise(|| ErrorKind::invalid(field))?,
                replacement: replacement.clone(),
            },
            Self::Filter(_) | Self::Split { .. } => return Ok(None),
        }))
    }
}

impl MatchSpec {
    fn build(&self, field: &str) -> Result<StringMatch> {
        let kind = match (&self.fixed, &self.regex) {
            (None, None) => MatchKind::Any,
            (Some(text), None) => MatchKind::Fixed(text.clone()),
            (None, Some(pattern)) => MatchKind::Regex(Pattern::new(pattern).or_raise(|| ErrorKind::invalid(field))?),
            (Some(_), Some(_)) => exn::bail!(ErrorKind::invalid(field)),
        };
        StringMatch::new(kind, self.min_chars, self.max_chars).or_raise(|| ErrorKind::invalid(field))
    }
}

impl RuleSpec {
    fn build(&self, field: &str) -> Result<JsonRule> {
        Ok(match self {
            Self::Key(key) => JsonRule::Key(StringMatch::fixed(key.as_str())),
            Self::KeyRegex(pattern) => JsonRule::Key(StringMatch::regex(pattern).or_raise(|| ErrorKind::invalid(field))?),
            Self::Index(index) => JsonRule::Index(*index),
            Self::All => JsonRule::All,
            Self::Descendants => JsonRule::Descendants,
        })
    }
}

impl ContentSpec {
    fn build(self) -> Content {
        match self {
            Self::String => Content::String,
            Self::Json => Content::Json,
        }
    }
}

fn build_processor(steps: &[StepSpec], field: &str) -> Result<StringProcessor> {
    let mut processor = StringProcessor::default();
    let mut pending = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let field = format!("{field}[{i}]");
        if let Some(conversion) = step.conversion(&field)? {
            pending.push(conversion);
            continue;
        }
        if !pending.is_empty() {
            processor.push(ProcessingStep::Convert(StringConverter::new(pending.drain(..), "")));
        }
        match step {
            StepSpec::Filter(matcher) => processor.push(ProcessingStep::Filter(matcher.build(&field)?)),
            StepSpec::Split { separator, max } => processor.push(ProcessingStep::Split(
                StringSplitter::new(separator.as_str(), *max).or_raise(|| ErrorKind::invalid(field.as_str()))?,
            )),
            _ => {},
        }
    }
    if !pending.is_empty() {
        processor.push(ProcessingStep::Convert(StringConverter::new(pending, "")));
    }
    Ok(processor)
}

/// Filename converters only take conversions.
fn build_converter(steps: &[StepSpec], example: &str, field: &str) -> Result<StringConverter> {
    let conversions = steps
        .iter()
        .enumerate()
        .map(|(i, step)| -> Result<Conversion> {
            let field = format!("{field}[{i}]");
            match step.conversion(&field)? {
                Some(conversion) => Ok(conversion),
                None => exn::bail!(ErrorKind::invalid(field)),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(StringConverter::new(conversions, example))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn build(spec: ImporterSpec) -> Result<Importer> {
        spec.build(&Services::default(), "importers[0]")
    }

    #[test]
    fn test_consecutive_conversions_share_a_converter() {
        let processor = build_processor(
            &[
                StepSpec::Split { separator: ",".to_string(), max: None },
                StepSpec::Prepend("a".to_string()),
                StepSpec::Append("b".to_string()),
                StepSpec::Filter(MatchSpec { fixed: Some("axb".to_string()), ..MatchSpec::default() }),
                StepSpec::Reverse,
            ],
            "processor",
        )
        .unwrap();
        assert_eq!(processor.steps().len(), 4);
        assert_eq!(processor.process_strings(vec!["x,y".to_string()]), vec!["bxa"]);
    }

    #[test]
    fn test_defaults() {
        let json = build(ImporterSpec::Json {
            suffix: String::new(),
            remove_source_extension: false,
            filename: vec![],
            rules: None,
            content: ContentSpec::String,
            processor: vec![],
        })
        .unwrap();
        assert_eq!(json, Importer::from(JsonSidecarImporter::default()));

        let tags = build(ImporterSpec::MediaTags { service: None, processor: vec![] }).unwrap();
        assert_eq!(tags, Importer::from(MediaTagsImporter::default()));
    }

    #[test]
    fn test_filename_converter() {
        let txt = build(ImporterSpec::Txt {
            suffix: ".tags".to_string(),
            remove_source_extension: true,
            filename: vec![StepSpec::Prepend("meta_".to_string())],
            processor: vec![],
        })
        .unwrap();
        let path = txt.expected_sidecar_path(std::path::Path::new("dir/photo.jpg")).unwrap();
        assert_eq!(path, Some(std::path::PathBuf::from("dir/meta_photo.tags.txt")));
    }

    #[rstest]
    #[case(ImporterSpec::MediaTags { service: Some("nobody".to_string()), processor: vec![] }, "importers[0].service")]
    #[case(
        ImporterSpec::MediaUrls { processor: vec![StepSpec::Regex { pattern: "(".to_string(), replacement: String::new() }] },
        "importers[0].processor[0]"
    )]
    #[case(
        ImporterSpec::MediaUrls { processor: vec![StepSpec::Reverse, StepSpec::Split { separator: String::new(), max: None }] },
        "importers[0].processor[1]"
    )]
    #[case(
        ImporterSpec::MediaUrls {
            processor: vec![StepSpec::Filter(MatchSpec { fixed: Some("a".to_string()), regex: Some("b".to_string()), ..MatchSpec::default() })]
        },
        "importers[0].processor[0]"
    )]
    #[case(
        ImporterSpec::Txt {
            suffix: String::new(),
            remove_source_extension: false,
            filename: vec![StepSpec::Split { separator: ".".to_string(), max: None }],
            processor: vec![],
        },
        "importers[0].filename[0]"
    )]
    fn test_invalid(#[case] spec: ImporterSpec, #[case] field: &str) {
        let err = build(spec).unwrap_err();
        assert_eq!(*err, ErrorKind::invalid(field));
    }
}
