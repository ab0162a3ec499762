use crate::Pattern;
use exn::ResultExt;
use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{Serialisable, TypeTag, unpack};

/// A single string → string rewrite.
///
/// Lengths count Unicode scalar values, not bytes, so no conversion ever
/// splits a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Drop the first `n` characters.
    RemoveFromStart(usize),
    /// Drop the last `n` characters.
    RemoveFromEnd(usize),
    /// Keep only the first `n` characters.
    ClipToStart(usize),
    /// Keep only the last `n` characters.
    ClipToEnd(usize),
    Prepend(String),
    Append(String),
    Reverse,
    /// Replace every match; the replacement may use `$1`-style group references.
    RegexSub { pattern: Pattern, replacement: String },
}
impl Conversion {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::RemoveFromStart(n) => s.chars().skip(*n).collect(),
            Self::RemoveFromEnd(n) => {
                let keep = s.chars().count().saturating_sub(*n);
                s.chars().take(keep).collect()
            },
            Self::ClipToStart(n) => s.chars().take(*n).collect(),
            Self::ClipToEnd(n) => {
                let skip = s.chars().count().saturating_sub(*n);
                s.chars().skip(skip).collect()
            },
            Self::Prepend(text) => format!("{text}{s}"),
            Self::Append(text) => format!("{s}{text}"),
            Self::Reverse => s.chars().rev().collect(),
            Self::RegexSub { pattern, replacement } => pattern.replace_all(s, replacement.as_str()).into_owned(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::RemoveFromStart(n) => json!([1, n]),
            Self::RemoveFromEnd(n) => json!([2, n]),
            Self::ClipToStart(n) => json!([3, n]),
            Self::ClipToEnd(n) => json!([4, n]),
            Self::Prepend(text) => json!([5, text]),
            Self::Append(text) => json!([6, text]),
            Self::Reverse => json!([7, null]),
            Self::RegexSub { pattern, replacement } => json!([8, [pattern.as_str(), replacement]]),
        }
    }

    fn from_value(value: Value) -> SerialiseResult<Self> {
        let malformed = || SerialiseErrorKind::MalformedPayload {
            tag: StringConverter::TAG,
            version: StringConverter::VERSION,
        };
        let (code, data): (u8, Value) = unpack(StringConverter::TAG, StringConverter::VERSION, value)?;
        let count = |data: Value| unpack::<usize>(StringConverter::TAG, StringConverter::VERSION, data);
        let text = |data: Value| unpack::<String>(StringConverter::TAG, StringConverter::VERSION, data);
        Ok(match code {
            1 => Self::RemoveFromStart(count(data)?),
            2 => Self::RemoveFromEnd(count(data)?),
            3 => Self::ClipToStart(count(data)?),
            4 => Self::ClipToEnd(count(data)?),
            5 => Self::Prepend(text(data)?),
            6 => Self::Append(text(data)?),
            7 => Self::Reverse,
            8 => {
                let (pattern, replacement): (String, String) =
                    unpack(StringConverter::TAG, StringConverter::VERSION, data)?;
                Self::RegexSub { pattern: Pattern::new(pattern).or_raise(malformed)?, replacement }
            },
            _ => exn::bail!(malformed()),
        })
    }
}
impl Display for Conversion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::RemoveFromStart(n) => write!(f, "remove the first {n} characters"),
            Self::RemoveFromEnd(n) => write!(f, "remove the last {n} characters"),
            Self::ClipToStart(n) => write!(f, "take the first {n} characters"),
            Self::ClipToEnd(n) => write!(f, "take the last {n} characters"),
            Self::Prepend(text) => write!(f, "prepend \"{text}\""),
            Self::Append(text) => write!(f, "append \"{text}\""),
            Self::Reverse => write!(f, "reverse"),
            Self::RegexSub { pattern, replacement } => write!(f, "replace {pattern} with \"{replacement}\""),
        }
    }
}

/// An ordered list of [`Conversion`]s applied as one string → string mapping,
/// plus an example input that editors preview the conversion against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringConverter {
    conversions: Vec<Conversion>,
    example: String,
}
impl StringConverter {
    pub fn new(conversions: impl IntoIterator<Item = Conversion>, example: impl Into<String>) -> Self {
        Self { conversions: conversions.into_iter().collect(), example: example.into() }
    }

    /// A converter that changes nothing, remembering an example input.
    pub fn with_example(example: impl Into<String>) -> Self {
        Self::new([], example)
    }

    pub fn conversions(&self) -> &[Conversion] {
        &self.conversions
    }

    pub fn example(&self) -> &str {
        &self.example
    }

    /// The example input run through this converter.
    pub fn example_result(&self) -> String {
        self.convert(&self.example)
    }

    pub fn makes_changes(&self) -> bool {
        !self.conversions.is_empty()
    }

    pub fn convert(&self, s: &str) -> String {
        self.conversions
            .iter()
            .fold(s.to_string(), |current, conversion| conversion.apply(&current))
    }
}
impl Display for StringConverter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.conversions.is_empty() {
            return write!(f, "no conversions");
        }
        let parts = self.conversions.iter().map(Conversion::to_string).collect::<Vec<_>>();
        write!(f, "{}", parts.join(", "))
    }
}
impl Serialisable for StringConverter {
    const TAG: TypeTag = TypeTag::StringConverter;
    const VERSION: u32 = 1;

    fn to_payload(&self) -> Value {
        let conversions = self.conversions.iter().map(Conversion::to_value).collect::<Vec<_>>();
        json!([conversions, self.example])
    }

    fn from_payload(payload: Value) -> SerialiseResult<Self> {
        let (conversions, example): (Vec<Value>, String) = unpack(Self::TAG, Self::VERSION, payload)?;
        let conversions = conversions
            .into_iter()
            .map(Conversion::from_value)
            .collect::<SerialiseResult<Vec<_>>>()?;
        Ok(Self { conversions, example })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tagport_serialise::{VersionedBlob, dump, load};

    #[rstest]
    #[case(Conversion::RemoveFromStart(3), "my_image.jpg", "image.jpg")]
    #[case(Conversion::RemoveFromStart(30), "short", "")]
    #[case(Conversion::RemoveFromEnd(4), "my_image.jpg", "my_image")]
    #[case(Conversion::ClipToStart(2), "my_image.jpg", "my")]
    #[case(Conversion::ClipToEnd(3), "my_image.jpg", "jpg")]
    #[case(Conversion::ClipToEnd(30), "short", "short")]
    #[case(Conversion::Prepend("creator:".to_string()), "some guy", "creator:some guy")]
    #[case(Conversion::Append(".bak".to_string()), "file", "file.bak")]
    #[case(Conversion::Reverse, "abc", "cba")]
    #[case(Conversion::RemoveFromStart(1), "éclair", "clair")]
    #[case(Conversion::ClipToEnd(1), "naïve✓", "✓")]
    fn test_conversion(#[case] conversion: Conversion, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(conversion.apply(input), expected);
    }

    #[test]
    fn test_regex_substitution_with_groups() {
        let conversion = Conversion::RegexSub {
            pattern: Pattern::new(r"^(\w+)_(\w+)").unwrap(),
            replacement: "$2-$1".to_string(),
        };
        assert_eq!(conversion.apply("my_image.jpg"), "image-my.jpg");
    }

    #[test]
    fn test_converter_applies_in_order() {
        let converter = StringConverter::new(
            [Conversion::RemoveFromEnd(4), Conversion::Append(".json".to_string())],
            "my_image.jpg",
        );
        assert!(converter.makes_changes());
        assert_eq!(converter.example_result(), "my_image.json");
        assert_eq!(converter.to_string(), "remove the last 4 characters, append \".json\"");
    }

    #[test]
    fn test_example_only_converter_is_identity() {
        let converter = StringConverter::with_example("my_image.jpg.txt");
        assert!(!converter.makes_changes());
        assert_eq!(converter.convert("anything"), "anything");
        assert_eq!(converter.to_string(), "no conversions");
    }

    #[test]
    fn test_payload_layout() {
        let converter = StringConverter::new(
            [Conversion::Prepend("a".to_string()), Conversion::Reverse],
            "example",
        );
        assert_eq!(converter.to_payload(), json!([[[5, "a"], [7, null]], "example"]));
        assert_eq!(load::<StringConverter>(dump(&converter)).unwrap(), converter);
    }

    #[test]
    fn test_rejects_invalid_persisted_regex() {
        let blob = VersionedBlob::new(TypeTag::StringConverter, 1, json!([[[8, ["(", ""]]], ""]));
        let err = load::<StringConverter>(blob).unwrap_err();
        assert!(matches!(*err, SerialiseErrorKind::MalformedPayload { .. }));
    }

    #[test]
    fn test_rejects_unknown_conversion_code() {
        let blob = VersionedBlob::new(TypeTag::StringConverter, 1, json!([[[99, null]], ""]));
        assert!(load::<StringConverter>(blob).is_err());
    }
}
