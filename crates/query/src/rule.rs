use serde_json::{Value, json};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tagport_serialise::error::{ErrorKind as SerialiseErrorKind, Result as SerialiseResult};
use tagport_serialise::{TypeTag, dump_value, load_value, unpack};
use tagport_strings::StringMatch;

/// One step of a selection path through a JSON document.
///
/// Each rule maps the current set of selected values to a new set. Values a
/// rule does not apply to (an index into an object, say) select nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonRule {
    /// Values of object entries whose key matches, in document order.
    Key(StringMatch),
    /// An array element. Negative indices count from the end.
    Index(i64),
    /// Every array element or object value.
    All,
    /// The value itself and every value nested in it, pre-order.
    Descendants,
}
impl JsonRule {
    pub(crate) fn select<'a>(&self, roots: Vec<&'a Value>) -> Vec<&'a Value> {
        let mut selected = Vec::new();
        for root in roots {
            match (self, root) {
                (Self::Key(matcher), Value::Object(map)) => {
                    selected.extend(map.iter().filter(|(key, _)| matcher.matches(key)).map(|(_, value)| value));
                },
                (Self::Index(index), Value::Array(items)) => {
                    let position = match *index {
                        index if index < 0 => i64::try_from(items.len()).ok().map(|len| len + index),
                        index => Some(index),
                    };
                    if let Some(position) = position
                        && let Ok(position) = usize::try_from(position)
                        && let Some(item) = items.get(position)
                    {
                        selected.push(item);
                    }
                },
                (Self::All, Value::Array(items)) => selected.extend(items.iter()),
                (Self::All, Value::Object(map)) => selected.extend(map.values()),
                (Self::Descendants, root) => descend(root, &mut selected),
                _ => {},
            }
        }
        selected
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Key(matcher) => json!([0, dump_value(matcher)]),
            Self::Index(index) => json!([1, index]),
            Self::All => json!([2, null]),
            Self::Descendants => json!([3, null]),
        }
    }

    pub(crate) fn from_value(value: Value, version: u32) -> SerialiseResult<Self> {
        let (code, data): (u8, Value) = unpack(TypeTag::JsonFormula, version, value)?;
        Ok(match code {
            0 => Self::Key(load_value(data)?),
            1 => Self::Index(unpack(TypeTag::JsonFormula, version, data)?),
            2 => Self::All,
            3 => Self::Descendants,
            _ => exn::bail!(SerialiseErrorKind::MalformedPayload { tag: TypeTag::JsonFormula, version }),
        })
    }
}
impl Display for JsonRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Key(matcher) => write!(f, "keys matching {matcher}"),
            Self::Index(index) => write!(f, "item {index}"),
            Self::All => write!(f, "all items"),
            Self::Descendants => write!(f, "everything nested"),
        }
    }
}

fn descend<'a>(value: &'a Value, selected: &mut Vec<&'a Value>) {
    selected.push(value);
    match value {
        Value::Array(items) => items.iter().for_each(|item| descend(item, selected)),
        Value::Object(map) => map.values().for_each(|item| descend(item, selected)),
        _ => {},
    }
}
