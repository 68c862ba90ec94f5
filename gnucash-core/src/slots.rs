use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Slots attached to one entity (or one `frame` level). Insertion order is
/// preserved; inserting an existing key keeps its position and overwrites
/// the value, so duplicate keys within a frame are last-write-wins.
pub type SlotMap = IndexMap<String, SlotValue>;

/// A decoded slot value.
///
/// Slots are the freeform key/value metadata GnuCash attaches to books,
/// commodities, accounts, and transactions. `Frame` nests to arbitrary
/// depth. Unknown value-type tags are carried through as `Other` so that
/// extensible application metadata never aborts a load.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotValue {
    Text(String),
    Integer(i64),
    Guid(String),
    Numeric(Decimal),
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    Frame(SlotMap),
    List(Vec<SlotValue>),
    Other { ty: String, raw: String },
}

impl SlotValue {
    /// The text content, for `Text`, `Guid`, and `Other` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) | SlotValue::Guid(s) => Some(s),
            SlotValue::Other { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&SlotMap> {
        match self {
            SlotValue::Frame(map) => Some(map),
            _ => None,
        }
    }
}
