use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Field names used by the tracker export and the derived fields.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const CREATION: &str = "creation";
    pub const TYPE: &str = "type";
    pub const STATUS: &str = "status";
    pub const MESSAGE_COUNT: &str = "message_count";
    pub const MODULE: &str = "module";
}

/// A single record value. Numeric-looking text is stored as a number,
/// everything else keeps its original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Opportunistic numeric conversion. Empty and non-finite inputs stay
    /// text; JSON has no representation for NaN or infinities.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Number(number),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// String form used for enum lookups and counter keys. Integral numbers
    /// print without a fraction, so `1.0` and `"1"` share a key.
    pub fn canonical(&self) -> String {
        match self {
            FieldValue::Number(n) => format!("{n}"),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl IssueRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(field.into(), value)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn message_count(&self) -> Option<f64> {
        self.get(fields::MESSAGE_COUNT).and_then(FieldValue::as_number)
    }

    pub fn status(&self) -> Option<&FieldValue> {
        self.get(fields::STATUS)
    }

    pub fn issue_type(&self) -> Option<&FieldValue> {
        self.get(fields::TYPE)
    }

    pub fn creation(&self) -> Option<&FieldValue> {
        self.get(fields::CREATION)
    }

    /// Derived module label; `None` until module inference ran.
    pub fn module(&self) -> Option<&str> {
        self.get(fields::MODULE).and_then(FieldValue::as_text)
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for IssueRecord {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Per-user details. Seeded empty by the user loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl UserRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(field.into(), value)
    }

    pub fn is_placeholder(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Value -> label table for one enumeration kind.
pub type EnumTable = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumKind {
    Component,
    Keyword,
    Priority,
    Resolution,
    Severity,
    Stage,
    Status,
    IssueType,
    Version,
}

impl EnumKind {
    pub const ALL: [EnumKind; 9] = [
        EnumKind::Component,
        EnumKind::Keyword,
        EnumKind::Priority,
        EnumKind::Resolution,
        EnumKind::Severity,
        EnumKind::Stage,
        EnumKind::Status,
        EnumKind::IssueType,
        EnumKind::Version,
    ];

    /// Tracker class name, also the key in the serialized collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumKind::Component => "component",
            EnumKind::Keyword => "keyword",
            EnumKind::Priority => "priority",
            EnumKind::Resolution => "resolution",
            EnumKind::Severity => "severity",
            EnumKind::Stage => "stage",
            EnumKind::Status => "status",
            EnumKind::IssueType => "type",
            EnumKind::Version => "version",
        }
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumKind {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lowered = input.trim().to_ascii_lowercase();
        EnumKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| format!("unknown enumeration kind {input:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_numeric_text() {
        assert_eq!(FieldValue::coerce("1.0"), FieldValue::Number(1.0));
        assert_eq!(FieldValue::coerce("42"), FieldValue::Number(42.0));
        assert_eq!(FieldValue::coerce(" 7 "), FieldValue::Number(7.0));
    }

    #[test]
    fn coerce_keeps_dates_lists_and_empty_as_text() {
        assert_eq!(
            FieldValue::coerce("2021-01-01"),
            FieldValue::Text("2021-01-01".into())
        );
        assert_eq!(
            FieldValue::coerce("['1', '2']"),
            FieldValue::Text("['1', '2']".into())
        );
        assert_eq!(FieldValue::coerce(""), FieldValue::Text(String::new()));
        assert_eq!(FieldValue::coerce("nan"), FieldValue::Text("nan".into()));
        assert_eq!(FieldValue::coerce("inf"), FieldValue::Text("inf".into()));
    }

    #[test]
    fn canonical_drops_integral_fraction() {
        assert_eq!(FieldValue::Number(1.0).canonical(), "1");
        assert_eq!(FieldValue::Number(2.5).canonical(), "2.5");
        assert_eq!(FieldValue::from("open").canonical(), "open");
    }

    #[test]
    fn enum_kind_names_round_trip() {
        for kind in EnumKind::ALL {
            assert_eq!(kind.as_str().parse::<EnumKind>().unwrap(), kind);
        }
        assert_eq!("TYPE".parse::<EnumKind>().unwrap(), EnumKind::IssueType);
        assert!("user".parse::<EnumKind>().is_err());
    }

    #[test]
    fn record_accessors_read_typed_fields() {
        let record: IssueRecord = [
            (fields::MESSAGE_COUNT, FieldValue::Number(3.0)),
            (fields::STATUS, FieldValue::Number(1.0)),
            (fields::MODULE, FieldValue::from("ctypes")),
        ]
        .into_iter()
        .collect();
        assert_eq!(record.message_count(), Some(3.0));
        assert_eq!(record.status(), Some(&FieldValue::Number(1.0)));
        assert_eq!(record.module(), Some("ctypes"));
        assert_eq!(record.issue_type(), None);
    }
}
