//! Typed scalar fields: schema, decoding into editable values, and encoding
//! back into the shapes the store expects.
//!
//! A schema is an ordered list of [`FieldSpec`]s. Decoding never fails: a
//! value that does not coerce becomes [`FieldValue::Unset`]. Encoding splits
//! the outermost record three ways (see [`EncodedFields`]) because sequences
//! must be written with a replace rather than merged into stale data.

use std::collections::BTreeMap;

use alink_types::path::parse_int_prefix;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// Declared type of a field. A field without a type is an opaque
/// pass-through string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Integer,
    Number,
    Date,
    Datetime,
    List,
    Multiselect,
    /// Any other widget type; values pass through untouched.
    #[serde(other)]
    Other,
}

impl FieldType {
    /// Sequence-valued types, which are always written with a replace.
    pub fn is_sequence(self) -> bool {
        matches!(self, Self::List | Self::Multiselect)
    }
}

/// One field descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Store the field at the asset metadata root instead of under `info`.
    /// Only honored for the outermost record.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub top_level: bool,
    /// Title types the field applies to; absent means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_title_types: Option<Vec<String>>,
    /// Element schema of a `list` field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            label: None,
            top_level: false,
            for_title_types: None,
            fields: Vec::new(),
        }
    }

    pub fn typed(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::new(name)
        }
    }

    pub fn top_level(mut self) -> Self {
        self.top_level = true;
        self
    }

    pub fn for_title_types<I, S>(mut self, title_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.for_title_types = Some(title_types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// Whether the field is written for `title_type`.
    pub fn applies_to(&self, title_type: &str) -> bool {
        self.for_title_types
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|t| t == title_type))
    }

    fn is_sequence(&self) -> bool {
        self.field_type.is_some_and(FieldType::is_sequence)
    }
}

/// An editable field value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Missing, or failed to coerce on load.
    #[default]
    Unset,
    /// Raw value, kept as stored.
    Value(Value),
    /// Milliseconds since the Unix epoch, for `date` and `datetime` fields.
    Timestamp(i64),
    /// Decoded elements of a `list` field.
    List(Vec<FieldRecord>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Value(Value::String(s.into()))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Self::Timestamp(ms) => Some(*ms),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        if value.is_null() {
            Self::Unset
        } else {
            Self::Value(value)
        }
    }
}

/// A decoded record: field name to value.
pub type FieldRecord = BTreeMap<String, FieldValue>;

/// A sequence field staged for a replace write.
#[derive(Clone, Debug, PartialEq)]
pub struct ListField {
    pub name: String,
    pub top_level: bool,
    pub value: Value,
}

/// Output of [`encode`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedFields {
    /// Fields for the nested `info` subtree (merged).
    pub nested: Map<String, Value>,
    /// Fields routed to the asset metadata root (merged).
    pub top_level: Map<String, Value>,
    /// Sequence fields, each written with its own replace.
    pub replace_lists: Vec<ListField>,
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode `values` against `schema`. When `top_level_values` is given the
/// record is the outermost one, and `top_level` fields are read from it.
pub fn decode(
    schema: &[FieldSpec],
    values: &Value,
    top_level_values: Option<&Value>,
) -> FieldRecord {
    schema
        .iter()
        .map(|spec| {
            let source = match top_level_values {
                Some(top) if spec.top_level => top,
                _ => values,
            };
            let raw = source.get(&spec.name).unwrap_or(&Value::Null);
            (spec.name.clone(), decode_field(spec, raw))
        })
        .collect()
}

fn decode_field(spec: &FieldSpec, raw: &Value) -> FieldValue {
    if raw.is_null() {
        return FieldValue::Unset;
    }
    match spec.field_type {
        Some(FieldType::Date | FieldType::Datetime) => match parse_timestamp(raw) {
            Some(ms) => FieldValue::Timestamp(ms),
            None => {
                debug!(field = %spec.name, value = %raw, "unparseable date, leaving unset");
                FieldValue::Unset
            }
        },
        Some(FieldType::List) => match raw {
            Value::Array(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| decode(&spec.fields, item, None))
                    .collect(),
            ),
            _ => {
                debug!(field = %spec.name, "list field is not a sequence, leaving unset");
                FieldValue::Unset
            }
        },
        _ => FieldValue::Value(raw.clone()),
    }
}

/// Parse a stored date: RFC 3339, a naive date-time or calendar date (read
/// as UTC), or epoch milliseconds.
pub fn parse_timestamp(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode the outermost record for `title_type`.
pub fn encode(schema: &[FieldSpec], record: &FieldRecord, title_type: &str) -> EncodedFields {
    encode_record(schema, record, title_type, true)
}

/// Encode a nested record (a `list` element): everything lands in `nested`.
pub fn encode_nested(
    schema: &[FieldSpec],
    record: &FieldRecord,
    title_type: &str,
) -> Map<String, Value> {
    encode_record(schema, record, title_type, false).nested
}

fn encode_record(
    schema: &[FieldSpec],
    record: &FieldRecord,
    title_type: &str,
    outermost: bool,
) -> EncodedFields {
    let mut out = EncodedFields::default();
    for spec in schema.iter().filter(|spec| spec.applies_to(title_type)) {
        let value = record.get(&spec.name).unwrap_or(&FieldValue::Unset);
        let encoded = encode_field(spec, value, title_type);

        if !outermost {
            out.nested.insert(spec.name.clone(), encoded);
        } else if spec.is_sequence() {
            out.replace_lists.push(ListField {
                name: spec.name.clone(),
                top_level: spec.top_level,
                value: encoded,
            });
        } else if spec.top_level {
            out.top_level.insert(spec.name.clone(), encoded);
        } else {
            out.nested.insert(spec.name.clone(), encoded);
        }
    }
    out
}

fn encode_field(spec: &FieldSpec, value: &FieldValue, title_type: &str) -> Value {
    match spec.field_type {
        Some(FieldType::Integer) => coerce_integer(value).map_or(Value::Null, Value::from),
        Some(FieldType::Number) => coerce_number(value)
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        Some(FieldType::Date) => Value::String(
            to_timestamp(value)
                .and_then(format_date)
                .unwrap_or_default(),
        ),
        Some(FieldType::Datetime) => Value::String(
            to_timestamp(value)
                .and_then(format_datetime)
                .unwrap_or_default(),
        ),
        Some(FieldType::List) => match value {
            FieldValue::List(records) => Value::Array(
                records
                    .iter()
                    .map(|record| Value::Object(encode_nested(&spec.fields, record, title_type)))
                    .collect(),
            ),
            FieldValue::Value(Value::Array(items)) => Value::Array(items.clone()),
            _ => Value::Array(Vec::new()),
        },
        Some(FieldType::Multiselect) => match value {
            FieldValue::Value(Value::Array(items)) => Value::Array(items.clone()),
            FieldValue::Value(Value::String(s)) if !s.is_empty() => {
                Value::Array(vec![Value::String(s.clone())])
            }
            _ => Value::Array(Vec::new()),
        },
        _ => passthrough(value),
    }
}

fn passthrough(value: &FieldValue) -> Value {
    match value {
        FieldValue::Unset => Value::String(String::new()),
        FieldValue::Value(v) => v.clone(),
        FieldValue::Timestamp(ms) => Value::from(*ms),
        FieldValue::List(_) => Value::Array(Vec::new()),
    }
}

fn to_timestamp(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Timestamp(ms) => Some(*ms),
        FieldValue::Value(raw) => parse_timestamp(raw),
        _ => None,
    }
}

/// Leading-integer coercion; non-numeric input yields `None`.
fn coerce_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Value(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        FieldValue::Value(Value::String(s)) => parse_int_prefix(s),
        FieldValue::Timestamp(ms) => Some(*ms),
        _ => None,
    }
}

/// Leading-float coercion; non-numeric input yields `None`.
fn coerce_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Value(Value::Number(n)) => n.as_f64(),
        FieldValue::Value(Value::String(s)) => parse_float_prefix(s),
        FieldValue::Timestamp(ms) => Some(*ms as f64),
        _ => None,
    }
}

/// The longest leading decimal literal of `s`, if any.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map_or(s.len(), |(i, _)| i);
    (1..=end)
        .rev()
        .find_map(|i| s[..i].parse::<f64>().ok())
        .filter(|f| f.is_finite())
}

/// Calendar date (`yyyy-mm-dd`, UTC) of a timestamp.
pub fn format_date(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// RFC 3339 date-time with second precision and offset.
pub fn format_datetime(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}
