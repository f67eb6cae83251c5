//! Talent credits, grouped by role (`info/talent`).
//!
//! Sequence ids are positional: decoding places credits by their stored
//! `talent_note_seq_id`, encoding rewrites every id from the current order.

use std::collections::BTreeMap;

use alink_types::path::parse_int_prefix;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

const SEQ_ID_KEY: &str = "talent_note_seq_id";
const TALENT_TYPE_KEY: &str = "talent_type";

/// One credit. Fields the editor does not know about ride along in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credit {
    pub character_name: String,
    pub talent_first_name: String,
    pub talent_last_name: String,
    pub other_credits: String,
    pub sales_display_order: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credit {
    /// Set a field by its stored name.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "character_name" => self.character_name = value,
            "talent_first_name" => self.talent_first_name = value,
            "talent_last_name" => self.talent_last_name = value,
            "other_credits" => self.other_credits = value,
            "sales_display_order" => self.sales_display_order = value,
            other => {
                self.extra.insert(other.to_string(), Value::String(value));
            }
        }
    }

    fn from_stored(stored: &Value) -> Self {
        let text = |key: &str| {
            stored
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let extra = stored
            .as_object()
            .map(|map| {
                map.iter()
                    .filter(|(key, _)| !is_known_key(key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            character_name: text("character_name"),
            talent_first_name: text("talent_first_name"),
            talent_last_name: text("talent_last_name"),
            other_credits: text("other_credits"),
            sales_display_order: text("sales_display_order"),
            extra,
        }
    }
}

fn is_known_key(key: &str) -> bool {
    matches!(
        key,
        "character_name"
            | "talent_first_name"
            | "talent_last_name"
            | "other_credits"
            | "sales_display_order"
            | SEQ_ID_KEY
            | TALENT_TYPE_KEY
    )
}

/// Credits sharing a role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditGroup {
    pub group: String,
    pub talent_type: Option<String>,
    pub credits: Vec<Credit>,
}

impl CreditGroup {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            ..Self::default()
        }
    }
}

/// Decode the stored `{group: [credit, ...]}` map.
pub fn decode(raw: Option<&Value>) -> Vec<CreditGroup> {
    let Some(groups) = raw.and_then(Value::as_object) else {
        return Vec::new();
    };
    groups
        .iter()
        .map(|(group, stored)| {
            let stored: &[Value] = stored.as_array().map(Vec::as_slice).unwrap_or_default();
            let talent_type = stored
                .first()
                .and_then(|first| first.get(TALENT_TYPE_KEY))
                .and_then(Value::as_str)
                .map(str::to_string);

            let mut placed = BTreeMap::new();
            let mut rest = Vec::new();
            for (position, credit) in stored.iter().enumerate() {
                match seq_id(credit) {
                    Some(seq) if seq >= 1 => {
                        placed.insert((seq, position), Credit::from_stored(credit));
                    }
                    _ => rest.push(Credit::from_stored(credit)),
                }
            }
            debug!(group = %group, sequenced = placed.len(), unsequenced = rest.len(), "decoded credit group");

            CreditGroup {
                group: group.clone(),
                talent_type,
                credits: placed.into_values().chain(rest).collect(),
            }
        })
        .collect()
}

fn seq_id(credit: &Value) -> Option<i64> {
    match credit.get(SEQ_ID_KEY)? {
        Value::String(s) => parse_int_prefix(s),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Encode groups for a replace of `info/talent`. Sequence ids are the
/// 1-based position in the group, zero-padded to two digits.
pub fn encode(groups: &[CreditGroup]) -> Value {
    let mut out = Map::new();
    for group in groups {
        let credits = group
            .credits
            .iter()
            .enumerate()
            .map(|(index, credit)| {
                let mut stored = credit.extra.clone();
                stored.insert("character_name".into(), credit.character_name.clone().into());
                stored.insert(
                    "talent_first_name".into(),
                    credit.talent_first_name.clone().into(),
                );
                stored.insert(
                    "talent_last_name".into(),
                    credit.talent_last_name.clone().into(),
                );
                stored.insert("other_credits".into(), credit.other_credits.clone().into());
                stored.insert(
                    "sales_display_order".into(),
                    pad2(&credit.sales_display_order).into(),
                );
                if let Some(talent_type) = &group.talent_type {
                    stored.insert(TALENT_TYPE_KEY.into(), talent_type.clone().into());
                }
                stored.insert(SEQ_ID_KEY.into(), format!("{:02}", index + 1).into());
                Value::Object(stored)
            })
            .collect();
        out.insert(group.group.clone(), Value::Array(credits));
    }
    Value::Object(out)
}

/// Left-pad with zeros to two characters; empty stays empty.
fn pad2(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("{s:0>2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credit(first: &str, seq: Option<&str>) -> Value {
        let mut c = json!({"talent_first_name": first, "talent_type": "Actor"});
        if let Some(seq) = seq {
            c["talent_note_seq_id"] = json!(seq);
        }
        c
    }

    #[test]
    fn places_by_sequence_then_appends_the_rest() {
        let raw = json!({"cast": [
            credit("c", Some("03")),
            credit("x", None),
            credit("a", Some("01")),
            credit("b", Some("2")),
        ]});
        let groups = decode(Some(&raw));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].talent_type.as_deref(), Some("Actor"));
        let names: Vec<_> = groups[0]
            .credits
            .iter()
            .map(|c| c.talent_first_name.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c", "x"]);
    }

    #[test]
    fn coerces_fields_to_strings() {
        let raw = json!({"crew": [{
            "character_name": 7,
            "talent_last_name": null,
            "sales_display_order": "3",
            "role_id": 42,
        }]});
        let credit = &decode(Some(&raw))[0].credits[0];
        assert_eq!(credit.character_name, "");
        assert_eq!(credit.talent_last_name, "");
        assert_eq!(credit.sales_display_order, "3");
        assert_eq!(credit.extra.get("role_id"), Some(&json!(42)));
    }

    #[test]
    fn zero_and_garbage_sequence_ids_are_unsequenced() {
        let raw = json!({"cast": [credit("z", Some("00")), credit("g", Some("?")), credit("a", Some("1"))]});
        let names: Vec<_> = decode(Some(&raw))[0]
            .credits
            .iter()
            .map(|c| c.talent_first_name.clone())
            .collect();
        assert_eq!(names, ["a", "z", "g"]);
    }

    #[test]
    fn swap_then_encode_renumbers() {
        let raw = json!({"cast": [credit("a", Some("01")), credit("b", Some("02")), credit("c", Some("03"))]});
        let mut groups = decode(Some(&raw));
        groups[0].credits.swap(0, 2);

        let out = encode(&groups);
        let cast = out["cast"].as_array().unwrap();
        let seqs: Vec<_> = cast.iter().map(|c| c["talent_note_seq_id"].clone()).collect();
        let names: Vec<_> = cast.iter().map(|c| c["talent_first_name"].clone()).collect();
        assert_eq!(seqs, [json!("01"), json!("02"), json!("03")]);
        assert_eq!(names, [json!("c"), json!("b"), json!("a")]);
        assert!(cast.iter().all(|c| c["talent_type"] == json!("Actor")));
    }

    #[test]
    fn pads_sales_display_order() {
        let mut group = CreditGroup::new("cast");
        let mut c = Credit::default();
        c.set("sales_display_order", "4");
        c.set("nickname", "Bo");
        group.credits.push(c);
        group.credits.push(Credit::default());

        let out = encode(&[group]);
        assert_eq!(out["cast"][0]["sales_display_order"], json!("04"));
        assert_eq!(out["cast"][0]["nickname"], json!("Bo"));
        assert_eq!(out["cast"][1]["sales_display_order"], json!(""));
        assert!(out["cast"][0].get("talent_type").is_none());
    }

    #[test]
    fn missing_talent_is_empty() {
        assert!(decode(None).is_empty());
        assert!(decode(Some(&json!("x"))).is_empty());
        assert_eq!(encode(&[]), json!({}));
    }
}
