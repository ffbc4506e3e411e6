use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One participant inside a group.
///
/// `old_rank` / `new_rank` are `None` when unset, which is distinct from a
/// rank of zero. `coefficient` is derived and overwritten on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default = "new_record_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "rank_value")]
    pub old_rank: Option<f64>,
    #[serde(default, with = "rank_value")]
    pub new_rank: Option<f64>,
    #[serde(default)]
    pub coefficient: Option<f64>,
}

/// A named roster of participants compared as a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default = "new_group_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub total_coefficient: f64,
    #[serde(default)]
    pub average_coefficient: f64,
}

pub fn new_group_id() -> String {
    format!("group-{}", Uuid::new_v4())
}

pub fn new_record_id() -> String {
    format!("rec-{}", Uuid::new_v4())
}

impl Record {
    /// A record with an empty name and both ranks unset.
    pub fn blank() -> Self {
        Self {
            id: new_record_id(),
            name: String::new(),
            old_rank: None,
            new_rank: None,
            coefficient: None,
        }
    }

    pub fn ranked(name: impl Into<String>, old_rank: f64, new_rank: f64) -> Self {
        Self {
            name: name.into(),
            old_rank: Some(old_rank),
            new_rank: Some(new_rank),
            ..Self::blank()
        }
    }

    /// Both ranks present, so the record contributes a coefficient.
    pub fn is_rated(&self) -> bool {
        self.old_rank.is_some() && self.new_rank.is_some()
    }
}

impl Group {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            id: new_group_id(),
            name: name.into(),
            records,
            total_coefficient: 0.0,
            average_coefficient: 0.0,
        }
    }
}

/// The fixed dataset used at first start, after `clear`, and whenever the
/// stored slot can't be read.
pub fn seed_groups(locale: Locale) -> Vec<Group> {
    let labels = locale.labels();
    vec![Group {
        id: "group-1".to_string(),
        name: labels.seed_group_name.to_string(),
        records: vec![
            Record {
                id: "rec-1".to_string(),
                ..Record::ranked(labels.seed_members[0], 100.0, 80.0)
            },
            Record {
                id: "rec-2".to_string(),
                ..Record::ranked(labels.seed_members[1], 50.0, 55.0)
            },
        ],
        total_coefficient: 0.0,
        average_coefficient: 0.0,
    }]
}

/// Serde glue for ranks: a number when set, `""` when unset.
///
/// Reading is lenient: `null`, `""`, or a missing field mean unset, and
/// numeric strings are accepted as numbers.
pub mod rank_value {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(rank: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match rank {
            // Whole ranks are written without a fraction so files stay readable
            Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(*value as i64)
            }
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => parse_rank_text(&text),
            _ => None,
        })
    }

    /// Blank or non-numeric text is an unset rank.
    pub fn parse_rank_text(text: &str) -> Option<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_ranks_serialize_as_empty_string() {
        let record = Record {
            id: "rec-9".to_string(),
            ..Record::blank()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"id": "rec-9", "name": "", "oldRank": "", "newRank": "", "coefficient": null})
        );
    }

    #[test]
    fn whole_ranks_serialize_without_fraction() {
        let record = Record::ranked("Ann", 100.0, 80.5);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["oldRank"], json!(100));
        assert_eq!(value["newRank"], json!(80.5));
    }

    #[test]
    fn lenient_record_parsing() {
        let record: Record =
            serde_json::from_value(json!({"name": "Bo", "oldRank": "12", "newRank": null})).unwrap();
        assert!(record.id.starts_with("rec-"));
        assert_eq!(record.old_rank, Some(12.0));
        assert_eq!(record.new_rank, None);
        assert_eq!(record.coefficient, None);
        assert!(!record.is_rated());
    }

    #[test]
    fn zero_rank_is_not_unset() {
        let record: Record =
            serde_json::from_value(json!({"id": "r", "oldRank": 0, "newRank": ""})).unwrap();
        assert_eq!(record.old_rank, Some(0.0));
        assert_eq!(record.new_rank, None);
    }

    #[test]
    fn seed_has_two_rated_members() {
        let seed = seed_groups(Locale::Chinese);
        assert_eq!(seed.len(), 1);
        assert_eq!(seed[0].name, "第一组");
        assert_eq!(seed[0].records.len(), 2);
        assert!(seed[0].records.iter().all(Record::is_rated));
    }
}
