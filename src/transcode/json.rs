use crate::error::TranscodeError;
use crate::models::{new_group_id, new_record_id, Group};
use crate::scoring;
use serde_json::Value;
use std::collections::HashSet;

/// Imported ids longer than this are replaced; button ids embed group ids and
/// Discord caps those at 100 characters.
pub const MAX_IMPORTED_ID: usize = 64;

/// Pretty-printed collection with derived fields freshly recomputed.
pub fn to_json(groups: &[Group]) -> Result<String, TranscodeError> {
    Ok(serde_json::to_string_pretty(&scoring::recompute(groups))?)
}

/// Parses an exported collection. A root that isn't an array yields no groups;
/// derived fields are taken as-is and rebuilt on the next read.
pub fn from_json(bytes: &[u8]) -> Result<Vec<Group>, TranscodeError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    match serde_json::from_str::<Value>(text)? {
        root @ Value::Array(_) => {
            let mut groups: Vec<Group> = serde_json::from_value(root)?;
            reissue_ids(&mut groups);
            Ok(groups)
        }
        _ => Ok(Vec::new()),
    }
}

// Ids must be unique across the whole collection; repeats and oversized ids get fresh ones
fn reissue_ids(groups: &mut [Group]) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut claim = |id: &mut String, fresh: fn() -> String| {
        if id.is_empty() || id.chars().count() > MAX_IMPORTED_ID || !seen.insert(id.clone()) {
            *id = fresh();
            seen.insert(id.clone());
        }
    };

    for group in groups.iter_mut() {
        claim(&mut group.id, new_group_id);
        for record in group.records.iter_mut() {
            claim(&mut record.id, new_record_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn object_root_yields_nothing() {
        assert!(from_json(br#"{"groups": []}"#).unwrap().is_empty());
        assert!(from_json(b"42").unwrap().is_empty());
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(from_json(b"[{").is_err());
        assert!(from_json(br#"[{"records": "nope"}]"#).is_err());
    }

    #[test]
    fn export_carries_derived_fields() {
        let groups = vec![Group::new("g", vec![Record::ranked("a", 100.0, 80.0)])];
        let text = to_json(&groups).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "g");
        assert_eq!(value[0]["records"][0]["oldRank"], 100);
        assert!(value[0]["records"][0]["coefficient"].as_f64().unwrap() > 0.22);
        assert!(value[0]["averageCoefficient"].as_f64().unwrap() > 0.22);
    }

    #[test]
    fn repeated_ids_are_reissued() {
        let text = r#"[
            {"id":"group-1","name":"a","records":[{"id":"rec-1","name":"x"}]},
            {"id":"group-1","name":"b","records":[{"id":"rec-1","name":"y"},{"id":"rec-1","name":"z"}]}
        ]"#;
        let groups = from_json(text.as_bytes()).unwrap();

        assert_eq!(groups[0].id, "group-1");
        assert_eq!(groups[0].records[0].id, "rec-1");
        assert_ne!(groups[1].id, "group-1");
        assert!(groups[1].id.starts_with("group-"));

        let record_ids: HashSet<&str> = groups
            .iter()
            .flat_map(|group| group.records.iter().map(|record| record.id.as_str()))
            .collect();
        assert_eq!(record_ids.len(), 3);
    }

    #[test]
    fn oversized_ids_are_reissued() {
        let long = "g".repeat(200);
        let text = format!(r#"[{{"id":"{}","name":"a","records":[{{"id":"","name":"x"}}]}}]"#, long);
        let groups = from_json(text.as_bytes()).unwrap();
        assert!(groups[0].id.starts_with("group-"));
        assert!(groups[0].id.len() <= MAX_IMPORTED_ID);
        assert!(groups[0].records[0].id.starts_with("rec-"));
    }

    #[test]
    fn camel_case_exports_are_accepted() {
        let text = r#"[{"id":"group-1","name":"第一组","records":[
            {"id":"rec-1","name":"张三","oldRank":100,"newRank":80,"coefficient":0.2222},
            {"id":"rec-2","name":"","oldRank":"","newRank":"","coefficient":null}
        ],"totalCoefficient":0.2222,"averageCoefficient":0.2222}]"#;
        let groups = from_json(text.as_bytes()).unwrap();
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].records[1].old_rank, None);
    }
}
