use lazy_static::lazy_static;
use rank_bote::store::Destructive;
use regex::Regex;

lazy_static! {
    // roster_(confirm|cancel)_clear  or  roster_(confirm|cancel)_delete_<group id>
    static ref DECISION_ID: Regex =
        Regex::new(r"^roster_(confirm|cancel)_(clear|delete)(?:_(.+))?$").unwrap();
}

/// What the user clicked on a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Confirm(Destructive),
    Cancel,
}

fn encode(verb: &str, action: &Destructive) -> String {
    match action {
        Destructive::DeleteGroup { group_id } => format!("roster_{}_delete_{}", verb, group_id),
        Destructive::ClearAll => format!("roster_{}_clear", verb),
    }
}

pub fn confirm_id(action: &Destructive) -> String {
    encode("confirm", action)
}

pub fn cancel_id(action: &Destructive) -> String {
    encode("cancel", action)
}

pub fn parse_decision(custom_id: &str) -> Option<Decision> {
    let caps = DECISION_ID.captures(custom_id)?;
    if &caps[1] == "cancel" {
        return Some(Decision::Cancel);
    }

    match (&caps[2], caps.get(3)) {
        ("clear", None) => Some(Decision::Confirm(Destructive::ClearAll)),
        ("delete", Some(group_id)) => Some(Decision::Confirm(Destructive::DeleteGroup {
            group_id: group_id.as_str().to_string(),
        })),
        _ => None,
    }
}

/// Question shown above the Confirm / Cancel buttons.
pub fn prompt(action: &Destructive, group_name: Option<&str>) -> String {
    match action {
        Destructive::DeleteGroup { .. } => format!(
            "Delete group **{}** and all of its records? This can't be undone.",
            group_name.unwrap_or("(unnamed)")
        ),
        Destructive::ClearAll => {
            "Clear all data and go back to the starting roster? This can't be undone.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_ids_parse_back() {
        let delete = Destructive::DeleteGroup {
            group_id: "group-5f1c_a".to_string(),
        };
        assert_eq!(parse_decision(&confirm_id(&delete)), Some(Decision::Confirm(delete.clone())));
        assert_eq!(
            parse_decision(&confirm_id(&Destructive::ClearAll)),
            Some(Decision::Confirm(Destructive::ClearAll))
        );
        assert_eq!(parse_decision(&cancel_id(&delete)), Some(Decision::Cancel));
    }

    #[test]
    fn foreign_ids_are_ignored() {
        assert_eq!(parse_decision("roster_open_clear"), None);
        assert_eq!(parse_decision("roster_confirm_delete"), None);
        assert_eq!(parse_decision("roster_confirm_clear_extra"), None);
    }
}
