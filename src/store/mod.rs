use crate::locale::Locale;
use crate::models::{seed_groups, Group, Record};
use crate::scoring::{self, Standings};

/// Fields a caller may change on a record. The coefficient is not among them;
/// it is always rebuilt from the ranks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the rank.
    pub old_rank: Option<Option<f64>>,
    pub new_rank: Option<Option<f64>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.old_rank.is_none() && self.new_rank.is_none()
    }

    fn apply_to(self, record: &mut Record) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(old_rank) = self.old_rank {
            record.old_rank = old_rank;
        }
        if let Some(new_rank) = self.new_rank {
            record.new_rank = new_rank;
        }
    }
}

/// Actions that go through a confirm/cancel decision before they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destructive {
    DeleteGroup { group_id: String },
    ClearAll,
}

impl Destructive {
    /// Runs the action once confirmed. Returns whether anything changed.
    pub fn apply(self, roster: &mut Roster) -> bool {
        match self {
            Destructive::DeleteGroup { group_id } => roster.delete_group(&group_id),
            Destructive::ClearAll => {
                roster.clear_all();
                true
            }
        }
    }
}

/// The in-memory collection of groups plus every mutation on it.
///
/// Mutations are total: an unknown id is a no-op reported as `false`.
#[derive(Debug, Clone)]
pub struct Roster {
    groups: Vec<Group>,
    locale: Locale,
}

impl Roster {
    pub fn new(groups: Vec<Group>, locale: Locale) -> Self {
        Self { groups, locale }
    }

    pub fn seeded(locale: Locale) -> Self {
        Self::new(seed_groups(locale), locale)
    }

    /// Raw groups as last written, derived fields possibly stale.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Recomputed projection; the only form handed out for display or export.
    pub fn view(&self) -> Vec<Group> {
        scoring::recompute(&self.groups)
    }

    pub fn standings(&self) -> Standings {
        scoring::standings(&self.groups)
    }

    /// Appends a group holding one blank record and returns its id.
    pub fn add_group(&mut self) -> String {
        let name = format!(
            "{} {}",
            self.locale.labels().new_group_prefix,
            self.groups.len() + 1
        );
        let group = Group::new(name, vec![Record::blank()]);
        let id = group.id.clone();
        self.groups.push(group);
        id
    }

    pub fn delete_group(&mut self, group_id: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|group| group.id != group_id);
        self.groups.len() != before
    }

    pub fn rename_group(&mut self, group_id: &str, name: &str) -> bool {
        match self.group_mut(group_id) {
            Some(group) => {
                group.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Appends a blank record and returns its id, or `None` if the group is unknown.
    pub fn add_record(&mut self, group_id: &str) -> Option<String> {
        let group = self.group_mut(group_id)?;
        let record = Record::blank();
        let id = record.id.clone();
        group.records.push(record);
        Some(id)
    }

    pub fn update_record(&mut self, group_id: &str, record_id: &str, patch: RecordPatch) -> bool {
        let record = self
            .group_mut(group_id)
            .and_then(|group| group.records.iter_mut().find(|record| record.id == record_id));

        match record {
            Some(record) => {
                patch.apply_to(record);
                true
            }
            None => false,
        }
    }

    pub fn delete_record(&mut self, group_id: &str, record_id: &str) -> bool {
        match self.group_mut(group_id) {
            Some(group) => {
                let before = group.records.len();
                group.records.retain(|record| record.id != record_id);
                group.records.len() != before
            }
            None => false,
        }
    }

    /// Back to the seed dataset.
    pub fn clear_all(&mut self) {
        self.groups = seed_groups(self.locale);
    }

    /// Wholesale replacement, no merge with what was there.
    pub fn import_all(&mut self, groups: Vec<Group>) {
        self.groups = groups;
    }

    /// Id of the group at a 1-based position.
    pub fn group_id_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|index| self.groups.get(index))
            .map(|group| group.id.as_str())
    }

    /// Group and record ids at 1-based positions.
    pub fn record_id_at(&self, group_position: usize, record_position: usize) -> Option<(&str, &str)> {
        let group = group_position
            .checked_sub(1)
            .and_then(|index| self.groups.get(index))?;
        let record = record_position
            .checked_sub(1)
            .and_then(|index| group.records.get(index))?;
        Some((group.id.as_str(), record.id.as_str()))
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    fn group_mut(&mut self, group_id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|group| group.id == group_id)
    }
}
