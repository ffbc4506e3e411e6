use crate::error::TranscodeError;
use crate::locale::Locale;
use crate::models::Group;
use crate::persistence::{load_groups, save_groups, SlotStore};
use crate::scoring::Standings;
use crate::store::Roster;
use crate::transcode::{self, ExportFile, ExportFormat};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of replacing a collection from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported { groups: usize, records: usize },
    /// The file parsed but held no groups; the collection was left alone.
    NoValidData,
}

/// Owns one roster per scope (a guild, or a user in direct messages) and the
/// slot each is saved to.
///
/// Every mutation goes through [`Tracker::apply`], which recomputes and saves
/// once the mutation has run. Each scope has its own lock, so a slow save in
/// one scope never holds up another.
pub struct Tracker {
    slots: Arc<dyn SlotStore>,
    storage_key: String,
    locale: Locale,
    rosters: Mutex<HashMap<String, ScopeCell>>,
}

// None until the scope's slot has been read
type ScopeCell = Arc<Mutex<Option<Roster>>>;

impl Tracker {
    pub fn new(slots: Arc<dyn SlotStore>, storage_key: impl Into<String>, locale: Locale) -> Self {
        Self {
            slots,
            storage_key: storage_key.into(),
            locale,
            rosters: Mutex::new(HashMap::new()),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn slot_key(&self, scope: &str) -> String {
        format!("{}:{}", self.storage_key, scope)
    }

    // The map lock is only held long enough to find the scope's cell
    async fn cell(&self, scope: &str) -> ScopeCell {
        let mut rosters = self.rosters.lock().await;
        Arc::clone(rosters.entry(scope.to_string()).or_default())
    }

    async fn ensure_loaded<'a>(&self, cell: &'a mut Option<Roster>, scope: &str) -> &'a mut Roster {
        let roster = match cell.take() {
            Some(roster) => roster,
            None => {
                let groups = load_groups(self.slots.as_ref(), &self.slot_key(scope), self.locale).await;
                info!("Loaded {} group(s) for scope {}", groups.len(), scope);
                Roster::new(groups, self.locale)
            }
        };
        cell.insert(roster)
    }

    /// Runs a mutation against a scope's roster, then saves the recomputed
    /// collection. A failed save is logged; the in-memory change stands.
    pub async fn apply<T, F>(&self, scope: &str, mutation: F) -> T
    where
        F: FnOnce(&mut Roster) -> T,
    {
        let cell = self.cell(scope).await;
        let mut loaded = cell.lock().await;
        let roster = self.ensure_loaded(&mut loaded, scope).await;
        let outcome = mutation(roster);

        if let Err(e) = save_groups(self.slots.as_ref(), &self.slot_key(scope), roster.groups()).await {
            error!("Failed to save scope {}: {}", scope, e);
        }
        outcome
    }

    /// Recomputed snapshot of a scope.
    pub async fn snapshot(&self, scope: &str) -> Vec<Group> {
        let cell = self.cell(scope).await;
        let mut loaded = cell.lock().await;
        self.ensure_loaded(&mut loaded, scope).await.view()
    }

    pub async fn standings(&self, scope: &str) -> Standings {
        let cell = self.cell(scope).await;
        let mut loaded = cell.lock().await;
        self.ensure_loaded(&mut loaded, scope).await.standings()
    }

    /// Reads a roster without mutating or saving it.
    pub async fn inspect<T, F>(&self, scope: &str, read: F) -> T
    where
        F: FnOnce(&Roster) -> T,
    {
        let cell = self.cell(scope).await;
        let mut loaded = cell.lock().await;
        read(self.ensure_loaded(&mut loaded, scope).await)
    }

    pub async fn export(&self, scope: &str, format: ExportFormat, date: NaiveDate) -> Result<ExportFile, TranscodeError> {
        let groups = self.snapshot(scope).await;
        transcode::export_groups(&groups, format, self.locale, date)
    }

    /// Replaces a scope's collection from an uploaded file. On any parse error,
    /// or when the file holds no groups, the collection is untouched.
    pub async fn import(&self, scope: &str, filename: &str, bytes: &[u8]) -> Result<ImportOutcome, TranscodeError> {
        let groups = match transcode::import_file(filename, bytes) {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Import of '{}' into scope {} failed: {}", filename, scope, e);
                return Err(e);
            }
        };

        if groups.is_empty() {
            warn!("Import of '{}' into scope {} found no groups", filename, scope);
            return Ok(ImportOutcome::NoValidData);
        }

        let outcome = ImportOutcome::Imported {
            groups: groups.len(),
            records: groups.iter().map(|group| group.records.len()).sum(),
        };
        self.apply(scope, |roster| roster.import_all(groups)).await;
        info!("Imported '{}' into scope {}: {:?}", filename, scope, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_groups;
    use crate::persistence::MemorySlots;
    use crate::store::RecordPatch;

    fn tracker_with(slots: Arc<MemorySlots>) -> Tracker {
        Tracker::new(slots, "progress-analytics-data", Locale::English)
    }

    #[tokio::test]
    async fn first_access_loads_seed() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        let groups = tracker.snapshot("guild-1").await;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, seed_groups(Locale::English)[0].id);
        assert!(groups[0].records[0].coefficient.is_some());
    }

    #[tokio::test]
    async fn mutations_are_saved_to_the_scope_slot() {
        let slots = Arc::new(MemorySlots::new());
        let tracker = tracker_with(slots.clone());
        tracker
            .apply("guild-1", |roster| {
                roster.update_record(
                    "group-1",
                    "rec-1",
                    RecordPatch {
                        name: Some("Renamed".to_string()),
                        ..RecordPatch::default()
                    },
                )
            })
            .await;

        let raw = slots
            .read_slot("progress-analytics-data:guild-1")
            .await
            .unwrap()
            .unwrap();
        assert!(raw.contains("Renamed"));
        assert!(slots.read_slot("progress-analytics-data:guild-2").await.unwrap().is_none());

        // A fresh tracker over the same slots sees the change
        let reloaded = tracker_with(slots).snapshot("guild-1").await;
        assert_eq!(reloaded[0].records[0].name, "Renamed");
    }

    #[tokio::test]
    async fn scopes_are_independent() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        tracker.apply("a", |roster| roster.add_group()).await;
        assert_eq!(tracker.snapshot("a").await.len(), 2);
        assert_eq!(tracker.snapshot("b").await.len(), 1);
    }

    #[tokio::test]
    async fn busy_scope_does_not_block_others() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        tracker.snapshot("a").await;

        let busy = tracker.cell("a").await;
        let _held = busy.lock().await;
        tracker.apply("b", |roster| roster.add_group()).await;
        assert_eq!(tracker.snapshot("b").await.len(), 2);
    }

    #[tokio::test]
    async fn merged_exports_keep_ids_unique() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        let text = r#"[
            {"id":"group-1","name":"first","records":[{"id":"rec-1","name":"a","oldRank":3,"newRank":1}]},
            {"id":"group-1","name":"second","records":[{"id":"rec-1","name":"b","oldRank":2,"newRank":2}]}
        ]"#;
        tracker.import("g", "merged.json", text.as_bytes()).await.unwrap();

        assert!(tracker.apply("g", |roster| roster.delete_group("group-1")).await);
        let left = tracker.snapshot("g").await;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "second");
        assert_ne!(left[0].records[0].id, "rec-1");
    }

    #[tokio::test]
    async fn object_root_import_leaves_state_alone() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        tracker.apply("g", |roster| roster.add_group()).await;

        let outcome = tracker.import("g", "data.json", br#"{"not": "a list"}"#).await.unwrap();
        assert_eq!(outcome, ImportOutcome::NoValidData);
        assert_eq!(tracker.snapshot("g").await.len(), 2);
    }

    #[tokio::test]
    async fn broken_import_leaves_state_alone() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        let before = tracker.snapshot("g").await;

        assert!(tracker.import("g", "data.json", b"[{broken").await.is_err());
        assert!(tracker.import("g", "data.xlsx", b"not a workbook").await.is_err());
        assert!(tracker.import("g", "data.pdf", b"%PDF").await.is_err());
        assert_eq!(tracker.snapshot("g").await, before);
    }

    #[tokio::test]
    async fn import_replaces_the_collection() {
        let tracker = tracker_with(Arc::new(MemorySlots::new()));
        let csv = "Name,Previous Rank,Current Rank\nAnn,4,2\nBo,3,3\n";
        let outcome = tracker.import("g", "team.csv", csv.as_bytes()).await.unwrap();
        assert_eq!(outcome, ImportOutcome::Imported { groups: 1, records: 2 });

        let standings = tracker.standings("g").await;
        assert_eq!(standings.winner_name.as_deref(), Some("team"));
        assert_eq!(standings.rows.len(), 1);
    }
}
