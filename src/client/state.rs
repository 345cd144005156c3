//! Local mirror of the journal reconciliation model.
//!
//! The client keeps one `JournalState` per user, merged the same way the
//! server does: one entry per calendar date, replaced wholesale on save.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::journal::{AchievementView, EntryView};

use super::storage::Storage;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalState {
    pub entries: Vec<EntryView>,
    #[serde(rename = "defaultAchievements", default)]
    pub default_achievements: Vec<AchievementView>,
}

impl JournalState {
    /// Replace the entry with a matching id, or append when it is new.
    pub fn upsert_entry(&mut self, entry: EntryView) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look up the entry for a calendar date. `date` is `YYYY-MM-DD`;
    /// stored dates carry a midnight-UTC suffix, so match on the prefix.
    pub fn entry_by_date(&self, date: &str) -> Option<&EntryView> {
        self.entries.iter().find(|e| e.date.starts_with(date))
    }

    /// Derive the achievement list for a date with no entry yet: clone the
    /// user's templates with fresh ids and `completed` reset to false. Not
    /// persisted until the user explicitly saves the day.
    pub fn achievements_for_new_day(&self) -> Vec<AchievementView> {
        self.default_achievements
            .iter()
            .map(|template| AchievementView {
                id: Uuid::new_v4(),
                text: template.text.clone(),
                emoji: template.emoji.clone(),
                completed: false,
            })
            .collect()
    }

    pub fn load(storage: &dyn Storage, user_id: Uuid) -> Self {
        storage
            .get(&storage_key(user_id))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn Storage, user_id: Uuid) {
        if let Ok(raw) = serde_json::to_string(self) {
            storage.set(&storage_key(user_id), &raw);
        }
    }
}

fn storage_key(user_id: Uuid) -> String {
    format!("journal-data-{}", user_id)
}
