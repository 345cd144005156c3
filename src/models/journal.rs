use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Row types ------------------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct JournalEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct AchievementRow {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub text: String,
    pub emoji: String,
    pub completed: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct DefaultAchievementRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub emoji: String,
}

// Wire types -----------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalView {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementView {
    pub id: Uuid,
    pub text: String,
    pub emoji: String,
    pub completed: bool,
}

/// One journal entry as clients see it. `date` is always the canonical
/// midnight-UTC form, e.g. `2024-03-01T00:00:00.000Z`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryView {
    pub id: Uuid,
    pub date: String,
    pub content: String,
    pub goals: Vec<GoalView>,
    pub achievements: Vec<AchievementView>,
}

/// Response of `GET /api/journal/entries`: every entry the user owns plus
/// their default-achievement templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSnapshot {
    pub entries: Vec<EntryView>,
    #[serde(rename = "defaultAchievements")]
    pub default_achievements: Vec<AchievementView>,
}

// Request bodies -------------------------------------------------------------

/// Submitted child items carry no trusted id; the store assigns fresh ones
/// on every save (full-replace semantics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalInput {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementInput {
    pub text: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEntryRequest {
    /// Client-generated id, ignored by the server: entries are keyed by
    /// (user, date), not by the id the client happens to hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub goals: Vec<GoalInput>,
    #[serde(default)]
    pub achievements: Vec<AchievementInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAchievementInput {
    pub text: String,
    #[serde(default)]
    pub emoji: String,
}
