//! Journal store and reconciliation logic.
//!
//! Entries are keyed by (user, calendar date). Saving is an upsert on that
//! key followed by a wholesale replacement of the entry's goals and
//! achievements, all inside one transaction.

use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::journal::{
    AchievementInput, AchievementRow, AchievementView, DefaultAchievementInput,
    DefaultAchievementRow, EntryView, GoalInput, GoalRow, GoalView, JournalEntryRow,
    JournalSnapshot,
};

/// Reduce a client-submitted date to its calendar-date component. Accepts
/// both bare `YYYY-MM-DD` and full ISO timestamps; the time of day is
/// dropped so that one entry per user per day holds no matter what
/// timestamp the client sent.
pub fn canonical_entry_date(raw: &str) -> AppResult<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", raw)))
}

/// Render a stored calendar date in the canonical midnight-UTC form the
/// clients expect. Keeping the wire format fixed avoids the class of bug
/// where a stored local date renders as the previous or next day.
pub fn format_entry_date(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Every entry the user owns, newest date first, each with its goals and
/// achievements, plus the user's default-achievement templates.
pub async fn list_entries(db: &PgPool, user_id: Uuid) -> AppResult<JournalSnapshot> {
    let entries = sqlx::query_as::<_, JournalEntryRow>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1
        ORDER BY entry_date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let goals = sqlx::query_as::<_, GoalRow>(
        r#"
        SELECT g.* FROM goals g
        JOIN journal_entries je ON g.journal_entry_id = je.id
        WHERE je.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let achievements = sqlx::query_as::<_, AchievementRow>(
        r#"
        SELECT a.* FROM achievements a
        JOIN journal_entries je ON a.journal_entry_id = je.id
        WHERE je.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let defaults = sqlx::query_as::<_, DefaultAchievementRow>(
        "SELECT * FROM default_achievements WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let mut goals_by_entry: HashMap<Uuid, Vec<GoalView>> = HashMap::new();
    for goal in goals {
        goals_by_entry
            .entry(goal.journal_entry_id)
            .or_default()
            .push(GoalView {
                id: goal.id,
                text: goal.text,
                completed: goal.completed,
            });
    }

    let mut achievements_by_entry: HashMap<Uuid, Vec<AchievementView>> = HashMap::new();
    for achievement in achievements {
        achievements_by_entry
            .entry(achievement.journal_entry_id)
            .or_default()
            .push(AchievementView {
                id: achievement.id,
                text: achievement.text,
                emoji: achievement.emoji,
                completed: achievement.completed,
            });
    }

    let entries = entries
        .into_iter()
        .map(|entry| EntryView {
            id: entry.id,
            date: format_entry_date(entry.entry_date),
            content: entry.content,
            goals: goals_by_entry.remove(&entry.id).unwrap_or_default(),
            achievements: achievements_by_entry.remove(&entry.id).unwrap_or_default(),
        })
        .collect();

    // Templates are always reported uncompleted; completion state only
    // exists on the per-day copies.
    let default_achievements = defaults
        .into_iter()
        .map(|d| AchievementView {
            id: d.id,
            text: d.text,
            emoji: d.emoji,
            completed: false,
        })
        .collect();

    Ok(JournalSnapshot {
        entries,
        default_achievements,
    })
}

/// Upsert the entry for (user, date) and replace its children with the
/// submitted lists. One transaction: a failure at any step rolls the whole
/// save back, leaving the prior committed state untouched.
pub async fn save_entry(
    db: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    content: &str,
    goals: &[GoalInput],
    achievements: &[AchievementInput],
) -> AppResult<Uuid> {
    let mut tx = db.begin().await?;

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM journal_entries WHERE user_id = $1 AND entry_date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut *tx)
    .await?;

    let entry_id = match existing {
        Some(id) => {
            sqlx::query("UPDATE journal_entries SET content = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(content)
                .execute(&mut *tx)
                .await?;
            id
        }
        None => {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO journal_entries (id, user_id, entry_date, content) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(user_id)
            .bind(date)
            .bind(content)
            .execute(&mut *tx)
            .await?;
            id
        }
    };

    // Full replace: prior children are dropped even when the submitted
    // lists are empty.
    sqlx::query("DELETE FROM goals WHERE journal_entry_id = $1")
        .bind(entry_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM achievements WHERE journal_entry_id = $1")
        .bind(entry_id)
        .execute(&mut *tx)
        .await?;

    for goal in goals {
        sqlx::query("INSERT INTO goals (id, journal_entry_id, text, completed) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::new_v4())
            .bind(entry_id)
            .bind(&goal.text)
            .bind(goal.completed)
            .execute(&mut *tx)
            .await?;
    }

    for achievement in achievements {
        sqlx::query(
            "INSERT INTO achievements (id, journal_entry_id, text, emoji, completed) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(entry_id)
        .bind(&achievement.text)
        .bind(&achievement.emoji)
        .bind(achievement.completed)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(entry_id)
}

/// Replace the user's default-achievement templates wholesale.
pub async fn save_default_achievements(
    db: &PgPool,
    user_id: Uuid,
    items: &[DefaultAchievementInput],
) -> AppResult<()> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM default_achievements WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for item in items {
        sqlx::query("INSERT INTO default_achievements (id, user_id, text, emoji) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&item.text)
            .bind(&item.emoji)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_date_from_bare_date() {
        let date = canonical_entry_date("2024-01-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_canonical_date_drops_time_of_day() {
        let date = canonical_entry_date("2024-01-05T23:59:59.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_canonical_date_rejects_garbage() {
        assert!(canonical_entry_date("yesterday").is_err());
        assert!(canonical_entry_date("2024-13-01").is_err());
        assert!(canonical_entry_date("").is_err());
    }

    #[test]
    fn test_format_entry_date_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_entry_date(date), "2024-03-01T00:00:00.000Z");
    }

    #[test]
    fn test_canonicalize_then_format_round_trips() {
        let date = canonical_entry_date("2024-03-01T18:30:00.000Z").unwrap();
        assert_eq!(format_entry_date(date), "2024-03-01T00:00:00.000Z");
    }
}
