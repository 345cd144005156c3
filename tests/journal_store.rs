//! Store-level tests against a real Postgres instance.
//!
//! Run with `DATABASE_URL` pointing at a scratch database:
//! `cargo test -- --ignored`

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use daydream_api::auth::jwt::verify_token;
use daydream_api::auth::rate_limit::RateLimitState;
use daydream_api::config::Config;
use daydream_api::handlers::auth::{login, register, LoginRequest, RegisterRequest};
use daydream_api::models::journal::{AchievementInput, DefaultAchievementInput, GoalInput};
use daydream_api::services::journal;
use daydream_api::AppState;

fn test_config() -> Config {
    Config {
        database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
        host: "127.0.0.1".into(),
        port: 5000,
        frontend_url: "http://localhost:3000".into(),
        jwt_secret: "store-test-secret".into(),
        jwt_ttl_secs: 604_800,
    }
}

async fn test_state() -> AppState {
    let config = test_config();
    let db = PgPool::connect(&config.database_url)
        .await
        .expect("connect to test database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");

    AppState {
        db,
        config: Arc::new(config),
        rate_limiter: RateLimitState::new(),
    }
}

fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

async fn register_user(state: &AppState, username: &str, password: &str) -> Uuid {
    let (_, Json(auth)) = register(
        State(state.clone()),
        Json(RegisterRequest {
            username: username.into(),
            password: password.into(),
        }),
    )
    .await
    .expect("register");
    auth.user.id
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_register_then_login_same_user() {
    let state = test_state().await;
    let username = unique_username("alice");

    let (_, Json(registered)) = register(
        State(state.clone()),
        Json(RegisterRequest {
            username: username.clone(),
            password: "pw123456".into(),
        }),
    )
    .await
    .unwrap();

    let Json(logged_in) = login(
        State(state.clone()),
        Json(LoginRequest {
            username: username.clone(),
            password: "pw123456".into(),
        }),
    )
    .await
    .unwrap();

    let reg_claims = verify_token(&registered.token, &state.config).unwrap().claims;
    let login_claims = verify_token(&logged_in.token, &state.config).unwrap().claims;

    assert_eq!(reg_claims.sub, login_claims.sub);
    assert_eq!(registered.user.id, logged_in.user.id);
    assert_eq!(login_claims.username, username);
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_duplicate_username_is_a_conflict() {
    let state = test_state().await;
    let username = unique_username("bob");

    register_user(&state, &username, "pw123456").await;

    let second = register(
        State(state.clone()),
        Json(RegisterRequest {
            username: username.clone(),
            password: "pw123456".into(),
        }),
    )
    .await;
    assert!(second.is_err());

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_login_with_wrong_password_fails() {
    let state = test_state().await;
    let username = unique_username("carol");
    register_user(&state, &username, "pw123456").await;

    let result = login(
        State(state.clone()),
        Json(LoginRequest {
            username,
            password: "wrong-password".into(),
        }),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_save_entry_is_an_idempotent_overwrite() {
    let state = test_state().await;
    let user_id = register_user(&state, &unique_username("dave"), "pw123456").await;
    let day = date("2024-01-05");

    journal::save_entry(
        &state.db,
        user_id,
        day,
        "first draft",
        &[GoalInput {
            text: "Read".into(),
            completed: false,
        }],
        &[],
    )
    .await
    .unwrap();

    journal::save_entry(
        &state.db,
        user_id,
        day,
        "second draft",
        &[
            GoalInput {
                text: "Read".into(),
                completed: true,
            },
            GoalInput {
                text: "Write".into(),
                completed: false,
            },
        ],
        &[AchievementInput {
            text: "Early rise".into(),
            emoji: "🌅".into(),
            completed: true,
        }],
    )
    .await
    .unwrap();

    let snapshot = journal::list_entries(&state.db, user_id).await.unwrap();
    assert_eq!(snapshot.entries.len(), 1);

    let entry = &snapshot.entries[0];
    assert_eq!(entry.date, "2024-01-05T00:00:00.000Z");
    assert_eq!(entry.content, "second draft");
    assert_eq!(entry.goals.len(), 2);
    assert_eq!(entry.achievements.len(), 1);
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_saving_empty_goals_removes_prior_goals() {
    let state = test_state().await;
    let user_id = register_user(&state, &unique_username("erin"), "pw123456").await;
    let day = date("2024-03-01");

    journal::save_entry(
        &state.db,
        user_id,
        day,
        "Hello",
        &[GoalInput {
            text: "Run".into(),
            completed: false,
        }],
        &[],
    )
    .await
    .unwrap();

    journal::save_entry(&state.db, user_id, day, "Hello", &[], &[])
        .await
        .unwrap();

    let snapshot = journal::list_entries(&state.db, user_id).await.unwrap();
    assert_eq!(snapshot.entries.len(), 1);
    assert!(snapshot.entries[0].goals.is_empty());
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_entries_are_unique_per_date_and_newest_first() {
    let state = test_state().await;
    let user_id = register_user(&state, &unique_username("frank"), "pw123456").await;

    for raw in ["2024-03-01", "2024-03-03", "2024-03-02", "2024-03-03"] {
        journal::save_entry(&state.db, user_id, date(raw), raw, &[], &[])
            .await
            .unwrap();
    }

    let snapshot = journal::list_entries(&state.db, user_id).await.unwrap();
    let dates: Vec<&str> = snapshot.entries.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(
        dates,
        vec![
            "2024-03-03T00:00:00.000Z",
            "2024-03-02T00:00:00.000Z",
            "2024-03-01T00:00:00.000Z",
        ]
    );
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_default_achievements_full_replace_and_uncompleted() {
    let state = test_state().await;
    let user_id = register_user(&state, &unique_username("grace"), "pw123456").await;

    journal::save_default_achievements(
        &state.db,
        user_id,
        &[
            DefaultAchievementInput {
                text: "Meditate".into(),
                emoji: "🧘".into(),
            },
            DefaultAchievementInput {
                text: "Walk".into(),
                emoji: "🚶".into(),
            },
        ],
    )
    .await
    .unwrap();

    journal::save_default_achievements(
        &state.db,
        user_id,
        &[DefaultAchievementInput {
            text: "Stretch".into(),
            emoji: "🤸".into(),
        }],
    )
    .await
    .unwrap();

    let snapshot = journal::list_entries(&state.db, user_id).await.unwrap();
    assert_eq!(snapshot.default_achievements.len(), 1);
    assert_eq!(snapshot.default_achievements[0].text, "Stretch");
    assert!(!snapshot.default_achievements[0].completed);
}

#[tokio::test]
#[ignore = "requires Postgres (set DATABASE_URL)"]
async fn test_end_to_end_alice_scenario() {
    let state = test_state().await;
    let username = unique_username("alice");

    register_user(&state, &username, "pw123456").await;

    let Json(auth) = login(
        State(state.clone()),
        Json(LoginRequest {
            username,
            password: "pw123456".into(),
        }),
    )
    .await
    .unwrap();
    let user_id = auth.user.id;

    // The client sends a full timestamp; the store keys on the calendar date
    let day = journal::canonical_entry_date("2024-03-01T15:04:05.000Z").unwrap();
    journal::save_entry(
        &state.db,
        user_id,
        day,
        "Hello",
        &[GoalInput {
            text: "Run".into(),
            completed: false,
        }],
        &[],
    )
    .await
    .unwrap();

    let snapshot = journal::list_entries(&state.db, user_id).await.unwrap();
    assert_eq!(snapshot.entries.len(), 1);

    let entry = &snapshot.entries[0];
    assert_eq!(entry.date, "2024-03-01T00:00:00.000Z");
    assert_eq!(entry.content, "Hello");
    assert_eq!(entry.goals.len(), 1);
    assert_eq!(entry.goals[0].text, "Run");
    assert!(!entry.goals[0].completed);
}
