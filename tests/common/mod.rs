//! Shared helpers for integration tests: an in-memory database plus
//! seeded accounts and catalog entries.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use coolkeys_store::commands::{auth_cmd, catalog_cmd};
use coolkeys_store::database::migrations::run_migrations;
use coolkeys_store::models::game::{CreateGamePayload, Game};
use coolkeys_store::models::user::RegisterPayload;
use coolkeys_store::AppState;

/// Fresh application state over an in-memory SQLite database.
/// A single connection keeps the in-memory database alive.
pub async fn test_state() -> AppState {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("options")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory pool");

    run_migrations(&pool).await.expect("migrations");

    AppState::new(pool)
}

/// Bootstrap a staff account and return its session token.
/// Usernames must be unique per test to stay clear of the login limiter.
pub async fn staff_session(state: &AppState, username: &str) -> String {
    auth_cmd::create_admin(
        state,
        "Store Staff".into(),
        username.into(),
        "Segura123".into(),
    )
    .await
    .expect("create staff");

    auth_cmd::login(state, username.into(), "Segura123".into())
        .await
        .expect("staff login")
        .session_token
}

/// Register a client account; registration logs in immediately.
pub async fn client_session(state: &AppState, username: &str) -> String {
    auth_cmd::register(
        state,
        RegisterPayload {
            name: "Cliente Teste".into(),
            username: username.into(),
            password: "Segura123".into(),
        },
    )
    .await
    .expect("register client")
    .session_token
}

/// Create a catalog game with the given price and discount.
pub async fn seed_game(
    state: &AppState,
    staff_token: &str,
    name: &str,
    price_cents: i64,
    discount_percent: i64,
) -> Game {
    catalog_cmd::create_game(
        state,
        staff_token,
        CreateGamePayload {
            name: name.into(),
            price_cents,
            description: "A key for testing".into(),
            discount_percent,
            category_id: None,
            publisher: None,
            release_date: None,
            cover_path: None,
            is_banner: false,
            is_prerelease: false,
        },
    )
    .await
    .expect("create game")
}
