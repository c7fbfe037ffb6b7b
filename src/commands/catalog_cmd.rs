//! Catalog browsing (public) and staff-side catalog management.

use crate::errors::AppError;
use crate::models::game::{
    Category, CategoryPayload, CategoryWithCount, CreateGamePayload, Game, GameDetail,
    GameWithCategory, HomeView, UpdateGamePayload,
};
use crate::validation;
use crate::AppState;

/// Home page data: banner carousel, the latest pre-release spotlight
/// and the category menu. Public.
pub async fn get_home(state: &AppState) -> Result<HomeView, AppError> {
    let banner_games = sqlx::query_as::<_, Game>(
        "SELECT * FROM games WHERE is_banner = 1 AND is_deleted = 0 ORDER BY id ASC",
    )
    .fetch_all(&state.db)
    .await?;

    // Most recently added pre-release; the banner hides when there is none.
    let prerelease_spotlight = sqlx::query_as::<_, Game>(
        "SELECT * FROM games WHERE is_prerelease = 1 AND is_deleted = 0
         ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(&state.db)
    .await?;

    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&state.db)
            .await?;

    Ok(HomeView {
        banner_games,
        prerelease_spotlight,
        categories,
    })
}

/// Catalog listing with optional search and category filter. Public;
/// soft-deleted games appear only for staff sessions asking for them.
pub async fn get_games(
    state: &AppState,
    session_token: Option<&str>,
    search: Option<String>,
    category_id: Option<i64>,
    show_deleted: bool,
) -> Result<Vec<GameWithCategory>, AppError> {
    let is_staff = session_token
        .map(|t| crate::auth::guard::validate_staff(state, t).is_ok())
        .unwrap_or(false);

    let mut query = String::from(
        "SELECT g.*, c.name AS category_name
         FROM games g
         LEFT JOIN categories c ON g.category_id = c.id
         WHERE 1=1",
    );

    if !(is_staff && show_deleted) {
        query.push_str(" AND g.is_deleted = 0");
    }

    if category_id.is_some() {
        query.push_str(" AND g.category_id = ?");
    }

    if search.is_some() {
        query.push_str(" AND LOWER(g.name) LIKE ?");
    }

    query.push_str(" ORDER BY g.name ASC");

    let mut q = sqlx::query_as::<_, GameWithCategory>(&query);

    if let Some(id) = category_id {
        q = q.bind(id);
    }

    if let Some(term) = search {
        q = q.bind(format!("%{}%", term.to_lowercase()));
    }

    let games = q.fetch_all(&state.db).await?;

    Ok(games)
}

/// Game detail page: the game plus up to 4 random games from the same
/// category. Public.
pub async fn get_game(state: &AppState, game_id: i64) -> Result<GameDetail, AppError> {
    let game = sqlx::query_as::<_, GameWithCategory>(
        "SELECT g.*, c.name AS category_name
         FROM games g
         LEFT JOIN categories c ON g.category_id = c.id
         WHERE g.id = ?",
    )
    .bind(game_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Game not found".into()))?;

    let related = match game.category_id {
        Some(category_id) => {
            sqlx::query_as::<_, Game>(
                "SELECT * FROM games
                 WHERE category_id = ? AND is_deleted = 0 AND id != ?
                 ORDER BY RANDOM() LIMIT 4",
            )
            .bind(category_id)
            .bind(game_id)
            .fetch_all(&state.db)
            .await?
        }
        None => Vec::new(),
    };

    Ok(GameDetail { game, related })
}

/// Categories with their live game counts. Public.
pub async fn get_categories(state: &AppState) -> Result<Vec<CategoryWithCount>, AppError> {
    let categories = sqlx::query_as::<_, CategoryWithCount>(
        "SELECT c.id, c.name, c.description, c.is_featured,
                COUNT(g.id) AS game_count
         FROM categories c
         LEFT JOIN games g ON c.id = g.category_id AND g.is_deleted = 0
         GROUP BY c.id
         ORDER BY c.name ASC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(categories)
}

/// Create a category (staff only).
pub async fn create_category(
    state: &AppState,
    session_token: &str,
    payload: CategoryPayload,
) -> Result<Category, AppError> {
    crate::auth::guard::validate_staff(state, session_token)?;

    validation::validate_category_name(&payload.name).map_err(AppError::Validation)?;
    let trimmed = payload.name.trim();

    let result = sqlx::query(
        "INSERT INTO categories (name, description, is_featured) VALUES (?, ?, ?)",
    )
    .bind(trimmed)
    .bind(&payload.description)
    .bind(payload.is_featured)
    .execute(&state.db)
    .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_rowid();
            let category =
                sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
                    .bind(id)
                    .fetch_one(&state.db)
                    .await?;
            Ok(category)
        }
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(AppError::Validation("Category already exists".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a category (staff only).
pub async fn update_category(
    state: &AppState,
    session_token: &str,
    category_id: i64,
    payload: CategoryPayload,
) -> Result<Category, AppError> {
    crate::auth::guard::validate_staff(state, session_token)?;

    validation::validate_category_name(&payload.name).map_err(AppError::Validation)?;

    let result = sqlx::query(
        "UPDATE categories SET name = ?, description = ?, is_featured = ? WHERE id = ?",
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.is_featured)
    .bind(category_id)
    .execute(&state.db)
    .await;

    match result {
        Ok(res) if res.rows_affected() == 0 => {
            Err(AppError::NotFound("Category not found".into()))
        }
        Ok(_) => {
            let category =
                sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
                    .bind(category_id)
                    .fetch_one(&state.db)
                    .await?;
            Ok(category)
        }
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(AppError::Validation("Category already exists".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a category (staff only). Its games are detached, not deleted.
pub async fn delete_category(
    state: &AppState,
    session_token: &str,
    category_id: i64,
) -> Result<(), AppError> {
    crate::auth::guard::validate_staff(state, session_token)?;

    let res = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(category_id)
        .execute(&state.db)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".into()));
    }

    Ok(())
}

fn validate_game_fields(
    name: &str,
    price_cents: i64,
    discount_percent: i64,
    description: &str,
) -> Result<(), AppError> {
    validation::validate_game_name(name).map_err(AppError::Validation)?;
    validation::validate_price_cents(price_cents).map_err(AppError::Validation)?;
    validation::validate_discount_percent(discount_percent).map_err(AppError::Validation)?;
    validation::validate_description(description).map_err(AppError::Validation)?;
    Ok(())
}

/// Create a game (staff only).
pub async fn create_game(
    state: &AppState,
    session_token: &str,
    payload: CreateGamePayload,
) -> Result<Game, AppError> {
    let session = crate::auth::guard::validate_staff(state, session_token)?;

    validate_game_fields(
        &payload.name,
        payload.price_cents,
        payload.discount_percent,
        &payload.description,
    )?;

    let res = sqlx::query(
        "INSERT INTO games (name, price_cents, description, discount_percent, category_id,
                            publisher, release_date, cover_path, is_banner, is_prerelease)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(payload.name.trim())
    .bind(payload.price_cents)
    .bind(validation::sanitize_string(&payload.description))
    .bind(payload.discount_percent)
    .bind(payload.category_id)
    .bind(payload.publisher.as_deref().unwrap_or("CoolKeys"))
    .bind(&payload.release_date)
    .bind(&payload.cover_path)
    .bind(payload.is_banner)
    .bind(payload.is_prerelease)
    .execute(&state.db)
    .await?;

    let id = res.last_insert_rowid();

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "CREATE_GAME",
        &format!("Created game: {}", payload.name.trim()),
        None,
    )
    .await;

    let game = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    Ok(game)
}

/// Update a game (staff only). The payload carries is_deleted, so staff
/// can also restore a soft-deleted game from here.
pub async fn update_game(
    state: &AppState,
    session_token: &str,
    game_id: i64,
    payload: UpdateGamePayload,
) -> Result<Game, AppError> {
    let session = crate::auth::guard::validate_staff(state, session_token)?;

    validate_game_fields(
        &payload.name,
        payload.price_cents,
        payload.discount_percent,
        &payload.description,
    )?;

    let res = sqlx::query(
        "UPDATE games
         SET name = ?, price_cents = ?, description = ?, discount_percent = ?,
             category_id = ?, publisher = ?, release_date = ?, cover_path = ?,
             is_banner = ?, is_prerelease = ?, is_deleted = ?,
             updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(payload.name.trim())
    .bind(payload.price_cents)
    .bind(validation::sanitize_string(&payload.description))
    .bind(payload.discount_percent)
    .bind(payload.category_id)
    .bind(payload.publisher.as_deref().unwrap_or("CoolKeys"))
    .bind(&payload.release_date)
    .bind(&payload.cover_path)
    .bind(payload.is_banner)
    .bind(payload.is_prerelease)
    .bind(payload.is_deleted)
    .bind(game_id)
    .execute(&state.db)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Game not found".into()));
    }

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "UPDATE_GAME",
        &format!("Updated game {}: {}", game_id, payload.name.trim()),
        None,
    )
    .await;

    let game = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = ?")
        .bind(game_id)
        .fetch_one(&state.db)
        .await?;

    Ok(game)
}

/// Soft-delete a game (staff only). The row stays for order history;
/// pending carts shed it on their next reconciliation.
pub async fn delete_game(
    state: &AppState,
    session_token: &str,
    game_id: i64,
) -> Result<(), AppError> {
    let session = crate::auth::guard::validate_staff(state, session_token)?;

    let res = sqlx::query(
        "UPDATE games SET is_deleted = 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(game_id)
    .execute(&state.db)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Game not found".into()));
    }

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "DELETE_GAME",
        &format!("Soft-deleted game {}", game_id),
        None,
    )
    .await;

    Ok(())
}

/// Hard-delete a game (staff only). Order history survives through the
/// name snapshot and the ON DELETE SET NULL item reference.
pub async fn purge_game(
    state: &AppState,
    session_token: &str,
    game_id: i64,
) -> Result<(), AppError> {
    let session = crate::auth::guard::validate_staff(state, session_token)?;

    let res = sqlx::query("DELETE FROM games WHERE id = ?")
        .bind(game_id)
        .execute(&state.db)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("Game not found".into()));
    }

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "PURGE_GAME",
        &format!("Permanently deleted game {}", game_id),
        None,
    )
    .await;

    Ok(())
}
