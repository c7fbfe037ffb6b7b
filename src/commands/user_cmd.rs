use crate::errors::AppError;
use crate::models::user::{roles, DbUser, User};
use crate::validation;
use crate::AppState;

/// List every account (staff only).
pub async fn get_all_users(
    state: &AppState,
    session_token: &str,
) -> Result<Vec<User>, AppError> {
    crate::auth::guard::validate_staff(state, session_token)?;

    let users = sqlx::query_as::<_, DbUser>(
        "SELECT * FROM users ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(users.into_iter().map(User::from).collect())
}

/// Promote or demote an account between STAFF and CLIENT (staff only).
pub async fn set_user_role(
    state: &AppState,
    session_token: &str,
    user_id: i64,
    role: &str,
) -> Result<User, AppError> {
    let session = crate::auth::guard::validate_staff(state, session_token)?;

    if role != roles::STAFF && role != roles::CLIENT {
        return Err(AppError::Validation(format!("Unknown role: {}", role)));
    }

    let res = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role)
        .bind(user_id)
        .execute(&state.db)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "SET_USER_ROLE",
        &format!("User {} role set to {}", user_id, role),
        None,
    )
    .await;

    let updated = sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&state.db)
        .await?;

    Ok(User::from(updated))
}

/// Reset an account password (staff only).
pub async fn reset_user_password(
    state: &AppState,
    session_token: &str,
    user_id: i64,
    new_password: &str,
) -> Result<(), AppError> {
    crate::auth::guard::validate_staff(state, session_token)?;

    validation::validate_password(new_password).map_err(AppError::Validation)?;

    let hashed =
        bcrypt::hash(new_password, 12).map_err(|e| AppError::Internal(e.to_string()))?;

    let res = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(&hashed)
        .bind(user_id)
        .execute(&state.db)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(())
}

/// Delete an account (staff only). Removing your own account is refused.
/// The account's purchases go with it (cascade).
pub async fn delete_user(
    state: &AppState,
    session_token: &str,
    user_id: i64,
) -> Result<(), AppError> {
    let session = crate::auth::guard::validate_staff(state, session_token)?;

    if session.user_id == user_id {
        return Err(AppError::Validation(
            "You cannot remove your own account".into(),
        ));
    }

    let res = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&state.db)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(session.user_id),
        "DELETE_USER",
        &format!("Deleted user {}", user_id),
        None,
    )
    .await;

    Ok(())
}
