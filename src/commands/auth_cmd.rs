use crate::errors::AppError;
use crate::log_audit;
use crate::models::user::{AuthUserData, DbUser, LoginResult, RegisterPayload};
use crate::rate_limiter::{LOGIN_LIMIT, REGISTER_LIMIT};
use crate::validation;
use crate::AppState;

/// True when no staff account exists yet (first application run).
pub async fn check_first_run(state: &AppState) -> Result<bool, AppError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'STAFF'")
        .fetch_one(&state.db)
        .await?;
    Ok(count.0 == 0)
}

/// Create the first staff account. Only allowed while none exists.
pub async fn create_admin(
    state: &AppState,
    name: String,
    username: String,
    password: String,
) -> Result<(), AppError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'STAFF'")
        .fetch_one(&state.db)
        .await?;
    if count.0 > 0 {
        return Err(AppError::Validation("A staff account already exists".into()));
    }

    validation::validate_name(&name).map_err(AppError::Validation)?;
    validation::validate_username(&username).map_err(AppError::Validation)?;
    validation::validate_password(&password).map_err(AppError::Validation)?;

    let hashed = bcrypt::hash(&password, 12).map_err(|e| AppError::Internal(e.to_string()))?;

    sqlx::query("INSERT INTO users (name, username, password_hash, role) VALUES (?, ?, ?, 'STAFF')")
        .bind(name.trim())
        .bind(username.trim())
        .bind(&hashed)
        .execute(&state.db)
        .await?;

    Ok(())
}

/// Self-service registration: create a CLIENT account and log it in
/// immediately, like the storefront signup flow.
pub async fn register(
    state: &AppState,
    payload: RegisterPayload,
) -> Result<LoginResult, AppError> {
    REGISTER_LIMIT
        .check(payload.username.trim(), "REGISTER")
        .map_err(AppError::Validation)?;

    validation::validate_name(&payload.name).map_err(AppError::Validation)?;
    validation::validate_username(&payload.username).map_err(AppError::Validation)?;
    validation::validate_password(&payload.password).map_err(AppError::Validation)?;

    let hashed =
        bcrypt::hash(&payload.password, 12).map_err(|e| AppError::Internal(e.to_string()))?;

    let result = sqlx::query(
        "INSERT INTO users (name, username, password_hash, role) VALUES (?, ?, ?, 'CLIENT')",
    )
    .bind(payload.name.trim())
    .bind(payload.username.trim())
    .bind(&hashed)
    .execute(&state.db)
    .await;

    let id = match result {
        Ok(res) => res.last_insert_rowid(),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(AppError::Validation("Username already taken".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let user = sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(user.id),
        "REGISTER",
        &format!("Account {} created", user.username),
        None,
    )
    .await;

    start_session(state, user)
}

/// Log a user in and create a session.
pub async fn login(
    state: &AppState,
    username: String,
    password: String,
) -> Result<LoginResult, AppError> {
    LOGIN_LIMIT
        .check(username.trim(), "LOGIN")
        .map_err(AppError::Auth)?;

    let user =
        sqlx::query_as::<_, DbUser>("SELECT * FROM users WHERE username = ? AND is_active = 1")
            .bind(username.trim())
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| {
                AppError::Auth("Unknown username or inactive account".into())
            })?;

    let valid = bcrypt::verify(&password, &user.password_hash)
        .map_err(|_| AppError::Auth("Password verification failed".into()))?;
    if !valid {
        return Err(AppError::Auth("Wrong password".into()));
    }

    sqlx::query("UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(user.id)
        .execute(&state.db)
        .await
        .ok();

    crate::commands::activity_cmd::log_activity(
        &state.db,
        Some(user.id),
        "LOGIN",
        &format!("User {} logged in", user.username),
        None,
    )
    .await;

    log_audit!(
        "LOGIN",
        &serde_json::json!({ "username": user.username, "role": user.role })
    );

    start_session(state, user)
}

fn start_session(state: &AppState, user: DbUser) -> Result<LoginResult, AppError> {
    let token = state
        .sessions
        .lock()
        .map_err(|e| AppError::Internal(e.to_string()))?
        .create(
            user.id,
            user.username.clone(),
            user.name.clone(),
            user.role.clone(),
        );

    Ok(LoginResult {
        user: AuthUserData {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
        },
        session_token: token,
        login_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Log out — drop the session.
pub async fn logout(state: &AppState, session_token: &str) -> Result<(), AppError> {
    let user_id = crate::auth::guard::validate_session(state, session_token)
        .ok()
        .map(|s| s.user_id);

    state
        .sessions
        .lock()
        .map_err(|e| AppError::Internal(e.to_string()))?
        .destroy(session_token);

    if let Some(id) = user_id {
        crate::commands::activity_cmd::log_activity(
            &state.db,
            Some(id),
            "LOGOUT",
            "User logged out",
            None,
        )
        .await;
    }

    Ok(())
}

/// Check a session is still valid (auto-login on page reload).
pub async fn check_session(
    state: &AppState,
    session_token: &str,
) -> Result<AuthUserData, AppError> {
    let session = crate::auth::guard::validate_session(state, session_token)?;
    Ok(AuthUserData {
        id: session.user_id,
        name: session.name,
        username: session.username,
        role: session.role,
    })
}
