use super::session::SessionData;
use crate::errors::AppError;
use crate::AppState;

/// Validate the session token and return a clone of its data.
pub fn validate_session(state: &AppState, token: &str) -> Result<SessionData, AppError> {
    let store = state
        .sessions
        .lock()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    store.validate(token).cloned()
}

/// Validate the session token and require the STAFF role.
pub fn validate_staff(state: &AppState, token: &str) -> Result<SessionData, AppError> {
    let store = state
        .sessions
        .lock()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    store.validate_staff(token).cloned()
}
