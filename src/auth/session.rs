use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::get_config;
use crate::errors::AppError;
use crate::models::user::roles;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub role: String, // "STAFF" | "CLIENT"
    pub login_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: HashMap<String, SessionData>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Create a session and return its token (UUID v4).
    pub fn create(&mut self, user_id: i64, username: String, name: String, role: String) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let timeout = Duration::minutes(get_config().security.session_timeout_mins as i64);
        self.sessions.insert(
            token.clone(),
            SessionData {
                user_id,
                username,
                name,
                role,
                login_at: now,
                expires_at: now + timeout,
            },
        );
        token
    }

    /// Check the token exists and has not expired.
    pub fn validate(&self, token: &str) -> Result<&SessionData, AppError> {
        match self.sessions.get(token) {
            None => Err(AppError::Auth("Invalid session, please log in again".into())),
            Some(s) if Utc::now() > s.expires_at => {
                Err(AppError::Auth("Session expired, please log in again".into()))
            }
            Some(s) => Ok(s),
        }
    }

    /// Validate the token and require the STAFF role.
    pub fn validate_staff(&self, token: &str) -> Result<&SessionData, AppError> {
        let s = self.validate(token)?;
        if s.role != roles::STAFF {
            return Err(AppError::Forbidden(
                "Only staff members can do this".into(),
            ));
        }
        Ok(s)
    }

    /// Drop a session (logout).
    pub fn destroy(&mut self, token: &str) {
        self.sessions.remove(token);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
