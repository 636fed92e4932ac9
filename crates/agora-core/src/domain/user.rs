use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Level, Viewer};
use crate::error::DomainError;

/// User entity - represents a user in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    /// Public `@handle`, unique and stored lowercase.
    pub handle: Option<String>,
    /// Raw privilege level as stored; see [`User::level`].
    pub level: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unverified user with generated ID and timestamps.
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            handle: None,
            level: Level::UNVERIFIED.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn level(&self) -> Result<Level, DomainError> {
        Level::new(self.level)
    }

    pub fn set_level(&mut self, level: Level, now: DateTime<Utc>) {
        self.level = level.into();
        self.updated_at = now;
    }

    pub fn set_handle(&mut self, handle: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.handle = Some(normalize_handle(handle)?);
        self.updated_at = now;
        Ok(())
    }

    pub fn viewer(&self) -> Result<Viewer, DomainError> {
        Ok(Viewer::new(self.id, self.level()?))
    }
}

pub const HANDLE_MIN_LEN: usize = 4;
pub const HANDLE_MAX_LEN: usize = 32;

/// Validate a public handle and return its stored form: trimmed and
/// lowercased, starting with `@`, 4 to 32 characters, no whitespace.
pub fn normalize_handle(raw: &str) -> Result<String, DomainError> {
    let handle = raw.trim().to_lowercase();

    if !handle.starts_with('@') {
        return Err(DomainError::Validation("handle must start with @".to_string()));
    }
    let len = handle.chars().count();
    if !(HANDLE_MIN_LEN..=HANDLE_MAX_LEN).contains(&len) {
        return Err(DomainError::Validation(format!(
            "handle must be {HANDLE_MIN_LEN} to {HANDLE_MAX_LEN} characters"
        )));
    }
    if handle[1..].chars().any(|c| c.is_whitespace() || c == '@') {
        return Err(DomainError::Validation(
            "handle may not contain spaces or a second @".to_string(),
        ));
    }
    Ok(handle)
}
