// Database Models
//
// Tokio-postgres compatible models for the identity records behind the auth API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::Row;
use uuid::Uuid;

/// Longest display name the users table accepts
pub const MAX_NAME_LENGTH: usize = 50;
/// Longest email the users table accepts
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>
    where
        Self: Sized;
}

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User account record.
///
/// `password_hash` is only populated when a lookup explicitly asks for it and
/// is never serialized.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        let id: Uuid = row.try_get("id")?;
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: id.to_string(),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            // Only present when the query selected it
            password_hash: row.try_get("password_hash").ok(),
            role: role.parse().unwrap_or_default(),
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    /// Schema-level checks, mirroring the constraints on the users table.
    ///
    /// Returns every violated rule rather than stopping at the first one.
    pub fn schema_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        check_name(&self.name, &mut violations);
        check_email(&self.email, &mut violations);
        if self.password_hash.is_empty() {
            violations.push("Password is required".to_string());
        }
        violations
    }
}

/// Partial update applied by `update_by_id`; `None` leaves a column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn schema_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, &mut violations);
        }
        if let Some(email) = &self.email {
            check_email(email, &mut violations);
        }
        violations
    }
}

fn check_name(name: &str, violations: &mut Vec<String>) {
    if name.trim().is_empty() {
        violations.push("Name is required".to_string());
    } else if name.chars().count() > MAX_NAME_LENGTH {
        violations.push(format!("Name cannot be more than {MAX_NAME_LENGTH} characters"));
    }
}

fn check_email(email: &str, violations: &mut Vec<String>) {
    if email.trim().is_empty() {
        violations.push("Email is required".to_string());
    } else if email.chars().count() > MAX_EMAIL_LENGTH {
        violations.push(format!("Email cannot be more than {MAX_EMAIL_LENGTH} characters"));
    }
}
