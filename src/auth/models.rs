//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::{Role, User};

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
}

/// Registration request payload
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request payload
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Profile fields safe to return to a caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Why a response was served from the demo store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoReason {
    /// The probe or a read could not reach the credential store
    StoreUnreachable,
    /// The store was reachable but a write failed afterwards
    StoreError,
}

impl DemoReason {
    /// Suffix appended to success messages
    pub fn label(&self) -> &'static str {
        match self {
            DemoReason::StoreUnreachable => "demo mode - database not connected",
            DemoReason::StoreError => "demo mode - database error",
        }
    }
}

/// Outcome of a successful register or login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
    pub expires_at: i64,
    pub demo: Option<DemoReason>,
}

/// Outcome of a profile lookup
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: PublicUser,
    pub demo: Option<DemoReason>,
}

/// `{"user": ..., "token": ...}` payload of register/login responses
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: PublicUser,
}

/// Response envelope shared by every auth endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<DemoReason>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            demo_mode: None,
        }
    }

    /// Tag the response as demo-served, suffixing the message
    pub fn with_demo(mut self, demo: Option<DemoReason>) -> Self {
        if let Some(reason) = demo {
            self.message = format!("{} ({})", self.message, reason.label());
            self.demo_mode = Some(reason);
        }
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: None,
            demo_mode: None,
        }
    }
}
