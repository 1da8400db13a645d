//! Input validation for the auth endpoints.
//!
//! Each function turns a raw request into normalized input or a
//! `AuthError::Validation` carrying the message shown to the caller.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::auth::models::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::error::AuthError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

const INVALID_EMAIL: &str = "Please provide a valid email address";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Present and not blank, trimmed
fn provided(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Passwords are taken verbatim; only emptiness counts as missing
fn provided_secret(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

pub fn registration(req: RegisterRequest) -> Result<Registration, AuthError> {
    let (Some(name), Some(email), Some(password)) = (
        provided(req.name),
        provided(req.email),
        provided_secret(req.password),
    ) else {
        return Err(AuthError::validation("Please provide name, email, and password"));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(AuthError::validation(INVALID_EMAIL));
    }
    if !long_enough(&password) {
        return Err(AuthError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(Registration {
        name,
        email,
        password,
    })
}

pub fn credentials(req: LoginRequest) -> Result<Credentials, AuthError> {
    let (Some(email), Some(password)) = (provided(req.email), provided_secret(req.password)) else {
        return Err(AuthError::validation("Please provide email and password"));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(AuthError::validation(INVALID_EMAIL));
    }

    Ok(Credentials { email, password })
}

pub fn profile_update(req: UpdateProfileRequest) -> Result<ProfileUpdate, AuthError> {
    let name = provided(req.name);
    let email = provided(req.email).map(|email| normalize_email(&email));

    if name.is_none() && email.is_none() {
        return Err(AuthError::validation("Please provide name or email to update"));
    }
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(AuthError::validation(INVALID_EMAIL));
        }
    }

    Ok(ProfileUpdate { name, email })
}

pub fn password_change(req: ChangePasswordRequest) -> Result<PasswordChange, AuthError> {
    let (Some(current_password), Some(new_password)) = (
        provided_secret(req.current_password),
        provided_secret(req.new_password),
    ) else {
        return Err(AuthError::validation(
            "Please provide current password and new password",
        ));
    };

    if !long_enough(&new_password) {
        return Err(AuthError::validation(format!(
            "New password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(PasswordChange {
        current_password,
        new_password,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn message(err: AuthError) -> String {
        match err {
            AuthError::Validation(message) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ann@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("ann@x"));
        assert!(!is_valid_email("ann x@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("ann@@x.com"));
    }

    #[test]
    fn test_registration_normalizes() {
        let input = registration(register_req("  Ann ", " Ann@X.com ", "secret1")).unwrap();
        assert_eq!(input.name, "Ann");
        assert_eq!(input.email, "ann@x.com");
        assert_eq!(input.password, "secret1");
    }

    #[test]
    fn test_registration_rejections() {
        let missing = RegisterRequest {
            name: None,
            email: Some("ann@x.com".to_string()),
            password: Some("secret1".to_string()),
        };
        assert_eq!(
            message(registration(missing).unwrap_err()),
            "Please provide name, email, and password"
        );
        assert_eq!(
            message(registration(register_req("Ann", "ann-at-x", "secret1")).unwrap_err()),
            INVALID_EMAIL
        );
        assert_eq!(
            message(registration(register_req("Ann", "ann@x.com", "12345")).unwrap_err()),
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            email: Some("ann@x.com".to_string()),
            password: Some(String::new()),
        };
        assert_eq!(
            message(credentials(req).unwrap_err()),
            "Please provide email and password"
        );
    }

    #[test]
    fn test_profile_update_needs_a_field() {
        let empty = UpdateProfileRequest {
            name: Some("   ".to_string()),
            email: None,
        };
        assert_eq!(
            message(profile_update(empty).unwrap_err()),
            "Please provide name or email to update"
        );

        let bad_email = UpdateProfileRequest {
            name: None,
            email: Some("nope".to_string()),
        };
        assert_eq!(message(profile_update(bad_email).unwrap_err()), INVALID_EMAIL);
    }

    #[test]
    fn test_password_change_rules() {
        let short = ChangePasswordRequest {
            current_password: Some("secret1".to_string()),
            new_password: Some("abc".to_string()),
        };
        assert_eq!(
            message(password_change(short).unwrap_err()),
            "New password must be at least 6 characters long"
        );

        let ok = ChangePasswordRequest {
            current_password: Some("secret1".to_string()),
            new_password: Some("secret2".to_string()),
        };
        assert_eq!(password_change(ok).unwrap().new_password, "secret2");
    }
}
