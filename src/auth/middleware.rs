//! Authentication Middleware
//!
//! Axum middleware for JWT token validation and user authentication.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};
use crate::error::AuthError;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "access_token";

/// Authentication middleware that validates JWT tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating JWT tokens
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, AuthError> {
        // Authorization header (Bearer) first, access_token cookie as fallback
        let token = match extract_token(&req) {
            Some(token) => token,
            None => {
                tracing::debug!(
                    "[AuthMiddleware] No token on {} {}",
                    req.method(),
                    req.uri()
                );
                return Err(AuthError::Unauthorized("Not authorized, no token"));
            }
        };

        let user_id = match jwt_service.verify(&token) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("[AuthMiddleware] JWT validation failed: {:#}", e);
                return Err(AuthError::Unauthorized("Not authorized, token failed"));
            }
        };
        tracing::debug!("[AuthMiddleware] Authenticated user {}", user_id);

        // Insert the user into request extensions for downstream handlers
        req.extensions_mut().insert(AuthUser { id: user_id });

        Ok(next.run(req).await)
    }
}

fn extract_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_header| auth_header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            CookieJar::from_headers(req.headers())
                .get(TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|token| !token.is_empty())
        })
}
