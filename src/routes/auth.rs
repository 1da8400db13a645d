//! Auth routes for registration, login, profile and password management

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::auth::AuthMiddleware;
use crate::auth::middleware::TOKEN_COOKIE;
use crate::auth::models::{
    ApiResponse, AuthUser, ChangePasswordRequest, LoginRequest, RegisterRequest, Session,
    SessionData, UpdateProfileRequest, UserData,
};
use crate::error::AuthError;
use crate::server::AppState;

fn reject_body(rejection: JsonRejection) -> AuthError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    AuthError::validation("Invalid request body")
}

/// Cookie mirroring the bearer token, expiring with it
fn session_cookie(session: &Session) -> Cookie<'static> {
    let max_age = (session.expires_at - Utc::now().timestamp()).max(0);
    Cookie::build((TOKEN_COOKIE, session.token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .build()
}

fn session_body(message: &str, session: Session) -> ApiResponse<SessionData> {
    let demo = session.demo;
    ApiResponse::ok(
        message,
        SessionData {
            user: session.user,
            token: session.token,
        },
    )
    .with_demo(demo)
}

pub async fn register(
    State(app_state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(reject_body)?;
    let session = app_state.auth_service.register(payload).await?;

    let jar = jar.add(session_cookie(&session));
    let body = session_body("User registered successfully", session);
    Ok((StatusCode::CREATED, jar, Json(body)))
}

pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(reject_body)?;
    let session = app_state.auth_service.login(payload).await?;

    let jar = jar.add(session_cookie(&session));
    let body = session_body("Login successful", session);
    Ok((StatusCode::OK, jar, Json(body)))
}

/// `GET /api/auth/me`: profile of the token's owner
pub async fn me(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let profile = app_state.auth_service.get_profile(&user.id).await?;
    let body = ApiResponse::ok("User data retrieved", UserData { user: profile.user })
        .with_demo(profile.demo);
    Ok(Json(body))
}

pub async fn update_profile(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(reject_body)?;
    let updated = app_state
        .auth_service
        .update_profile(&user.id, payload)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Profile updated successfully",
        UserData { user: updated },
    )))
}

pub async fn change_password(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(reject_body)?;
    app_state
        .auth_service
        .change_password(&user.id, payload)
        .await?;
    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// Stateless JWT: nothing to revoke, the client drops its token
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, Json(ApiResponse::message("Logout successful")))
}

pub fn create_auth_routes(app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/profile", put(update_profile))
        .route("/api/auth/password", put(change_password))
        .route("/api/auth/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            app_state.jwt_service.clone(),
            AuthMiddleware::validate_token,
        ));

    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected)
}
