// Authentication HTTP routes
// Decision: One generic "Invalid email or password" for every login failure
// (unknown email, wrong password, inactive account), so the endpoint does
// not leak which accounts exist

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use enlace_core::UserPublic;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::config::AuthConfig;
use super::middleware::{authenticate, AuthContext, AuthError, AuthState, SESSION_COOKIE};
use crate::storage::password::verify_password;

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the authenticated user's public projection. The session
/// token travels only in the cookie.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserPublic,
}

/// Current-session response
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserPublic,
    pub is_admin: bool,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/me", get(me))
        .with_state(state)
}

/// Build the session cookie: HttpOnly, SameSite=Lax, Secure in production,
/// Max-Age matching the session lifetime, scoped to the whole application.
pub fn build_session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_ttl_secs()))
        .build()
}

/// POST /v1/auth/login - Login with email and password
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let email = req.email.trim().to_lowercase();

    // The only fetch path that returns the stored hash
    let row = state
        .db
        .get_user_by_email_with_password(&email)
        .await
        .map_err(|e| {
            tracing::error!("Database error during login: {}", e);
            AuthError::unauthorized("Login failed")
        })?
        .ok_or_else(|| AuthError::unauthorized("Invalid email or password"))?;

    if row.status != "active" {
        return Err(AuthError::unauthorized("Invalid email or password"));
    }

    let valid = verify_password(&req.password, &row.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {}", e);
        AuthError::unauthorized("Login failed")
    })?;

    if !valid {
        return Err(AuthError::unauthorized("Invalid email or password"));
    }

    let role = row
        .role
        .parse()
        .map_err(|e: String| {
            tracing::error!("Corrupted role on user {}: {}", row.id, e);
            AuthError::unauthorized("Login failed")
        })?;

    let token = state.sessions.create(row.id, role);
    let jar = jar.add(build_session_cookie(token, &state.config));

    let user = row.into_public_row().into_public().map_err(|e| {
        tracing::error!("Corrupted user row during login: {}", e);
        AuthError::unauthorized("Login failed")
    })?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((jar, Json(LoginResponse { user })))
}

/// POST /v1/auth/logout - Delete the session and clear the cookie
///
/// Logging out with no active cookie is a no-op success, not an error.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tag = "auth"
)]
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.delete(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

/// GET /v1/auth/me - Current user info
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current session", body = MeResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<Json<MeResponse>, AuthError> {
    let context: AuthContext = authenticate(&jar, &state).await;
    match context.user {
        Some(user) if context.is_authenticated => Ok(Json(MeResponse {
            is_admin: context.is_admin,
            user,
        })),
        _ => Err(AuthError::unauthorized("Not authenticated")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = AuthConfig::default();
        let cookie = build_session_cookie("abc123".to_string(), &config);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(24 * 60 * 60))
        );
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let config = AuthConfig {
            cookie_secure: true,
            ..Default::default()
        };
        let cookie = build_session_cookie("abc123".to_string(), &config);
        assert_eq!(cookie.secure(), Some(true));
    }
}
