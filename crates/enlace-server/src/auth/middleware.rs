// Auth gateway: derives a request's identity and privilege from the session
// cookie.
// Decision: The user row is re-fetched on every authenticated request, so
// deactivating an account cuts off its live sessions immediately

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use enlace_core::UserPublic;
use serde::Serialize;
use std::sync::Arc;

use super::config::AuthConfig;
use super::session::SessionStore;
use crate::storage::StorageBackend;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// The two auth failure kinds: Unauthorized (no valid session) and Forbidden
/// (valid session, insufficient privilege). Callers map them to 401/403
/// without inspecting the message.
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Auth state shared across routes.
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub sessions: Arc<SessionStore>,
    pub db: StorageBackend,
}

impl AuthState {
    pub fn new(config: AuthConfig, db: StorageBackend) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session_ttl));
        Self {
            config,
            sessions,
            db,
        }
    }
}

/// Helper trait for extracting AuthState from application state.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AuthState> for AuthState {
    fn from_ref(input: &AuthState) -> Self {
        input.clone()
    }
}

/// What the gateway knows about a request. Infallible: a missing or stale
/// session yields the anonymous context, never an error.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub user: Option<UserPublic>,
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_admin: false,
        }
    }
}

/// Resolve a request's identity: cookie -> session store -> live user row.
///
/// Returns the anonymous context when the cookie is absent, the session is
/// missing or expired, the user no longer exists, or the user is no longer
/// active. The last case closes the gap where an admin deactivates a user
/// mid-session: the token may still be unexpired, but it no longer counts.
pub async fn authenticate(jar: &CookieJar, state: &AuthState) -> AuthContext {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return AuthContext::anonymous();
    };

    let Some(session) = state.sessions.get(cookie.value()) else {
        return AuthContext::anonymous();
    };

    let row = match state.db.get_user(session.user_id).await {
        Ok(Some(row)) => row,
        Ok(None) => return AuthContext::anonymous(),
        Err(e) => {
            tracing::error!("Failed to load user for session: {}", e);
            return AuthContext::anonymous();
        }
    };

    let user = match row.into_public() {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Corrupted user row behind session: {}", e);
            return AuthContext::anonymous();
        }
    };

    if !user.is_active() {
        return AuthContext::anonymous();
    }

    AuthContext {
        is_admin: user.is_admin(),
        user: Some(user),
        is_authenticated: true,
    }
}

/// Extractor for an authenticated user. Rejects with 401 when the request
/// carries no valid session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserPublic);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let context = authenticate(&jar, &auth_state).await;
        match context.user {
            Some(user) if context.is_authenticated => Ok(CurrentUser(user)),
            _ => Err(AuthError::unauthorized("Authentication required")),
        }
    }
}

/// Extractor for an authenticated admin. 401 without a session, 403 when the
/// session belongs to a non-admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserPublic);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AuthError::forbidden("Admin access required"));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use enlace_core::{UserRole, UserStatus};
    use uuid::Uuid;

    fn active_user(role: UserRole) -> UserPublic {
        UserPublic {
            id: Uuid::now_v7(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_error_statuses_are_distinct() {
        let unauthorized = AuthError::unauthorized("no session");
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);

        let forbidden = AuthError::forbidden("not an admin");
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_body_omits_status() {
        let error = AuthError::unauthorized("nope");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, serde_json::json!({"error": "nope"}));
    }

    #[test]
    fn test_anonymous_context() {
        let context = AuthContext::anonymous();
        assert!(context.user.is_none());
        assert!(!context.is_authenticated);
        assert!(!context.is_admin);
    }

    #[test]
    fn test_admin_flag_follows_role() {
        assert!(active_user(UserRole::Admin).is_admin());
        assert!(!active_user(UserRole::User).is_admin());
    }

    #[tokio::test]
    async fn test_authenticate_without_cookie_is_anonymous() {
        let state = AuthState::new(AuthConfig::default(), StorageBackend::in_memory());
        let jar = CookieJar::new();
        let context = authenticate(&jar, &state).await;
        assert!(!context.is_authenticated);
        assert!(context.user.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_with_unknown_token_is_anonymous() {
        let state = AuthState::new(AuthConfig::default(), StorageBackend::in_memory());
        let jar = CookieJar::new().add(axum_extra::extract::cookie::Cookie::new(
            SESSION_COOKIE,
            "0".repeat(64),
        ));
        let context = authenticate(&jar, &state).await;
        assert!(!context.is_authenticated);
    }
}
