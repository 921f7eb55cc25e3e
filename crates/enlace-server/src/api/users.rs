// User management routes for the admin back-office
// Decision: Accounts are admin-provisioned; there is no self-service signup

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use enlace_core::{UserPublic, UserRole, UserStatus};

use super::{api_error, internal_error, ApiError, PagedResponse};
use crate::auth::{AdminUser, AuthState, FromRef};
use crate::storage::password::hash_password;
use crate::storage::{
    is_duplicate_email, CreateUserRow, StorageBackend, UpdateUserRow, UserFilter,
};

const MIN_PASSWORD_LEN: usize = 6;
const DEFAULT_LIMIT: i64 = 100;

/// App state for users routes
#[derive(Clone)]
pub struct UsersState {
    pub db: StorageBackend,
    pub auth: AuthState,
}

impl FromRef<UsersState> for AuthState {
    fn from_ref(input: &UsersState) -> Self {
        input.auth.clone()
    }
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListUsersQuery {
    /// Substring match against name or email
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request to create a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

/// Request to update a user. Only provided fields change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// When set, the password is re-hashed and replaced.
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteUserQuery {
    /// Hard delete removes the row; the default deactivates the account.
    #[serde(default)]
    pub hard: bool,
}

/// Create users routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/v1/users", get(list_users).post(create_user))
        .route(
            "/v1/users/:user_id",
            axum::routing::patch(update_user).delete(delete_user),
        )
        .with_state(state)
}

fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email format"));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

fn row_to_public(row: crate::storage::UserRow) -> Result<UserPublic, ApiError> {
    row.into_public()
        .map_err(|e| internal_error("Loading user", e))
}

/// GET /v1/users - List users with filters and paging
#[utoipa::path(
    get,
    path = "/v1/users",
    params(
        ("search" = Option<String>, Query, description = "Search by name or email"),
        ("role" = Option<UserRole>, Query, description = "Filter by role"),
        ("status" = Option<UserStatus>, Query, description = "Filter by status"),
        ("limit" = Option<i64>, Query, description = "Page size (default 100)"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Paged list of users", body = PagedResponse<UserPublic>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<UsersState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PagedResponse<UserPublic>>, ApiError> {
    let filter = UserFilter {
        search: query.search,
        role: query.role.map(|r| r.to_string()),
        status: query.status.map(|s| s.to_string()),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);
    let offset = query.offset.unwrap_or(0).max(0);

    let rows = state
        .db
        .list_users(&filter, limit, offset)
        .await
        .map_err(|e| internal_error("Listing users", e))?;
    let total = state
        .db
        .count_users(&filter)
        .await
        .map_err(|e| internal_error("Counting users", e))?;

    let data = rows
        .into_iter()
        .map(row_to_public)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PagedResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /v1/users - Create a user
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserPublic),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already exists")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<UsersState>,
    _admin: AdminUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Name is required"));
    }
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash =
        hash_password(&req.password).map_err(|e| internal_error("Creating user", e))?;

    let row = state
        .db
        .create_user(CreateUserRow {
            name,
            email,
            password_hash,
            role: req.role.unwrap_or(UserRole::User).to_string(),
            status: req.status.unwrap_or(UserStatus::Active).to_string(),
        })
        .await
        .map_err(|e| {
            if is_duplicate_email(&e) {
                api_error(StatusCode::CONFLICT, "Email already exists")
            } else {
                internal_error("Creating user", e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(row_to_public(row)?)))
}

/// PATCH /v1/users/:user_id - Update a user
#[utoipa::path(
    patch,
    path = "/v1/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserPublic),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<UsersState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserPublic>, ApiError> {
    // An admin cannot lock themselves out
    if req.status == Some(UserStatus::Inactive) && user_id == admin.id {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Cannot deactivate your own account",
        ));
    }

    let email = match &req.email {
        Some(email) => Some(validate_email(email)?),
        None => None,
    };
    if let Some(password) = &req.password {
        validate_password(password)?;
    }

    let input = UpdateUserRow {
        name: req.name.map(|n| n.trim().to_string()),
        email,
        role: req.role.map(|r| r.to_string()),
        status: req.status.map(|s| s.to_string()),
    };

    let row = state
        .db
        .update_user(user_id, input)
        .await
        .map_err(|e| {
            if is_duplicate_email(&e) {
                api_error(StatusCode::CONFLICT, "Email already exists")
            } else {
                internal_error("Updating user", e)
            }
        })?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "User not found"))?;

    if let Some(password) = req.password {
        let password_hash =
            hash_password(&password).map_err(|e| internal_error("Updating user", e))?;
        state
            .db
            .update_user_password(user_id, &password_hash)
            .await
            .map_err(|e| internal_error("Updating user", e))?;
    }

    Ok(Json(row_to_public(row)?))
}

/// DELETE /v1/users/:user_id - Deactivate (default) or hard-delete a user
#[utoipa::path(
    delete,
    path = "/v1/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("hard" = Option<bool>, Query, description = "Remove the row instead of deactivating")
    ),
    responses(
        (status = 204, description = "User removed or deactivated"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DeleteUserQuery>,
) -> Result<StatusCode, ApiError> {
    if user_id == admin.id {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Cannot delete your own account",
        ));
    }

    let found = if query.hard {
        state
            .db
            .delete_user(user_id)
            .await
            .map_err(|e| internal_error("Deleting user", e))?
    } else {
        state
            .db
            .update_user(
                user_id,
                UpdateUserRow {
                    status: Some(UserStatus::Inactive.to_string()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| internal_error("Deactivating user", e))?
            .is_some()
    };

    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation_normalizes() {
        assert_eq!(validate_email("  Ana@X.COM ").unwrap(), "ana@x.com");
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_password_length_rule() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_list_query_deserializes_enums() {
        let query: ListUsersQuery =
            serde_json::from_str(r#"{"role": "admin", "status": "inactive"}"#).unwrap();
        assert_eq!(query.role, Some(UserRole::Admin));
        assert_eq!(query.status, Some(UserStatus::Inactive));
    }
}
