// Devotional CRUD routes for the admin back-office
// Decision: Deletion is soft by default so published history can be restored

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use enlace_core::{Devotional, DevotionalStatus};

use super::{api_error, internal_error, ApiError, ListResponse};
use crate::auth::{AdminUser, AuthState, FromRef};
use crate::storage::{
    CreateDevotionalRow, DevotionalFilter, StorageBackend, UpdateDevotionalRow,
};

/// App state for devotional routes
#[derive(Clone)]
pub struct DevotionalsState {
    pub db: StorageBackend,
    pub auth: AuthState,
}

impl FromRef<DevotionalsState> for AuthState {
    fn from_ref(input: &DevotionalsState) -> Self {
        input.auth.clone()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListDevotionalsQuery {
    pub status: Option<DevotionalStatus>,
    /// Substring match against the title
    pub search: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

/// Request to create a devotional
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDevotionalRequest {
    pub title: String,
    pub content: String,
    pub devotional_date: NaiveDate,
    /// Defaults to draft when omitted.
    #[serde(default)]
    pub status: Option<DevotionalStatus>,
}

/// Request to update a devotional. Only provided fields change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDevotionalRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub devotional_date: Option<NaiveDate>,
    pub status: Option<DevotionalStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteDevotionalQuery {
    /// `soft` (default) marks the entry deleted; `restore` brings it back.
    pub action: Option<String>,
}

/// Create devotional routes
pub fn routes(state: DevotionalsState) -> Router {
    Router::new()
        .route("/v1/devotionals", get(list_devotionals).post(create_devotional))
        .route(
            "/v1/devotionals/:devotional_id",
            axum::routing::patch(update_devotional).delete(delete_devotional),
        )
        .with_state(state)
}

fn row_to_dto(row: crate::storage::DevotionalRow) -> Result<Devotional, ApiError> {
    row.into_dto()
        .map_err(|e| internal_error("Loading devotional", e))
}

/// GET /v1/devotionals - List devotionals with filters
#[utoipa::path(
    get,
    path = "/v1/devotionals",
    params(
        ("status" = Option<DevotionalStatus>, Query, description = "Filter by status"),
        ("search" = Option<String>, Query, description = "Search by title"),
        ("include_deleted" = Option<bool>, Query, description = "Include soft-deleted entries")
    ),
    responses(
        (status = 200, description = "List of devotionals", body = ListResponse<Devotional>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "devotionals"
)]
pub async fn list_devotionals(
    State(state): State<DevotionalsState>,
    _admin: AdminUser,
    Query(query): Query<ListDevotionalsQuery>,
) -> Result<Json<ListResponse<Devotional>>, ApiError> {
    let filter = DevotionalFilter {
        status: query.status.map(|s| s.to_string()),
        search: query.search,
        include_deleted: query.include_deleted,
    };

    let rows = state
        .db
        .list_devotionals(&filter)
        .await
        .map_err(|e| internal_error("Listing devotionals", e))?;

    let data = rows
        .into_iter()
        .map(row_to_dto)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ListResponse::new(data)))
}

/// POST /v1/devotionals - Create a devotional
#[utoipa::path(
    post,
    path = "/v1/devotionals",
    request_body = CreateDevotionalRequest,
    responses(
        (status = 201, description = "Devotional created", body = Devotional),
        (status = 400, description = "Validation failed")
    ),
    tag = "devotionals"
)]
pub async fn create_devotional(
    State(state): State<DevotionalsState>,
    _admin: AdminUser,
    Json(req): Json<CreateDevotionalRequest>,
) -> Result<(StatusCode, Json<Devotional>), ApiError> {
    let title = req.title.trim().to_string();
    if title.is_empty() || req.content.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Title and content are required",
        ));
    }

    let row = state
        .db
        .create_devotional(CreateDevotionalRow {
            title,
            content: req.content,
            devotional_date: req.devotional_date,
            status: req.status.unwrap_or(DevotionalStatus::Draft).to_string(),
        })
        .await
        .map_err(|e| internal_error("Creating devotional", e))?;

    Ok((StatusCode::CREATED, Json(row_to_dto(row)?)))
}

/// PATCH /v1/devotionals/:devotional_id - Update a devotional
#[utoipa::path(
    patch,
    path = "/v1/devotionals/{devotional_id}",
    params(("devotional_id" = Uuid, Path, description = "Devotional ID")),
    request_body = UpdateDevotionalRequest,
    responses(
        (status = 200, description = "Devotional updated", body = Devotional),
        (status = 404, description = "Devotional not found")
    ),
    tag = "devotionals"
)]
pub async fn update_devotional(
    State(state): State<DevotionalsState>,
    _admin: AdminUser,
    Path(devotional_id): Path<Uuid>,
    Json(req): Json<UpdateDevotionalRequest>,
) -> Result<Json<Devotional>, ApiError> {
    let input = UpdateDevotionalRow {
        title: req.title.map(|t| t.trim().to_string()),
        content: req.content,
        devotional_date: req.devotional_date,
        status: req.status.map(|s| s.to_string()),
    };

    let row = state
        .db
        .update_devotional(devotional_id, input)
        .await
        .map_err(|e| internal_error("Updating devotional", e))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Devotional not found"))?;

    Ok(Json(row_to_dto(row)?))
}

/// DELETE /v1/devotionals/:devotional_id - Soft delete or restore
#[utoipa::path(
    delete,
    path = "/v1/devotionals/{devotional_id}",
    params(
        ("devotional_id" = Uuid, Path, description = "Devotional ID"),
        ("action" = Option<String>, Query, description = "`soft` (default) or `restore`")
    ),
    responses(
        (status = 204, description = "Devotional soft-deleted or restored"),
        (status = 400, description = "Unknown action"),
        (status = 404, description = "Devotional not found or already in the requested state")
    ),
    tag = "devotionals"
)]
pub async fn delete_devotional(
    State(state): State<DevotionalsState>,
    _admin: AdminUser,
    Path(devotional_id): Path<Uuid>,
    Query(query): Query<DeleteDevotionalQuery>,
) -> Result<StatusCode, ApiError> {
    let done = match query.action.as_deref().unwrap_or("soft") {
        "soft" => state
            .db
            .soft_delete_devotional(devotional_id)
            .await
            .map_err(|e| internal_error("Deleting devotional", e))?,
        "restore" => state
            .db
            .restore_devotional(devotional_id)
            .await
            .map_err(|e| internal_error("Restoring devotional", e))?,
        other => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown action: {}", other),
            ))
        }
    };

    if done {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            "Devotional not found or already deleted",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_to_draft() {
        let req: CreateDevotionalRequest = serde_json::from_str(
            r#"{"title": "Morning", "content": "Text", "devotional_date": "2026-01-15"}"#,
        )
        .unwrap();
        assert!(req.status.is_none());
        assert_eq!(
            req.devotional_date,
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListDevotionalsQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_deleted);
        assert!(query.status.is_none());
    }
}
