// Payment CRUD and summary routes for the admin back-office

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use enlace_core::{MonthlyTotal, Payment, PaymentStatus, PaymentSummary};

use super::{api_error, internal_error, ApiError, ListResponse};
use crate::auth::{AdminUser, AuthState, FromRef};
use crate::storage::{CreatePaymentRow, PaymentFilter, StorageBackend, UpdatePaymentRow};

/// App state for payment routes
#[derive(Clone)]
pub struct PaymentsState {
    pub db: StorageBackend,
    pub auth: AuthState,
}

impl FromRef<PaymentsState> for AuthState {
    fn from_ref(input: &PaymentsState) -> Self {
        input.auth.clone()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListPaymentsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PaymentStatus>,
    pub recorder_id: Option<String>,
}

/// Request to record a payment
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub recorder_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    /// Defaults to pending when omitted.
    #[serde(default)]
    pub status: Option<PaymentStatus>,
}

/// Request to update a payment. Only provided fields change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub recorder_id: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<PaymentStatus>,
}

/// Summary response: status totals plus per-month breakdown.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentSummaryResponse {
    pub summary: PaymentSummary,
    pub monthly: Vec<MonthlyTotal>,
}

/// Create payment routes
pub fn routes(state: PaymentsState) -> Router {
    Router::new()
        .route("/v1/payments", get(list_payments).post(create_payment))
        .route("/v1/payments/summary", get(payments_summary))
        .route(
            "/v1/payments/:payment_id",
            axum::routing::patch(update_payment).delete(delete_payment),
        )
        .with_state(state)
}

fn row_to_dto(row: crate::storage::PaymentRow) -> Result<Payment, ApiError> {
    row.into_dto()
        .map_err(|e| internal_error("Loading payment", e))
}

/// GET /v1/payments - List payments with filters
#[utoipa::path(
    get,
    path = "/v1/payments",
    params(
        ("start_date" = Option<NaiveDate>, Query, description = "Earliest payment date"),
        ("end_date" = Option<NaiveDate>, Query, description = "Latest payment date"),
        ("status" = Option<PaymentStatus>, Query, description = "Filter by status"),
        ("recorder_id" = Option<String>, Query, description = "Filter by recorder reference")
    ),
    responses(
        (status = 200, description = "List of payments", body = ListResponse<Payment>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<PaymentsState>,
    _admin: AdminUser,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<ListResponse<Payment>>, ApiError> {
    let filter = PaymentFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        status: query.status.map(|s| s.to_string()),
        recorder_id: query.recorder_id,
    };

    let rows = state
        .db
        .list_payments(&filter)
        .await
        .map_err(|e| internal_error("Listing payments", e))?;

    let data = rows
        .into_iter()
        .map(row_to_dto)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ListResponse::new(data)))
}

/// GET /v1/payments/summary - Totals by status and by month
#[utoipa::path(
    get,
    path = "/v1/payments/summary",
    responses(
        (status = 200, description = "Payment totals", body = PaymentSummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "payments"
)]
pub async fn payments_summary(
    State(state): State<PaymentsState>,
    _admin: AdminUser,
) -> Result<Json<PaymentSummaryResponse>, ApiError> {
    let summary = state
        .db
        .payments_summary()
        .await
        .map_err(|e| internal_error("Summarizing payments", e))?;
    let monthly = state
        .db
        .payments_by_month()
        .await
        .map_err(|e| internal_error("Summarizing payments", e))?;

    Ok(Json(PaymentSummaryResponse { summary, monthly }))
}

/// POST /v1/payments - Record a payment
#[utoipa::path(
    post,
    path = "/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 400, description = "Validation failed")
    ),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<PaymentsState>,
    _admin: AdminUser,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let recorder_id = req.recorder_id.trim().to_string();
    if recorder_id.is_empty() || req.description.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Recorder ID and description are required",
        ));
    }
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Amount must be a positive number",
        ));
    }

    let row = state
        .db
        .create_payment(CreatePaymentRow {
            recorder_id,
            amount: req.amount,
            date: req.date,
            description: req.description,
            status: req.status.unwrap_or(PaymentStatus::Pending).to_string(),
        })
        .await
        .map_err(|e| internal_error("Recording payment", e))?;

    Ok((StatusCode::CREATED, Json(row_to_dto(row)?)))
}

/// PATCH /v1/payments/:payment_id - Update a payment
#[utoipa::path(
    patch,
    path = "/v1/payments/{payment_id}",
    params(("payment_id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Payment not found")
    ),
    tag = "payments"
)]
pub async fn update_payment(
    State(state): State<PaymentsState>,
    _admin: AdminUser,
    Path(payment_id): Path<Uuid>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    if let Some(amount) = req.amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Amount must be a positive number",
            ));
        }
    }

    let input = UpdatePaymentRow {
        recorder_id: req.recorder_id,
        amount: req.amount,
        date: req.date,
        description: req.description,
        status: req.status.map(|s| s.to_string()),
    };

    let row = state
        .db
        .update_payment(payment_id, input)
        .await
        .map_err(|e| internal_error("Updating payment", e))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Payment not found"))?;

    Ok(Json(row_to_dto(row)?))
}

/// DELETE /v1/payments/:payment_id - Delete a payment
#[utoipa::path(
    delete,
    path = "/v1/payments/{payment_id}",
    params(("payment_id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found")
    ),
    tag = "payments"
)]
pub async fn delete_payment(
    State(state): State<PaymentsState>,
    _admin: AdminUser,
    Path(payment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .db
        .delete_payment(payment_id)
        .await
        .map_err(|e| internal_error("Deleting payment", e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "Payment not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_to_pending() {
        let req: CreatePaymentRequest = serde_json::from_str(
            r#"{"recorder_id": "rec-1", "amount": 10.5, "date": "2026-08-01", "description": "Donation"}"#,
        )
        .unwrap();
        assert!(req.status.is_none());
        assert_eq!(req.amount, 10.5);
    }

    #[test]
    fn test_list_query_parses_dates() {
        let query: ListPaymentsQuery =
            serde_json::from_str(r#"{"start_date": "2026-01-01", "status": "pending"}"#).unwrap();
        assert_eq!(
            query.start_date,
            Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        );
        assert_eq!(query.status, Some(PaymentStatus::Pending));
    }
}
