// Payment DTOs for the public API and the collection job

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Collection state of a manually-recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

/// A manually-recorded payment awaiting (or past) collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    /// Reference assigned by the external payment recorder.
    pub recorder_id: String,
    pub amount: f64,
    /// Calendar date the payment was recorded for.
    pub date: NaiveDate,
    pub description: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate totals across all payments, grouped by status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentSummary {
    pub total_completed: f64,
    pub total_pending: f64,
    pub total_cancelled: f64,
    /// Sum over every payment regardless of status.
    pub total_amount: f64,
    pub count: u64,
}

/// Per-month totals, keyed by `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
    pub count: u64,
}

/// Outcome of one collection pass over pending payments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionReport {
    pub processed: u64,
    pub completed: u64,
    pub failed: u64,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl CollectionReport {
    pub fn empty() -> Self {
        Self {
            processed: 0,
            completed: 0,
            failed: 0,
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for (text, status) in [
            ("pending", PaymentStatus::Pending),
            ("completed", PaymentStatus::Completed),
            ("cancelled", PaymentStatus::Cancelled),
        ] {
            assert_eq!(PaymentStatus::from_str(text).unwrap(), status);
            assert_eq!(status.to_string(), text);
        }
        assert!(PaymentStatus::from_str("refunded").is_err());
    }

    #[test]
    fn test_empty_report() {
        let report = CollectionReport::empty();
        assert_eq!(report.processed, 0);
        assert!(report.errors.is_empty());
    }
}
