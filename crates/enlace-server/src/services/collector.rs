// Payment collection pass
//
// Walks every pending payment, runs the (stubbed) provider verification and
// flips verified payments to completed. Failed payments stay pending so a
// later pass picks them up again; their errors are reported, not retried
// here.

use anyhow::Result;
use chrono::Utc;
use enlace_core::{CollectionReport, PaymentSummary};

use crate::storage::{PaymentFilter, PaymentRow, StorageBackend, UpdatePaymentRow};

pub struct CollectorService {
    db: StorageBackend,
}

/// Outcome of a pass plus the refreshed totals the trigger endpoint echoes.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub report: CollectionReport,
    pub summary: PaymentSummary,
}

impl CollectorService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Stub for the real provider check (MercadoPago, Stripe, a bank feed).
    /// Until one is wired up, a payment collects when its recorded data is
    /// usable: a non-empty recorder reference and a positive amount.
    fn verify_collection(payment: &PaymentRow) -> Result<(), String> {
        if payment.recorder_id.trim().is_empty() || payment.amount <= 0.0 {
            return Err(format!("Payment {}: invalid recorder data", payment.id));
        }
        Ok(())
    }

    /// Run one pass over all pending payments.
    pub async fn run_pass(&self) -> Result<CollectionOutcome> {
        tracing::info!("Collector pass starting");

        let pending = self
            .db
            .list_payments(&PaymentFilter {
                status: Some("pending".to_string()),
                ..Default::default()
            })
            .await?;

        tracing::info!(count = pending.len(), "Found pending payments");

        let mut report = CollectionReport {
            processed: 0,
            completed: 0,
            failed: 0,
            errors: Vec::new(),
            timestamp: Utc::now(),
        };

        for payment in pending {
            report.processed += 1;
            tracing::debug!(
                payment_id = %payment.id,
                amount = payment.amount,
                "Processing payment"
            );

            match Self::verify_collection(&payment) {
                Ok(()) => {
                    self.db
                        .update_payment(
                            payment.id,
                            UpdatePaymentRow {
                                status: Some("completed".to_string()),
                                ..Default::default()
                            },
                        )
                        .await?;
                    report.completed += 1;
                    tracing::info!(payment_id = %payment.id, "Payment collected");
                }
                Err(reason) => {
                    report.failed += 1;
                    tracing::warn!(payment_id = %payment.id, "Payment not collected: {}", reason);
                    report.errors.push(reason);
                }
            }
        }

        let summary = self.db.payments_summary().await?;

        tracing::info!(
            processed = report.processed,
            completed = report.completed,
            failed = report.failed,
            "Collector pass finished"
        );

        Ok(CollectionOutcome { report, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CreatePaymentRow;
    use chrono::NaiveDate;

    async fn seed_payment(db: &StorageBackend, recorder_id: &str, amount: f64, status: &str) {
        db.create_payment(CreatePaymentRow {
            recorder_id: recorder_id.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            description: "Donation".to_string(),
            status: status.to_string(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_pass_completes_valid_and_reports_invalid() {
        let db = StorageBackend::in_memory();
        seed_payment(&db, "rec-1", 100.0, "pending").await;
        seed_payment(&db, "", 50.0, "pending").await; // unusable recorder id
        seed_payment(&db, "rec-3", 25.0, "completed").await; // not pending, untouched

        let outcome = CollectorService::new(db.clone()).run_pass().await.unwrap();

        assert_eq!(outcome.report.processed, 2);
        assert_eq!(outcome.report.completed, 1);
        assert_eq!(outcome.report.failed, 1);
        assert_eq!(outcome.report.errors.len(), 1);

        // The invalid payment stays pending for a later pass
        assert_eq!(outcome.summary.total_pending, 50.0);
        assert_eq!(outcome.summary.total_completed, 125.0);
    }

    #[tokio::test]
    async fn test_pass_with_no_pending_payments() {
        let db = StorageBackend::in_memory();
        seed_payment(&db, "rec-1", 10.0, "cancelled").await;

        let outcome = CollectorService::new(db).run_pass().await.unwrap();

        assert_eq!(outcome.report.processed, 0);
        assert_eq!(outcome.report.completed, 0);
        assert!(outcome.report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_second_pass_is_a_no_op_after_collection() {
        let db = StorageBackend::in_memory();
        seed_payment(&db, "rec-1", 100.0, "pending").await;

        let service = CollectorService::new(db);
        let first = service.run_pass().await.unwrap();
        assert_eq!(first.report.completed, 1);

        let second = service.run_pass().await.unwrap();
        assert_eq!(second.report.processed, 0);
    }
}
