//! Settlement status lifecycle.
//!
//! Invoice upload moves a settlement to `validating`; the validation
//! outcome settles it to `eligible` or back to `pending_invoice`; payment
//! is a guarded transition out of `eligible` only.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{SettlementInvoice, SettlementStatus, ValidationStatus};
use crate::error::AppError;
use crate::stores::{InvoiceFields, InvoiceStore, SettlementStore};

/// Result of a mark-paid attempt. Not-eligible is a caller-correctable
/// condition reported in-band, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub message: String,
}

pub struct SettlementLifecycle {
    settlements: Arc<dyn SettlementStore>,
    invoices: Arc<dyn InvoiceStore>,
}

impl SettlementLifecycle {
    pub fn new(settlements: Arc<dyn SettlementStore>, invoices: Arc<dyn InvoiceStore>) -> Self {
        Self {
            settlements,
            invoices,
        }
    }

    /// Attach an invoice to a settlement.
    ///
    /// Any previously active invoice is deactivated; the new one starts in
    /// `pending` validation and the settlement moves to `validating`. The
    /// current settlement status is deliberately not checked; callers only
    /// invoke this pre-payment.
    pub async fn upload_invoice(
        &self,
        settlement_id: Uuid,
        file_ref: String,
    ) -> Result<SettlementInvoice, AppError> {
        let settlement = self
            .settlements
            .get(settlement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("settlement {} not found", settlement_id)))?;

        let invoice = SettlementInvoice::new(settlement.id, file_ref);
        self.invoices.insert_replacing(&invoice).await?;
        self.settlements
            .set_status(settlement.id, SettlementStatus::Validating)
            .await?;

        info!(
            settlement_id = %settlement.id,
            invoice_id = %invoice.id,
            "Invoice uploaded, settlement moved to validating"
        );

        Ok(invoice)
    }

    /// Record the validation outcome for an invoice.
    ///
    /// Moves the parent settlement to `eligible` on a valid invoice or back
    /// to `pending_invoice` on an invalid one. A settlement is never left
    /// in `validating` after an outcome arrives.
    pub async fn record_validation(
        &self,
        invoice_id: Uuid,
        status: ValidationStatus,
        fields: InvoiceFields,
        error: Option<String>,
    ) -> Result<(), AppError> {
        if status == ValidationStatus::Pending {
            return Err(AppError::BadRequest(
                "validation outcome must be valid or invalid".to_string(),
            ));
        }

        let invoice = self
            .invoices
            .get(invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice {} not found", invoice_id)))?;

        self.invoices
            .record_validation(invoice.id, status, fields, error)
            .await?;

        let next = match status {
            ValidationStatus::Valid => SettlementStatus::Eligible,
            _ => SettlementStatus::PendingInvoice,
        };
        self.settlements
            .set_status(invoice.settlement_id, next)
            .await?;

        info!(
            invoice_id = %invoice.id,
            settlement_id = %invoice.settlement_id,
            outcome = status.as_str(),
            "Invoice validation recorded"
        );

        Ok(())
    }

    /// Mark a settlement as paid. Only `eligible` settlements can be paid;
    /// anything else yields a structured not-eligible outcome.
    pub async fn mark_paid(
        &self,
        settlement_id: Uuid,
        paid_by_user_id: Uuid,
    ) -> Result<PaymentOutcome, AppError> {
        let settlement = self
            .settlements
            .get(settlement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("settlement {} not found", settlement_id)))?;

        if settlement.status != SettlementStatus::Eligible {
            return Ok(PaymentOutcome {
                success: false,
                message: format!(
                    "settlement is {}, only eligible settlements can be marked paid",
                    settlement.status.as_str()
                ),
            });
        }

        self.settlements
            .record_payment(settlement.id, paid_by_user_id, Utc::now())
            .await?;

        info!(
            settlement_id = %settlement.id,
            paid_by = %paid_by_user_id,
            "Settlement marked paid"
        );

        Ok(PaymentOutcome {
            success: true,
            message: "settlement marked paid".to_string(),
        })
    }
}
