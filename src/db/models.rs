//! Row types for the Postgres store implementations.
//!
//! Legacy representations (free-text roles, locale-formatted margin
//! strings, stringly statuses) are converted into domain types here, at the
//! data-access boundary, and nowhere else.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    parse_decimal, MonthlySettlement, SettlementInvoice, SettlementStatus, ValidationStatus,
};
use crate::error::AppError;
use crate::stores::{MarginConfig, MdrMargin};

#[derive(Debug, FromRow)]
pub struct MonthlySettlementRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub total_transactions: i64,
    pub total_amount: BigDecimal,
    pub commission_percent: BigDecimal,
    pub commission_value: BigDecimal,
    pub status: String,
    pub invoice_deadline: NaiveDate,
    pub payment_deadline: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by_user_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlySettlementRow {
    pub fn into_domain(self) -> Result<MonthlySettlement, AppError> {
        let status = SettlementStatus::parse(&self.status).ok_or_else(|| {
            AppError::InternalError(format!("unknown settlement status: {}", self.status))
        })?;
        Ok(MonthlySettlement {
            id: self.id,
            user_id: self.user_id,
            customer_id: self.customer_id,
            month: self.month as u32,
            year: self.year,
            total_transactions: self.total_transactions,
            total_amount: self.total_amount,
            commission_percent: self.commission_percent,
            commission_value: self.commission_value,
            status,
            invoice_deadline: self.invoice_deadline,
            payment_deadline: self.payment_deadline,
            paid_at: self.paid_at,
            paid_by_user_id: self.paid_by_user_id,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SettlementInvoiceRow {
    pub id: Uuid,
    pub settlement_id: Uuid,
    pub file_ref: String,
    pub access_key: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_value: Option<BigDecimal>,
    pub issuer_cnpj: Option<String>,
    pub issuer_name: Option<String>,
    pub validation_status: String,
    pub validation_error: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl SettlementInvoiceRow {
    pub fn into_domain(self) -> Result<SettlementInvoice, AppError> {
        let validation_status = ValidationStatus::parse(&self.validation_status).ok_or_else(|| {
            AppError::InternalError(format!(
                "unknown invoice validation status: {}",
                self.validation_status
            ))
        })?;
        Ok(SettlementInvoice {
            id: self.id,
            settlement_id: self.settlement_id,
            file_ref: self.file_ref,
            access_key: self.access_key,
            invoice_number: self.invoice_number,
            invoice_value: self.invoice_value,
            issuer_cnpj: self.issuer_cnpj,
            issuer_name: self.issuer_name,
            validation_status,
            validation_error: self.validation_error,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

/// Margin percentages are stored as legacy locale-formatted text ("2,5").
#[derive(Debug, FromRow)]
pub struct MarginConfigRow {
    pub customer_id: Uuid,
    pub margin_outbank: Option<String>,
    pub margin_executivo: Option<String>,
    pub margin_core: Option<String>,
}

impl MarginConfigRow {
    pub fn into_domain(self) -> Result<MarginConfig, AppError> {
        Ok(MarginConfig {
            customer_id: self.customer_id,
            margin_outbank: parse_optional(self.margin_outbank)?,
            margin_executivo: parse_optional(self.margin_executivo)?,
            margin_core: parse_optional(self.margin_core)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct MdrMarginRow {
    pub brand: String,
    pub modality: String,
    pub channel: String,
    pub percent: String,
}

impl MdrMarginRow {
    pub fn into_domain(self) -> Result<MdrMargin, AppError> {
        Ok(MdrMargin {
            brand: self.brand,
            modality: self.modality,
            channel: self.channel,
            percent: parse_decimal(&self.percent)?,
        })
    }
}

fn parse_optional(raw: Option<String>) -> Result<Option<BigDecimal>, AppError> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(Some(parse_decimal(&s)?)),
        _ => Ok(None),
    }
}
