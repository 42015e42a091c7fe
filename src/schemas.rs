use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{MonthlySettlement, SettlementInvoice};

#[derive(Debug, Serialize, Deserialize)]
pub struct SettlementSchema {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub month: u32,
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
}

impl From<MonthlySettlement> for SettlementSchema {
    fn from(s: MonthlySettlement) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            customer_id: s.customer_id,
            month: s.month,
            year: s.year,
            total_transactions: s.total_transactions,
            total_amount: s.total_amount,
            commission_percent: s.commission_percent,
            commission_value: s.commission_value,
            status: s.status.as_str().to_string(),
            invoice_deadline: s.invoice_deadline,
            payment_deadline: s.payment_deadline,
            paid_at: s.paid_at,
            paid_by_user_id: s.paid_by_user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceSchema {
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

impl From<SettlementInvoice> for InvoiceSchema {
    fn from(i: SettlementInvoice) -> Self {
        Self {
            id: i.id,
            settlement_id: i.settlement_id,
            file_ref: i.file_ref,
            access_key: i.access_key,
            invoice_number: i.invoice_number,
            invoice_value: i.invoice_value,
            issuer_cnpj: i.issuer_cnpj,
            issuer_name: i.issuer_name,
            validation_status: i.validation_status.as_str().to_string(),
            validation_error: i.validation_error,
            active: i.active,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettlementListResponse {
    pub settlements: Vec<SettlementSchema>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Serialize)]
pub struct SettlementDetailResponse {
    pub settlement: SettlementSchema,
    pub invoice: Option<InvoiceSchema>,
}
