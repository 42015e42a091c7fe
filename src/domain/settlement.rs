//! Monthly settlement ("repasse") domain entities and the status machine.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Commission values below this (in BRL) are accumulated instead of invoiced.
pub const MIN_PAYOUT_BRL: i64 = 100;

/// Settlement lifecycle states.
///
/// `pending_consolidation → pending_invoice → validating → eligible → paid`,
/// with `pending_invoice` re-entered on invoice rejection. `accumulated` is
/// assigned at consolidation for sub-threshold values and is never promoted
/// by later months. `paid` and `eligible` are sticky under re-consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    PendingConsolidation,
    PendingInvoice,
    Validating,
    Eligible,
    Accumulated,
    Paid,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingConsolidation => "pending_consolidation",
            Self::PendingInvoice => "pending_invoice",
            Self::Validating => "validating",
            Self::Eligible => "eligible",
            Self::Accumulated => "accumulated",
            Self::Paid => "paid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending_consolidation" => Some(Self::PendingConsolidation),
            "pending_invoice" => Some(Self::PendingInvoice),
            "validating" => Some(Self::Validating),
            "eligible" => Some(Self::Eligible),
            "accumulated" => Some(Self::Accumulated),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Statuses a re-consolidation run must not regress.
    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::Paid | Self::Eligible)
    }

    /// Status assigned at consolidation for a freshly computed commission.
    pub fn classify(commission_value: &BigDecimal) -> Self {
        if *commission_value < BigDecimal::from(MIN_PAYOUT_BRL) {
            Self::Accumulated
        } else {
            Self::PendingInvoice
        }
    }
}

/// Invoice validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Valid,
    Invalid,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "valid" => Some(Self::Valid),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

/// One month of commission owed to a user for one customer's volume.
/// Natural key: (user_id, customer_id, month, year).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySettlement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub total_transactions: i64,
    pub total_amount: BigDecimal,
    /// Rate snapshotted at consolidation time, not a live pointer.
    pub commission_percent: BigDecimal,
    pub commission_value: BigDecimal,
    pub status: SettlementStatus,
    pub invoice_deadline: NaiveDate,
    pub payment_deadline: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by_user_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlySettlement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        customer_id: Uuid,
        month: u32,
        year: i32,
        total_transactions: i64,
        total_amount: BigDecimal,
        commission_percent: BigDecimal,
        commission_value: BigDecimal,
    ) -> Self {
        let now = Utc::now();
        let status = SettlementStatus::classify(&commission_value);
        let (invoice_deadline, payment_deadline) = deadlines_for(month, year);
        Self {
            id: Uuid::new_v4(),
            user_id,
            customer_id,
            month,
            year,
            total_transactions,
            total_amount,
            commission_percent,
            commission_value,
            status,
            invoice_deadline,
            payment_deadline,
            paid_at: None,
            paid_by_user_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fiscal invoice uploaded against a settlement. At most one active row per
/// settlement; re-upload deactivates the previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementInvoice {
    pub id: Uuid,
    pub settlement_id: Uuid,
    pub file_ref: String,
    pub access_key: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_value: Option<BigDecimal>,
    pub issuer_cnpj: Option<String>,
    pub issuer_name: Option<String>,
    pub validation_status: ValidationStatus,
    pub validation_error: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl SettlementInvoice {
    pub fn new(settlement_id: Uuid, file_ref: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            settlement_id,
            file_ref,
            access_key: None,
            invoice_number: None,
            invoice_value: None,
            issuer_cnpj: None,
            issuer_name: None,
            validation_status: ValidationStatus::Pending,
            validation_error: None,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// The month that just ended relative to `now`. January rolls back to
/// December of the previous year.
pub fn previous_month(now: DateTime<Utc>) -> (u32, i32) {
    if now.month() == 1 {
        (12, now.year() - 1)
    } else {
        (now.month() - 1, now.year())
    }
}

/// Half-open UTC range covering every full day of the given month.
pub fn month_range_utc(month: u32, year: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first day of month is always valid");
    let (next_month, next_year) = if month == 12 { (1, year + 1) } else { (month + 1, year) };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .expect("first day of month is always valid");
    (start, end)
}

/// Invoice and payment deadlines: the 7th and the 15th of the month
/// following the settled period. Informational only, never enforced.
pub fn deadlines_for(month: u32, year: i32) -> (NaiveDate, NaiveDate) {
    let (next_month, next_year) = if month == 12 { (1, year + 1) } else { (month + 1, year) };
    let invoice = NaiveDate::from_ymd_opt(next_year, next_month, 7)
        .expect("day 7 exists in every month");
    let payment = NaiveDate::from_ymd_opt(next_year, next_month, 15)
        .expect("day 15 exists in every month");
    (invoice, payment)
}
