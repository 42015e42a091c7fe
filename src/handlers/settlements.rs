use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{SettlementStatus, ValidationStatus};
use crate::error::AppError;
use crate::schemas::{
    InvoiceSchema, SettlementDetailResponse, SettlementListResponse, SettlementSchema,
};
use crate::stores::{AdminSettlementFilter, InvoiceFields};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SelfServiceQuery {
    pub user_id: Uuid,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Self-service listing: a user's own settlements, most recent period first.
pub async fn list_settlements(
    State(state): State<AppState>,
    Query(query): Query<SelfServiceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

    let (settlements, total) = state
        .settlements
        .list_for_user(query.user_id, page, page_size)
        .await?;

    Ok(Json(SettlementListResponse {
        settlements: settlements.into_iter().map(SettlementSchema::from).collect(),
        total,
        page,
        per_page: page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    /// Viewer identity, used only for visibility scoping.
    pub requesting_user_id: Uuid,
    pub status: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Administrative listing across users. Settlements owned by SUPER_ADMIN
/// users are hidden from non-super-admin viewers.
pub async fn list_settlements_admin(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = match &query.status {
        Some(raw) => Some(SettlementStatus::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!("unknown settlement status: {}", raw))
        })?),
        None => None,
    };

    let viewer_role = state.directory.user_role(query.requesting_user_id).await?;
    let include_super_admin_rows =
        viewer_role.map(|r| r.is_super_admin()).unwrap_or(false);

    let filter = AdminSettlementFilter {
        status,
        month: query.month,
        year: query.year,
        user_id: query.user_id,
        include_super_admin_rows,
    };

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
    let (settlements, total) = state.settlements.list_admin(&filter, page, page_size).await?;

    Ok(Json(SettlementListResponse {
        settlements: settlements.into_iter().map(SettlementSchema::from).collect(),
        total,
        page,
        per_page: page_size,
    }))
}

/// Get a settlement by ID
///
/// Returns the settlement and its currently active invoice, if any.
#[utoipa::path(
    get,
    path = "/settlements/{id}",
    params(
        ("id" = String, Path, description = "Settlement ID")
    ),
    responses(
        (status = 200, description = "Settlement found"),
        (status = 404, description = "Settlement not found"),
        (status = 500, description = "Database error")
    ),
    tag = "Settlements"
)]
pub async fn get_settlement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let settlement = state
        .settlements
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("settlement {} not found", id)))?;
    let invoice = state.invoices.active_for_settlement(id).await?;

    Ok(Json(SettlementDetailResponse {
        settlement: SettlementSchema::from(settlement),
        invoice: invoice.map(InvoiceSchema::from),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UploadInvoiceRequest {
    pub file_ref: String,
}

pub async fn upload_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UploadInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.file_ref.trim().is_empty() {
        return Err(AppError::BadRequest("file_ref must not be empty".to_string()));
    }

    let invoice = state.lifecycle().upload_invoice(id, request.file_ref).await?;
    Ok(Json(InvoiceSchema::from(invoice)))
}

#[derive(Debug, Deserialize)]
pub struct RecordValidationRequest {
    /// "valid" or "invalid".
    pub status: String,
    #[serde(default)]
    pub fields: InvoiceFields,
    pub error: Option<String>,
}

pub async fn record_validation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordValidationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = ValidationStatus::parse(&request.status).ok_or_else(|| {
        AppError::BadRequest(format!("unknown validation status: {}", request.status))
    })?;

    state
        .lifecycle()
        .record_validation(id, status, request.fields, request.error)
        .await?;

    Ok(Json(serde_json::json!({ "recorded": true })))
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    pub paid_by_user_id: Uuid,
}

/// Guarded payment transition. Responds 200 with `success: false` when the
/// settlement is not eligible, a correctable condition rather than an error.
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MarkPaidRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.lifecycle().mark_paid(id, request.paid_by_user_id).await?;
    Ok(Json(outcome))
}

/// The commissions a user inherits from their active customer links.
pub async fn user_commissions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let commissions = state.commissions().inherited_commissions(user_id).await?;
    Ok(Json(commissions))
}
