//! Redemption lifecycle handlers: request, verify, finalize, history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    CodeTicketResponse, FinalizeResponse, RedemptionDetailsResponse, RedemptionHistoryDto,
    RedemptionHistoryResponse, RequestCodeRequest, VerifyCodeRequest,
};
use crate::app_state::AppState;
use crate::domain::{RedemptionCode, RedemptionStatus, SessionContext};
use crate::error::{ApiError, ErrorResponse};

/// `POST /redemptions` — Request a one-time code for a deal.
///
/// # Errors
///
/// Returns [`ApiError`] for missing sessions, non-customer sessions, or
/// backend failures.
#[utoipa::path(
    post,
    path = "/api/v1/redemptions",
    tag = "Redemptions",
    summary = "Request a redemption code",
    description = "Mints a single-use code binding the deal to the customer, valid for the configured window (60 seconds by default). Returns the code, its absolute expiry, and the URL of a scannable image rendering.",
    request_body = RequestCodeRequest,
    responses(
        (status = 201, description = "Code issued", body = CodeTicketResponse),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 403, description = "Not a customer session", body = ErrorResponse),
    )
)]
pub async fn request_code(
    State(state): State<AppState>,
    session: SessionContext,
    Json(req): Json<RequestCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = state
        .redemptions
        .request_code(&session, req.deal_id, req.business_id)
        .await?;
    Ok((StatusCode::CREATED, Json(CodeTicketResponse::from(ticket))))
}

/// `POST /redemptions/verify` — Verify a scanned code.
///
/// # Errors
///
/// Returns [`ApiError`] for unknown, consumed, or expired codes, and
/// for sessions without a business profile.
#[utoipa::path(
    post,
    path = "/api/v1/redemptions/verify",
    tag = "Redemptions",
    summary = "Verify a scanned code",
    description = "Looks up the code scoped to the scanning business. Unknown codes are 404, consumed codes 409, expired codes 410 (the expiry transition is persisted as a side effect of detection). A valid verify has no side effect and returns the details for the confirmation screen.",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Valid code with details", body = RedemptionDetailsResponse),
        (status = 404, description = "Unknown code", body = ErrorResponse),
        (status = 409, description = "Already redeemed", body = ErrorResponse),
        (status = 410, description = "Expired", body = ErrorResponse),
    )
)]
pub async fn verify_code(
    State(state): State<AppState>,
    session: SessionContext,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = RedemptionCode::new(req.code);
    let lookup = state.redemptions.verify_code(&session, &code).await?;
    Ok(Json(RedemptionDetailsResponse::from(lookup)))
}

/// `POST /redemptions/{id}/finalize` — Consume a verified code.
///
/// # Errors
///
/// Returns [`ApiError`] if the redemption is unknown, already terminal,
/// or the deal's redemption cap has been reached.
#[utoipa::path(
    post,
    path = "/api/v1/redemptions/{id}/finalize",
    tag = "Redemptions",
    summary = "Finalize a redemption",
    description = "Marks the verified redemption as redeemed and increments the deal's counter, atomically and subject to the deal's cap.",
    params(
        ("id" = uuid::Uuid, Path, description = "Redemption UUID"),
    ),
    responses(
        (status = 200, description = "Redemption finalized", body = FinalizeResponse),
        (status = 404, description = "Unknown redemption", body = ErrorResponse),
        (status = 409, description = "Already redeemed or cap reached", body = ErrorResponse),
        (status = 410, description = "Expired before verification", body = ErrorResponse),
    )
)]
pub async fn finalize_redemption(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.redemptions.finalize(&session, id).await?;
    Ok(Json(FinalizeResponse {
        redemption_id: id,
        status: RedemptionStatus::Redeemed,
    }))
}

/// `GET /redemptions/history` — The customer's redemption history.
///
/// # Errors
///
/// Returns [`ApiError`] for missing sessions, business sessions, or
/// backend failures.
#[utoipa::path(
    get,
    path = "/api/v1/redemptions/history",
    tag = "Redemptions",
    summary = "Redemption history",
    description = "Returns the customer's redemptions newest first, joined with deal and business names.",
    responses(
        (status = 200, description = "Redemption history", body = RedemptionHistoryResponse),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 403, description = "Not a customer session", body = ErrorResponse),
    )
)]
pub async fn redemption_history(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.redemptions.history(&session).await?;
    let data = entries.into_iter().map(RedemptionHistoryDto::from).collect();
    Ok(Json(RedemptionHistoryResponse { data }))
}

/// Redemption lifecycle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/redemptions", post(request_code))
        .route("/redemptions/verify", post(verify_code))
        .route("/redemptions/{id}/finalize", post(finalize_redemption))
        .route("/redemptions/history", get(redemption_history))
}
