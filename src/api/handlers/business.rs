//! Business-side handlers: setup, deal management, analytics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    AnalyticsResponse, BusinessDealDto, BusinessDealListResponse, BusinessResponse,
    CreateBusinessRequest, CreateDealRequest, SetDealActiveRequest,
};
use crate::app_state::AppState;
use crate::domain::SessionContext;
use crate::error::{ApiError, ErrorResponse};
use crate::persistence::models::NewBusiness;
use crate::service::business::DealDraft;

/// `POST /business` — One-time business setup.
///
/// # Errors
///
/// Returns [`ApiError`] if a business already exists for the owner or
/// required fields are blank.
#[utoipa::path(
    post,
    path = "/api/v1/business",
    tag = "Business",
    summary = "Create the business profile",
    description = "One-time setup for a business account, gated on the absence of an existing profile for the owner.",
    request_body = CreateBusinessRequest,
    responses(
        (status = 201, description = "Business created", body = BusinessResponse),
        (status = 409, description = "Business already exists", body = ErrorResponse),
    )
)]
pub async fn create_business(
    State(state): State<AppState>,
    session: SessionContext,
    Json(req): Json<CreateBusinessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let business = state
        .business
        .create_business(
            &session,
            NewBusiness {
                owner_id: session.user_id,
                name: req.name,
                description: req.description,
                address: req.address,
                latitude: req.latitude,
                longitude: req.longitude,
                category: req.category,
                logo_url: req.logo_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(BusinessResponse::from(business))))
}

/// `GET /business` — The session owner's business profile.
///
/// # Errors
///
/// Returns [`ApiError::BusinessNotFound`] until setup has happened.
#[utoipa::path(
    get,
    path = "/api/v1/business",
    tag = "Business",
    summary = "Get the business profile",
    description = "Returns the session owner's business, or 404 until setup has happened (the signal to show the setup screen).",
    responses(
        (status = 200, description = "Business profile", body = BusinessResponse),
        (status = 404, description = "No business yet", body = ErrorResponse),
    )
)]
pub async fn get_business(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let business = state.business.current_business(&session).await?;
    Ok(Json(BusinessResponse::from(business)))
}

/// `GET /business/deals` — All deals of the session owner's business.
///
/// # Errors
///
/// Returns [`ApiError`] for sessions without a business profile.
#[utoipa::path(
    get,
    path = "/api/v1/business/deals",
    tag = "Business",
    summary = "List own deals",
    description = "Returns every deal of the business (active or not), newest first, with redemption counters.",
    responses(
        (status = 200, description = "Deal list", body = BusinessDealListResponse),
        (status = 404, description = "No business yet", body = ErrorResponse),
    )
)]
pub async fn list_business_deals(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let deals = state.business.list_deals(&session).await?;
    let data = deals.into_iter().map(BusinessDealDto::from).collect();
    Ok(Json(BusinessDealListResponse { data }))
}

/// `POST /business/deals` — Publish a new deal.
///
/// # Errors
///
/// Returns [`ApiError`] for invalid fields or sessions without a
/// business profile.
#[utoipa::path(
    post,
    path = "/api/v1/business/deals",
    tag = "Business",
    summary = "Create a deal",
    description = "Publishes a new deal for the business. New deals start active with a zero redemption counter.",
    request_body = CreateDealRequest,
    responses(
        (status = 201, description = "Deal created", body = BusinessDealDto),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "No business yet", body = ErrorResponse),
    )
)]
pub async fn create_deal(
    State(state): State<AppState>,
    session: SessionContext,
    Json(req): Json<CreateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deal = state
        .business
        .create_deal(
            &session,
            DealDraft {
                title: req.title,
                description: req.description,
                discount_value: req.discount_value,
                terms: req.terms,
                expiry_date: req.expiry_date,
                max_redemptions: req.max_redemptions,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(BusinessDealDto::from(deal))))
}

/// `PATCH /business/deals/{id}` — Switch a deal on or off.
///
/// # Errors
///
/// Returns [`ApiError::DealNotFound`] if the deal does not belong to
/// the session owner's business.
#[utoipa::path(
    patch,
    path = "/api/v1/business/deals/{id}",
    tag = "Business",
    summary = "Set a deal's active flag",
    description = "Activates or deactivates a deal, scoped to the owning business.",
    params(
        ("id" = uuid::Uuid, Path, description = "Deal UUID"),
    ),
    request_body = SetDealActiveRequest,
    responses(
        (status = 204, description = "Flag updated"),
        (status = 404, description = "Deal not found for this business", body = ErrorResponse),
    )
)]
pub async fn set_deal_active(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
    Json(req): Json<SetDealActiveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .business
        .set_deal_active(&session, id, req.is_active)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /business/analytics` — Aggregated deal and redemption counts.
///
/// # Errors
///
/// Returns [`ApiError`] for sessions without a business profile.
#[utoipa::path(
    get,
    path = "/api/v1/business/analytics",
    tag = "Business",
    summary = "Business analytics",
    description = "Returns total/active deal counts, the total number of finalized redemptions, and the recent-redemption feed.",
    responses(
        (status = 200, description = "Analytics summary", body = AnalyticsResponse),
        (status = 404, description = "No business yet", body = ErrorResponse),
    )
)]
pub async fn business_analytics(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.analytics.summary(&session).await?;
    Ok(Json(AnalyticsResponse::from(summary)))
}

/// Business management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/business", post(create_business).get(get_business))
        .route("/business/deals", get(list_business_deals).post(create_deal))
        .route("/business/deals/{id}", patch(set_deal_active))
        .route("/business/analytics", get(business_analytics))
}
