//! Catalog and favorites handlers: browse deals, toggle and list
//! favorites.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{CatalogQuery, DealDto, DealListResponse, FavoriteToggleResponse};
use crate::app_state::AppState;
use crate::domain::{SessionContext, UserType};
use crate::error::{ApiError, ErrorResponse};
use crate::service::catalog::CatalogFilter;

/// `GET /deals` — Browse active, non-expired deals.
///
/// # Errors
///
/// Returns [`ApiError`] when no session can be established or the
/// backend fails.
#[utoipa::path(
    get,
    path = "/api/v1/deals",
    tag = "Catalog",
    summary = "Browse deals",
    description = "Returns active, non-expired deals newest first, with optional substring search and category filtering. Each entry carries the caller's favorite flag.",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Deal list", body = DealListResponse),
        (status = 401, description = "No session", body = ErrorResponse),
    )
)]
pub async fn list_deals(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = CatalogFilter {
        search: query.search,
        category: query.category,
    };
    let deals = state.catalog.list_deals(&filter).await?;

    // Business sessions may browse too; they just have no favorites.
    let favorite_ids: HashSet<Uuid> = if session.user_type == UserType::Customer {
        state.favorites.favorite_ids(&session).await?
    } else {
        HashSet::new()
    };

    let data = deals
        .into_iter()
        .map(|entry| {
            let is_favorite = favorite_ids.contains(&entry.deal.id);
            DealDto::from_entry(entry, is_favorite)
        })
        .collect();

    Ok(Json(DealListResponse { data }))
}

/// `GET /deals/favorites` — The session user's favorited deals.
///
/// # Errors
///
/// Returns [`ApiError`] for missing sessions, business sessions, or
/// backend failures.
#[utoipa::path(
    get,
    path = "/api/v1/deals/favorites",
    tag = "Catalog",
    summary = "List favorited deals",
    description = "Returns the customer's favorited deals that are still active and non-expired.",
    responses(
        (status = 200, description = "Favorited deals", body = DealListResponse),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 403, description = "Not a customer session", body = ErrorResponse),
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<impl IntoResponse, ApiError> {
    let deals = state.favorites.favorite_deals(&session).await?;
    let data = deals
        .into_iter()
        .map(|entry| DealDto::from_entry(entry, true))
        .collect();
    Ok(Json(DealListResponse { data }))
}

/// `POST /deals/{id}/favorite` — Toggle a deal in the favorite set.
///
/// # Errors
///
/// Returns [`ApiError`] for missing sessions, business sessions, or
/// backend failures.
#[utoipa::path(
    post,
    path = "/api/v1/deals/{id}/favorite",
    tag = "Catalog",
    summary = "Toggle a favorite",
    description = "Flips membership of the deal in the customer's favorite set and returns the new membership.",
    params(
        ("id" = uuid::Uuid, Path, description = "Deal UUID"),
    ),
    responses(
        (status = 200, description = "Updated membership", body = FavoriteToggleResponse),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 403, description = "Not a customer session", body = ErrorResponse),
    )
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let is_favorite = state.favorites.toggle(&session, id).await?;
    Ok(Json(FavoriteToggleResponse {
        deal_id: id,
        is_favorite,
    }))
}

/// Catalog and favorites routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals", get(list_deals))
        .route("/deals/favorites", get(list_favorites))
        .route("/deals/{id}/favorite", post(toggle_favorite))
}
