//! Stored review records (CRUD over the review store)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use prm_common::db::{ReviewPatch, ReviewQuery};
use prm_common::RawReview;
use serde::Serialize;
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub reviews: Vec<RawReview>,
    /// Matching records ignoring paging
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/reviews/records?listingId=&channel=&status=&approved=&limit=&skip=&sort=
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Json<RecordsResponse>> {
    let reviews = state.reviews.find_all(&query).await?;
    let total = state.reviews.count(&query).await?;
    Ok(Json(RecordsResponse { reviews, total }))
}

/// POST /api/reviews/records
///
/// 409 when the id is already stored.
pub async fn create_record(
    State(state): State<AppState>,
    Json(review): Json<RawReview>,
) -> ApiResult<(StatusCode, Json<RawReview>)> {
    if review.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Review id cannot be empty".to_string()));
    }

    let created = state.reviews.create(&review).await?;
    info!(review_id = %created.id, "Review record created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/reviews/records/:id
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RawReview>> {
    state
        .reviews
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", id)))
}

/// PUT /api/reviews/records/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ReviewPatch>,
) -> ApiResult<Json<RawReview>> {
    state
        .reviews
        .update_by_id(&id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", id)))
}

/// DELETE /api/reviews/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.reviews.delete_by_id(&id).await? {
        return Err(ApiError::NotFound(format!("Review {}", id)));
    }

    info!(review_id = %id, "Review record deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Review deleted".to_string(),
    }))
}

pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews/records", get(list_records).post(create_record))
        .route(
            "/api/reviews/records/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
}
