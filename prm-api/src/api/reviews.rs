//! Review feeds and approval moderation
//!
//! - `GET /api/reviews`: built-in dataset, normalized
//! - `GET /api/reviews/hostaway`: Hostaway feed, optionally grouped
//! - `GET /api/reviews/google`: mock Google Places reviews
//! - `POST /api/reviews/approve`, `GET /api/reviews/approvals`

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prm_common::approvals::ApprovalMap;
use prm_common::{group_by, normalize_all, summarize, GroupKey, Groups, NormalizedReview, Summary};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mock::{self, GoogleReview};
use crate::{corpus, ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<NormalizedReview>,
}

#[derive(Debug, Serialize)]
pub struct GoogleReviewsResponse {
    pub reviews: Vec<GoogleReview>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostawayParams {
    pub group_by: Option<String>,
    pub mock: Option<String>,
}

/// Hostaway feed, grouped or flat with a summary
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HostawayReviewsResponse {
    #[serde(rename_all = "camelCase")]
    Grouped {
        grouped_by: GroupKey,
        data: Groups,
        total: usize,
    },
    Flat {
        reviews: Vec<NormalizedReview>,
        total: usize,
        summary: Summary,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub review_id: String,
    pub approved: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl ApproveResponse {
    fn not_found() -> Response {
        let body = ApproveResponse {
            success: false,
            message: "Review not found".to_string(),
            review_id: None,
            approved: None,
        };
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalsResponse {
    pub approvals: ApprovalMap,
}

/// GET /api/reviews
pub async fn list_reviews() -> Json<ReviewsResponse> {
    Json(ReviewsResponse {
        reviews: normalize_all(&mock::hostaway_reviews()),
    })
}

/// GET /api/reviews/hostaway?groupBy=listing|type|channel|date&mock=true
///
/// Unknown `groupBy` values give the flat view. Any failure of the Hostaway
/// source (including its store fallback) serves the built-in dataset.
pub async fn hostaway_reviews(
    State(state): State<AppState>,
    Query(params): Query<HostawayParams>,
) -> Json<HostawayReviewsResponse> {
    let raw = if params.mock.as_deref() == Some("true") {
        mock::hostaway_reviews()
    } else {
        match state.hostaway.get_all_reviews().await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!("Hostaway source failed, falling back to built-in reviews: {}", e);
                mock::hostaway_reviews()
            }
        }
    };

    let reviews = normalize_all(&raw);
    let total = reviews.len();

    let group_key = params.group_by.as_deref().and_then(|value| {
        value
            .parse::<GroupKey>()
            .map_err(|e| warn!("{}; returning ungrouped reviews", e))
            .ok()
    });

    let response = match group_key {
        Some(key) => HostawayReviewsResponse::Grouped {
            grouped_by: key,
            data: group_by(&reviews, key),
            total,
        },
        None => HostawayReviewsResponse::Flat {
            summary: summarize(&reviews),
            reviews,
            total,
        },
    };

    Json(response)
}

/// GET /api/reviews/google
pub async fn google_reviews() -> Json<GoogleReviewsResponse> {
    Json(GoogleReviewsResponse {
        reviews: mock::google_reviews(),
    })
}

/// POST /api/reviews/approve
///
/// **Request:** `{"reviewId": "7453", "approved": true}`
/// **Response:** `{"success": true, "message": "Review approved", "reviewId": "7453", "approved": true}`
///
/// Ids unknown to both the built-in dataset and the review store give 404
/// `{"success": false, "message": "Review not found"}`. On success the
/// stored rating of the review's property is refreshed.
pub async fn approve_review(
    State(state): State<AppState>,
    Json(payload): Json<ApproveRequest>,
) -> ApiResult<Response> {
    let review_id = payload.review_id.trim();
    if review_id.is_empty() {
        return Err(ApiError::BadRequest("reviewId cannot be empty".to_string()));
    }

    let known = match mock::hostaway_reviews().into_iter().find(|r| r.id == review_id) {
        Some(review) => Some(review),
        None => state.reviews.find_by_id(review_id).await?,
    };
    let Some(review) = known else {
        return Ok(ApproveResponse::not_found());
    };

    match state
        .approvals
        .set_approval_status(review_id, payload.approved)
        .await
    {
        Ok(()) => {}
        Err(prm_common::Error::NotFound(_)) => return Ok(ApproveResponse::not_found()),
        Err(e) => return Err(e.into()),
    }

    let verb = if payload.approved { "approved" } else { "rejected" };
    info!(review_id, backend = %state.approvals.backend(), "Review {}", verb);

    if let Some(listing_id) = review.listing_id.as_deref() {
        if let Err(e) = refresh_property_rating(&state, listing_id).await {
            warn!(listing_id, "Failed to refresh property rating: {}", e);
        }
    }

    let body = ApproveResponse {
        success: true,
        message: format!("Review {}", verb),
        review_id: Some(review_id.to_string()),
        approved: Some(payload.approved),
    };
    Ok(Json(body).into_response())
}

async fn refresh_property_rating(state: &AppState, listing_id: &str) -> ApiResult<()> {
    let rating = corpus::listing_rating(state, listing_id).await?;
    state.properties.update_rating(listing_id, rating).await?;
    Ok(())
}

/// GET /api/reviews/approvals
pub async fn list_approvals(State(state): State<AppState>) -> ApiResult<Json<ApprovalsResponse>> {
    let approvals = state.approvals.all_approvals().await?;
    Ok(Json(ApprovalsResponse { approvals }))
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", get(list_reviews))
        .route("/api/reviews/hostaway", get(hostaway_reviews))
        .route("/api/reviews/google", get(google_reviews))
        .route("/api/reviews/approve", post(approve_review))
        .route("/api/reviews/approvals", get(list_approvals))
}
