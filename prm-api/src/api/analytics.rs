//! Dashboard analytics

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use prm_common::summary::{reviews_by_source, ALL_MONTHS};
use prm_common::{monthly_trends, normalize_all, summarize, MonthlyTrend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{corpus, ApiResult, AppState};

/// Sources always present in `reviewsBySource`, even with zero reviews
const REPORTED_SOURCES: [&str; 2] = ["hostaway", "google"];

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_reviews: usize,
    pub average_rating: f64,
    pub reviews_by_source: BTreeMap<String, usize>,
    pub year: i32,
    pub monthly_trends: Vec<MonthlyTrend>,
}

/// GET /api/analytics?year=2025
///
/// Computed over the working review set; `year` defaults to the current UTC
/// year.
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Json<AnalyticsResponse>> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let reviews = normalize_all(&corpus::review_corpus(&state).await?);
    let summary = summarize(&reviews);

    let mut by_source = reviews_by_source(&reviews);
    for source in REPORTED_SOURCES {
        by_source.entry(source.to_string()).or_insert(0);
    }

    Ok(Json(AnalyticsResponse {
        total_reviews: summary.total_reviews,
        average_rating: summary.average_rating,
        reviews_by_source: by_source,
        year,
        monthly_trends: monthly_trends(&reviews, year, &ALL_MONTHS),
    }))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/api/analytics", get(get_analytics))
}
