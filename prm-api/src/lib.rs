//! prm-api library - Property Review Manager HTTP service
//!
//! Serves normalized guest reviews, approval moderation, property pages and
//! review analytics over JSON.

use axum::Router;
use prm_common::approvals::ApprovalStore;
use prm_common::db::{PropertiesRepository, ReviewRepository};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod corpus;
pub mod error;
pub mod hostaway;
pub mod mock;

pub use error::{ApiError, ApiResult};
use hostaway::HostawayClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub reviews: ReviewRepository,
    pub properties: PropertiesRepository,
    pub approvals: Arc<dyn ApprovalStore>,
    pub hostaway: Arc<HostawayClient>,
}

impl AppState {
    /// Create application state; both repositories share `pool`
    pub fn new(pool: SqlitePool, approvals: Arc<dyn ApprovalStore>, hostaway: HostawayClient) -> Self {
        Self {
            reviews: ReviewRepository::new(pool.clone()),
            properties: PropertiesRepository::new(pool),
            approvals,
            hostaway: Arc::new(hostaway),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::review_routes())
        .merge(api::record_routes())
        .merge(api::property_routes())
        .merge(api::analytics_routes())
        .merge(api::migrate_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
