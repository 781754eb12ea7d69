//! Seeding the store with the built-in dataset
//!
//! Re-running is safe: records whose id is already stored are skipped.

use axum::{extract::State, routing::get, Json, Router};
use prm_common::db::ReviewQuery;
use serde::Serialize;
use tracing::{error, info};

use crate::{corpus, mock, ApiResult, AppState};

/// Reviews inserted per transaction
pub const BATCH_SIZE: usize = 10;

#[derive(Debug, Serialize)]
pub struct MigrateUsage {
    pub message: String,
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateResponse {
    pub success: bool,
    pub message: String,
    /// Reviews inserted by this run
    pub inserted: u64,
    pub properties_inserted: u64,
    /// Reviews in the store after the run
    pub total: i64,
}

/// GET /api/migrate
pub async fn migrate_usage() -> Json<MigrateUsage> {
    Json(MigrateUsage {
        message: "Use POST method to run data migration".to_string(),
        endpoint: "POST /api/migrate".to_string(),
    })
}

/// POST /api/migrate
///
/// A failing batch is logged and skipped; the run continues with the next.
pub async fn run_migration(State(state): State<AppState>) -> ApiResult<Json<MigrateResponse>> {
    let existing = state.reviews.count(&ReviewQuery::default()).await?;
    if existing > 0 {
        info!("Review store already holds {} reviews, adding missing ones", existing);
    }

    let reviews = mock::hostaway_reviews();
    info!("Migrating {} built-in reviews", reviews.len());

    let mut inserted = 0;
    for (index, batch) in reviews.chunks(BATCH_SIZE).enumerate() {
        match state.reviews.bulk_create(batch).await {
            Ok(count) => {
                inserted += count;
                info!("Inserted batch {} ({} of {} reviews)", index + 1, count, batch.len());
            }
            Err(e) => error!("Review batch {} failed, skipping: {}", index + 1, e),
        }
    }

    // Seeded properties carry the rating of their approved reviews
    let mut properties = mock::properties();
    corpus::apply_listing_ratings(&mut properties, &corpus::listing_ratings(&state).await?);
    let properties_inserted = state.properties.bulk_create(&properties).await?;
    let total = state.reviews.count(&ReviewQuery::default()).await?;

    info!(inserted, properties_inserted, total, "Migration completed");

    Ok(Json(MigrateResponse {
        success: true,
        message: "Data migration completed successfully".to_string(),
        inserted,
        properties_inserted,
        total,
    }))
}

pub fn migrate_routes() -> Router<AppState> {
    Router::new().route("/api/migrate", get(migrate_usage).post(run_migration))
}
