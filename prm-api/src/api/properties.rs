//! Property listing and property pages
//!
//! Property ratings shown here are derived from approved reviews; a property
//! without approved reviews keeps its stored rating.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use prm_common::db::PropertyPatch;
use prm_common::property::{Property, PropertyFilter, PropertySearchResult};
use prm_common::NormalizedReview;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{corpus, mock, ApiError, ApiResult, AppState};

/// Query string of `GET /api/properties`
///
/// `amenities` is comma separated; `q` searches name and description.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub amenities: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl PropertyParams {
    fn filter(&self) -> PropertyFilter {
        let amenities: Vec<String> = self
            .amenities
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();

        PropertyFilter {
            location: self.location.clone().filter(|l| !l.trim().is_empty()),
            min_rating: self.min_rating,
            max_price: self.max_price,
            amenities: (!amenities.is_empty()).then_some(amenities),
            limit: self.limit,
            skip: self.skip,
        }
    }

    fn search_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyDetailResponse {
    pub property: Property,
    /// Approved reviews of the property, normalized
    pub reviews: Vec<NormalizedReview>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Apply `skip`/`limit` in memory; zero or absent means unbounded
fn page<T>(items: Vec<T>, skip: Option<i64>, limit: Option<i64>) -> Vec<T> {
    let skip = skip.filter(|s| *s > 0).unwrap_or(0) as usize;
    let limit = limit.filter(|l| *l > 0).map_or(usize::MAX, |l| l as usize);
    items.into_iter().skip(skip).take(limit).collect()
}

/// Rating descending (unrated last), then name
fn sort_by_rating(properties: &mut [Property]) {
    properties.sort_by(|a, b| {
        let a_rating = a.rating.unwrap_or(f64::NEG_INFINITY);
        let b_rating = b.rating.unwrap_or(f64::NEG_INFINITY);
        b_rating.total_cmp(&a_rating).then_with(|| a.name.cmp(&b.name))
    });
}

/// GET /api/properties
///
/// Served from the store; the built-in properties stand in while the store
/// holds none. Ratings derived from approved reviews are applied before
/// filtering, so `minRating` is checked against the rating that is returned.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<PropertyParams>,
) -> ApiResult<Json<PropertySearchResult>> {
    let filter = params.filter();
    let skip = filter.skip.unwrap_or(0).max(0);
    let ratings = corpus::listing_ratings(&state).await?;

    // Stored ratings may be stale, so the rating bound and paging stay in memory
    let candidates_filter = PropertyFilter {
        min_rating: None,
        limit: None,
        skip: None,
        ..filter.clone()
    };

    let stored = state.properties.count(&PropertyFilter::default()).await?;
    let mut properties = if stored == 0 {
        debug!("Property store empty, using built-in properties");
        mock::properties()
            .into_iter()
            .filter(|p| {
                params.search_text().map_or(true, |q| {
                    let q = q.to_lowercase();
                    p.name.to_lowercase().contains(&q) || p.description.to_lowercase().contains(&q)
                })
            })
            .collect()
    } else {
        match params.search_text() {
            Some(q) => state.properties.search(q, &candidates_filter).await?,
            None => state.properties.find_all(&candidates_filter).await?,
        }
    };

    corpus::apply_listing_ratings(&mut properties, &ratings);
    properties.retain(|p| filter.matches(p));
    sort_by_rating(&mut properties);

    let total = properties.len() as i64;
    let properties = page(properties, filter.skip, filter.limit);
    Ok(Json(PropertySearchResult::new(properties, total, skip)))
}

/// POST /api/properties
///
/// A missing slug is derived from the name. 409 on duplicate id.
pub async fn create_property(
    State(state): State<AppState>,
    Json(property): Json<Property>,
) -> ApiResult<(StatusCode, Json<Property>)> {
    if property.id.trim().is_empty() || property.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Property id and name are required".to_string()));
    }

    let created = state.properties.create(&property).await?;
    info!(property_id = %created.id, "Property created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn find_property(state: &AppState, key: &str) -> ApiResult<Option<Property>> {
    if let Some(property) = state.properties.find_by_slug(key).await? {
        return Ok(Some(property));
    }
    if let Some(property) = state.properties.find_by_id(key).await? {
        return Ok(Some(property));
    }

    Ok(mock::properties()
        .into_iter()
        .find(|p| p.slug.as_deref() == Some(key) || p.id == key))
}

/// GET /api/properties/:key
///
/// `key` is a slug or a property id. Returns the property with its approved
/// reviews; the rating is recomputed from those reviews when any exist.
pub async fn get_property(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<PropertyDetailResponse>> {
    let mut property = find_property(&state, &key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Property {}", key)))?;

    let reviews = corpus::approved_reviews_for(&state, &property.id).await?;
    if let Some(rating) = prm_common::summary::approved_rating(&reviews) {
        property.rating = Some(rating);
    }

    Ok(Json(PropertyDetailResponse { property, reviews }))
}

/// PUT /api/properties/:key (key is the property id)
pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PropertyPatch>,
) -> ApiResult<Json<Property>> {
    state
        .properties
        .update_by_id(&id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Property {}", id)))
}

/// DELETE /api/properties/:key (key is the property id)
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.properties.delete_by_id(&id).await? {
        return Err(ApiError::NotFound(format!("Property {}", id)));
    }

    info!(property_id = %id, "Property deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Property deleted".to_string(),
    }))
}

pub fn property_routes() -> Router<AppState> {
    Router::new()
        .route("/api/properties", get(list_properties).post(create_property))
        .route(
            "/api/properties/:key",
            get(get_property).put(update_property).delete(delete_property),
        )
}
