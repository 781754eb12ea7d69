//! Hostaway API client
//!
//! Fetches guest reviews from the Hostaway property-management API. When the
//! API is unreachable or credentials are missing, review reads fall back to
//! the local review store (`channel = hostaway`).

use prm_common::config::HostawaySettings;
use prm_common::db::{ReviewQuery, ReviewRepository, ReviewSort};
use prm_common::{Channel, RawReview, ReviewCategory, ReviewStatus, ReviewType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("prm-api/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Reviews requested per page by [`HostawayClient::get_all_reviews`]
pub const PAGE_SIZE: i64 = 100;
/// Pagination stops once the offset passes this value
pub const MAX_OFFSET: i64 = 10_000;

const HOSTAWAY_SOURCE: &str = "hostaway";

/// Hostaway client errors
#[derive(Debug, Error)]
pub enum HostawayError {
    #[error("Hostaway API credentials not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Hostaway API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Review store error: {0}")]
    Store(#[from] prm_common::Error),
}

/// `GET /reviews` response envelope
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostawayResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<Vec<HostawayReview>>,
}

/// Review as returned by the Hostaway API
///
/// Ids arrive as numbers or strings depending on the endpoint version.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostawayReview {
    pub id: serde_json::Value,
    #[serde(default)]
    pub listing_id: Option<serde_json::Value>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub public_review: Option<String>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default, rename = "type")]
    pub review_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub review_category: Option<Vec<ReviewCategory>>,
    #[serde(default)]
    pub listing_name: Option<String>,
}

/// JSON scalar as a plain string; `None` for null, empty or structured values
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<HostawayReview> for RawReview {
    fn from(item: HostawayReview) -> Self {
        let review_type = match item.review_type.as_deref() {
            None | Some("") => ReviewType::GuestToHost,
            Some(value) => value.parse().unwrap_or_else(|_| {
                debug!("Unknown Hostaway review type {:?}, using guest-to-host", value);
                ReviewType::GuestToHost
            }),
        };

        let status = match item.status.as_deref() {
            None | Some("") => ReviewStatus::Published,
            Some(value) => value.parse().unwrap_or_else(|_| {
                debug!("Unknown Hostaway review status {:?}, treating as pending", value);
                ReviewStatus::Pending
            }),
        };

        RawReview {
            id: scalar_to_string(&item.id).unwrap_or_default(),
            listing_id: item.listing_id.as_ref().and_then(scalar_to_string),
            rating: item.rating,
            comment: item.public_review.unwrap_or_default(),
            guest_name: item.guest_name.unwrap_or_default(),
            date: item.submitted_at.unwrap_or_default(),
            review_type,
            channel: Channel::Hostaway,
            source: HOSTAWAY_SOURCE.to_string(),
            review_category: Some(item.review_category.unwrap_or_default()),
            approved: Some(status == ReviewStatus::Published),
            status: Some(status),
            listing_name: Some(item.listing_name.unwrap_or_default()),
        }
    }
}

/// Convert an API response into raw reviews; a missing result list is empty
pub fn transform_response(response: HostawayResponse) -> Vec<RawReview> {
    response
        .result
        .unwrap_or_default()
        .into_iter()
        .map(RawReview::from)
        .collect()
}

/// Hostaway API client with review-store fallback
pub struct HostawayClient {
    http_client: reqwest::Client,
    settings: HostawaySettings,
    reviews: ReviewRepository,
}

impl HostawayClient {
    pub fn new(settings: HostawaySettings, reviews: ReviewRepository) -> Result<Self, HostawayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| HostawayError::Network(e.to_string()))?;

        if !settings.is_configured() {
            warn!("Hostaway API credentials not configured, using review store data");
        }

        Ok(Self {
            http_client,
            settings,
            reviews,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    /// One page of reviews straight from the API, no fallback
    pub async fn fetch_page(
        &self,
        listing_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<HostawayResponse, HostawayError> {
        if !self.is_configured() {
            return Err(HostawayError::NotConfigured);
        }

        let url = format!("{}/reviews", self.settings.base_url.trim_end_matches('/'));
        let mut params = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(listing_id) = listing_id {
            params.push(("listingId", listing_id.to_string()));
        }

        debug!(url = %url, limit, offset, "Querying Hostaway API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.settings.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| HostawayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HostawayError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| HostawayError::Parse(e.to_string()))
    }

    /// One page of reviews, falling back to the review store on any API error
    pub async fn get_reviews(
        &self,
        listing_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RawReview>, HostawayError> {
        match self.fetch_page(listing_id, limit, offset).await {
            Ok(response) => Ok(transform_response(response)),
            Err(e) => {
                debug!("Hostaway request failed ({}), reading review store", e);
                self.reviews_from_store(listing_id, limit, offset).await
            }
        }
    }

    /// Every review, paging through [`Self::get_reviews`] until an empty page
    pub async fn get_all_reviews(&self) -> Result<Vec<RawReview>, HostawayError> {
        let mut all_reviews = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.get_reviews(None, PAGE_SIZE, offset).await?;
            if page.is_empty() {
                break;
            }

            all_reviews.extend(page);
            offset += PAGE_SIZE;

            if offset > MAX_OFFSET {
                warn!("Reached maximum offset {}, stopping pagination", MAX_OFFSET);
                break;
            }
        }

        debug!(count = all_reviews.len(), "Fetched all Hostaway reviews");
        Ok(all_reviews)
    }

    async fn reviews_from_store(
        &self,
        listing_id: Option<&str>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<RawReview>, HostawayError> {
        let query = ReviewQuery {
            listing_id: listing_id.map(str::to_string),
            channel: Some(Channel::Hostaway),
            limit: Some(limit),
            skip: Some(skip),
            sort: ReviewSort::DateDesc,
            ..Default::default()
        };

        Ok(self.reviews.find_all(&query).await?)
    }
}
