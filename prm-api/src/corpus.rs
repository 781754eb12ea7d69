//! Working review set for property pages and analytics
//!
//! The review store is authoritative once it holds any review; before the
//! first migration the built-in dataset stands in for it. Approval flags
//! come from the configured [`ApprovalStore`](prm_common::approvals::ApprovalStore)
//! and win over the flag carried on the record.

use prm_common::db::ReviewQuery;
use prm_common::property::Property;
use prm_common::summary::approved_rating;
use prm_common::{group_by, normalize_all, GroupKey, NormalizedReview, RawReview};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{mock, ApiResult, AppState};

/// Reviews from the store, or the built-in dataset when the store is empty
pub async fn review_corpus(state: &AppState) -> ApiResult<Vec<RawReview>> {
    let reviews = state.reviews.find_all(&ReviewQuery::default()).await?;
    if reviews.is_empty() {
        debug!("Review store empty, using built-in reviews");
        return Ok(mock::hostaway_reviews());
    }
    Ok(reviews)
}

/// Reviews with their effective approval flag applied
pub async fn with_approvals(state: &AppState, mut reviews: Vec<RawReview>) -> ApiResult<Vec<RawReview>> {
    let approvals = state.approvals.all_approvals().await?;
    for review in &mut reviews {
        let approved = approvals
            .get(&review.id)
            .copied()
            .unwrap_or_else(|| review.approved.unwrap_or(false));
        review.approved = Some(approved);
    }
    Ok(reviews)
}

/// Approved, normalized reviews of one listing, in corpus order
pub async fn approved_reviews_for(state: &AppState, listing_id: &str) -> ApiResult<Vec<NormalizedReview>> {
    let reviews = with_approvals(state, review_corpus(state).await?).await?;
    let approved: Vec<RawReview> = reviews
        .into_iter()
        .filter(|r| r.approved == Some(true) && r.listing_id.as_deref() == Some(listing_id))
        .collect();
    Ok(normalize_all(&approved))
}

/// Mean normalized rating of a listing's approved reviews
pub async fn listing_rating(state: &AppState, listing_id: &str) -> ApiResult<Option<f64>> {
    let approved = approved_reviews_for(state, listing_id).await?;
    Ok(approved_rating(&approved))
}

/// Approved-review rating of every listing that has approved reviews
pub async fn listing_ratings(state: &AppState) -> ApiResult<BTreeMap<String, f64>> {
    let reviews = with_approvals(state, review_corpus(state).await?).await?;

    let approved: Vec<RawReview> = reviews
        .into_iter()
        .filter(|r| r.approved == Some(true))
        .collect();

    let by_listing = group_by(&normalize_all(&approved), GroupKey::Listing);
    Ok(by_listing
        .into_iter()
        .filter(|(listing, _)| !listing.is_empty())
        .filter_map(|(listing, reviews)| approved_rating(&reviews).map(|rating| (listing, rating)))
        .collect())
}

/// Overwrite property ratings with their approved-review ratings
pub fn apply_listing_ratings(properties: &mut [Property], ratings: &BTreeMap<String, f64>) {
    for property in properties {
        if let Some(rating) = ratings.get(&property.id) {
            property.rating = Some(*rating);
        }
    }
}
