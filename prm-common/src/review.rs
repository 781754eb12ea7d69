//! Review data model
//!
//! Raw reviews arrive in source-specific shapes (Hostaway API, the review
//! store, built-in fixtures). A [`NormalizedReview`] is derived from a
//! [`RawReview`] on every read and is never written back to the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Direction of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewType {
    HostToGuest,
    GuestToHost,
    Automatic,
}

impl ReviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewType::HostToGuest => "host-to-guest",
            ReviewType::GuestToHost => "guest-to-host",
            ReviewType::Automatic => "automatic",
        }
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host-to-guest" => Ok(ReviewType::HostToGuest),
            "guest-to-host" => Ok(ReviewType::GuestToHost),
            "automatic" => Ok(ReviewType::Automatic),
            other => Err(Error::InvalidInput(format!("Unknown review type: {}", other))),
        }
    }
}

/// Booking/distribution platform a review arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Hostaway,
    Airbnb,
    Booking,
    Direct,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Hostaway => "hostaway",
            Channel::Airbnb => "airbnb",
            Channel::Booking => "booking",
            Channel::Direct => "direct",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hostaway" => Ok(Channel::Hostaway),
            "airbnb" => Ok(Channel::Airbnb),
            "booking" => Ok(Channel::Booking),
            "direct" => Ok(Channel::Direct),
            other => Err(Error::InvalidInput(format!("Unknown channel: {}", other))),
        }
    }
}

/// Moderation status of a stored review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Published,
    #[default]
    Pending,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Published => "published",
            ReviewStatus::Pending => "pending",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(ReviewStatus::Published),
            "pending" => Ok(ReviewStatus::Pending),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(Error::InvalidInput(format!("Unknown review status: {}", other))),
        }
    }
}

/// Coarse three-way tone classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category score, 0-10 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCategory {
    pub category: String,
    pub rating: f64,
}

impl ReviewCategory {
    pub fn new(category: impl Into<String>, rating: f64) -> Self {
        Self {
            category: category.into(),
            rating,
        }
    }
}

/// As-ingested guest review
///
/// `rating` is on a source-dependent scale (0-5 or 0-10) and may be null.
/// `approved`, `status` and `listing_name` are carried through from the
/// store but never produced by normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub date: String,
    pub review_type: ReviewType,
    pub channel: Channel,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_category: Option<Vec<ReviewCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_name: Option<String>,
}

impl RawReview {
    /// Minimal review with every optional field absent
    pub fn new(
        id: impl Into<String>,
        review_type: ReviewType,
        channel: Channel,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            listing_id: None,
            rating: None,
            comment: String::new(),
            guest_name: String::new(),
            date: String::new(),
            review_type,
            channel,
            source: source.into(),
            review_category: None,
            approved: None,
            status: None,
            listing_name: None,
        }
    }
}

/// Review in uniform shape with derived 0-5 rating and sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReview {
    pub id: String,
    /// Empty when the raw review has no listing
    pub listing_id: String,
    /// Raw rating as supplied, 0 when absent
    pub rating: f64,
    pub comment: String,
    pub guest_name: String,
    pub date: String,
    pub review_type: ReviewType,
    pub channel: Channel,
    pub source: String,
    pub normalized_rating: f64,
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_category: Option<Vec<ReviewCategory>>,
}

impl From<NormalizedReview> for RawReview {
    fn from(review: NormalizedReview) -> Self {
        Self {
            id: review.id,
            listing_id: Some(review.listing_id).filter(|id| !id.is_empty()),
            rating: Some(review.rating),
            comment: review.comment,
            guest_name: review.guest_name,
            date: review.date,
            review_type: review.review_type,
            channel: review.channel,
            source: review.source,
            review_category: review.review_category,
            approved: None,
            status: None,
            listing_name: None,
        }
    }
}
