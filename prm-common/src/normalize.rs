//! Review normalization
//!
//! Converts a [`RawReview`] of any origin into a [`NormalizedReview`] with a
//! 0-5 rating and a sentiment label. Pure and total: every well-shaped input
//! yields a deterministic output, missing optional fields included.
//!
//! Rating derivation, first applicable rule wins:
//! 1. Non-empty category breakdown: mean of category ratings (0-10) halved.
//! 2. Direct rating present: used as-is, except Google ratings above 5,
//!    which are on a 0-10 scale and are halved.
//! 3. Otherwise 0.
//!
//! Sentiment uses substring keyword matching over the lower-cased comment,
//! combined with the derived rating (see [`classify_sentiment`]).

use crate::review::{NormalizedReview, RawReview, Sentiment};

/// Source whose ratings may arrive on a 0-10 scale
pub const GOOGLE_SOURCE: &str = "google";

/// Upper bound of the normalized rating scale
pub const MAX_RATING: f64 = 5.0;

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "amazing",
    "excellent",
    "fantastic",
    "wonderful",
    "perfect",
    "outstanding",
    "brilliant",
    "superb",
    "incredible",
    "exceptional",
    "love",
    "loved",
    "highly recommend",
    "best",
    "beautiful",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "disappointing",
    "terrible",
    "awful",
    "horrible",
    "worst",
    "poor",
    "bad",
    "unacceptable",
    "maintenance",
    "broken",
    "dirty",
    "overpriced",
    "not worth",
];

/// Normalize a single review
pub fn normalize(raw: &RawReview) -> NormalizedReview {
    let normalized_rating = normalized_rating(raw);
    let sentiment = classify_sentiment(&raw.comment, normalized_rating);

    NormalizedReview {
        id: raw.id.clone(),
        listing_id: raw.listing_id.clone().unwrap_or_default(),
        rating: raw.rating.filter(|r| !r.is_nan()).unwrap_or(0.0),
        comment: raw.comment.clone(),
        guest_name: raw.guest_name.clone(),
        date: raw.date.clone(),
        review_type: raw.review_type,
        channel: raw.channel,
        source: raw.source.clone(),
        normalized_rating,
        sentiment,
        review_category: raw.review_category.clone(),
    }
}

/// Normalize a sequence of reviews, preserving order
pub fn normalize_all(raws: &[RawReview]) -> Vec<NormalizedReview> {
    raws.iter().map(normalize).collect()
}

/// Derive the 0-5 rating of a review
pub fn normalized_rating(raw: &RawReview) -> f64 {
    let rating = match raw.review_category.as_deref() {
        Some(categories) if !categories.is_empty() => {
            let total: f64 = categories.iter().map(|c| c.rating).sum();
            (total / categories.len() as f64) / 2.0
        }
        _ => match raw.rating {
            Some(rating) if raw.source == GOOGLE_SOURCE && rating > MAX_RATING => rating / 2.0,
            Some(rating) => rating,
            None => 0.0,
        },
    };

    clamp_rating(rating)
}

/// Keep a rating inside [0, 5]; NaN maps to 0
fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, MAX_RATING)
    }
}

/// Count distinct positive and negative keywords contained in a comment
///
/// Matching is plain substring containment on the lower-cased text, so
/// "unbroken" still counts as "broken".
pub fn keyword_counts(comment: &str) -> (usize, usize) {
    let comment = comment.to_lowercase();
    let positive = POSITIVE_KEYWORDS
        .iter()
        .filter(|word| comment.contains(*word))
        .count();
    let negative = NEGATIVE_KEYWORDS
        .iter()
        .filter(|word| comment.contains(*word))
        .count();
    (positive, negative)
}

/// Classify review tone from its comment and normalized rating
///
/// Evaluated in order, first match wins:
/// 1. Both positive and negative keywords present: neutral.
/// 2. Rating >= 4: positive with a positive keyword, otherwise neutral.
/// 3. Rating >= 3: negative with a negative keyword, otherwise neutral.
/// 4. Rating < 3: negative.
pub fn classify_sentiment(comment: &str, normalized_rating: f64) -> Sentiment {
    let (positive, negative) = keyword_counts(comment);

    if positive > 0 && negative > 0 {
        Sentiment::Neutral
    } else if normalized_rating >= 4.0 {
        if positive > 0 {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        }
    } else if normalized_rating >= 3.0 {
        if negative > 0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    } else {
        Sentiment::Negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{Channel, ReviewCategory, ReviewType};

    fn review(source: &str, rating: Option<f64>, comment: &str) -> RawReview {
        let mut raw = RawReview::new("r-1", ReviewType::GuestToHost, Channel::Hostaway, source);
        raw.rating = rating;
        raw.comment = comment.to_string();
        raw.review_category = Some(Vec::new());
        raw
    }

    #[test]
    fn test_category_average_is_halved() {
        let mut raw = review("hostaway", None, "");
        raw.review_category = Some(vec![
            ReviewCategory::new("cleanliness", 10.0),
            ReviewCategory::new("communication", 8.0),
        ]);

        assert_eq!(normalize(&raw).normalized_rating, 4.5);
    }

    #[test]
    fn test_categories_take_priority_over_rating() {
        let mut raw = review("hostaway", Some(1.0), "");
        raw.review_category = Some(vec![ReviewCategory::new("cleanliness", 6.0)]);

        assert_eq!(normalized_rating(&raw), 3.0);
    }

    #[test]
    fn test_google_ten_point_rating_is_halved() {
        let raw = review("google", Some(8.0), "");
        assert_eq!(normalize(&raw).normalized_rating, 4.0);
    }

    #[test]
    fn test_google_five_point_rating_is_kept() {
        let raw = review("google", Some(5.0), "");
        assert_eq!(normalized_rating(&raw), 5.0);
    }

    #[test]
    fn test_only_google_is_rescaled() {
        // Other sources keep their rating; the range is then clamped
        let raw = review("booking", Some(9.0), "");
        assert_eq!(normalized_rating(&raw), 5.0);
    }

    #[test]
    fn test_missing_rating_and_categories_is_zero() {
        let mut raw = review("direct", None, "");
        raw.review_category = None;

        let normalized = normalize(&raw);
        assert_eq!(normalized.normalized_rating, 0.0);
        assert_eq!(normalized.rating, 0.0);
        assert_eq!(normalized.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_negative_and_nan_ratings_are_clamped() {
        assert_eq!(normalized_rating(&review("direct", Some(-2.0), "")), 0.0);
        assert_eq!(normalized_rating(&review("direct", Some(f64::NAN), "")), 0.0);
    }

    #[test]
    fn test_out_of_scale_categories_are_clamped() {
        let mut raw = review("hostaway", None, "");
        raw.review_category = Some(vec![
            ReviewCategory::new("cleanliness", 14.0),
            ReviewCategory::new("communication", 12.0),
        ]);
        assert_eq!(normalized_rating(&raw), 5.0);

        raw.review_category = Some(vec![ReviewCategory::new("value", -4.0)]);
        assert_eq!(normalized_rating(&raw), 0.0);
    }

    #[test]
    fn test_mixed_keywords_are_neutral() {
        let raw = review(
            "hostaway",
            Some(4.0),
            "The room was amazing but the bathroom was dirty",
        );

        assert_eq!(keyword_counts(&raw.comment), (1, 1));
        let normalized = normalize(&raw);
        assert_eq!(normalized.normalized_rating, 4.0);
        assert_eq!(normalized.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_low_rating_is_negative() {
        let raw = review("direct", Some(2.0), "nothing special");
        assert_eq!(normalize(&raw).sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_high_rating_needs_positive_keyword() {
        assert_eq!(classify_sentiment("Loved every minute", 4.5), Sentiment::Positive);
        assert_eq!(classify_sentiment("It was fine", 4.5), Sentiment::Neutral);
    }

    #[test]
    fn test_middle_rating_needs_negative_keyword() {
        assert_eq!(classify_sentiment("A bit overpriced", 3.5), Sentiment::Negative);
        assert_eq!(classify_sentiment("It was fine", 3.0), Sentiment::Neutral);
    }

    #[test]
    fn test_low_rating_ignores_positive_keywords() {
        assert_eq!(classify_sentiment("Beautiful view", 2.9), Sentiment::Negative);
    }

    #[test]
    fn test_keyword_matching_is_substring_and_case_insensitive() {
        assert_eq!(keyword_counts("UNBROKEN promise"), (0, 1));
        assert_eq!(keyword_counts("I would HIGHLY RECOMMEND it"), (1, 0));
        // "love" and "loved" are distinct keywords, both contained
        assert_eq!(keyword_counts("we loved it"), (2, 0));
    }

    #[test]
    fn test_normalize_carries_descriptive_fields() {
        let mut raw = review("airbnb", Some(5.0), "Perfect");
        raw.listing_id = Some("42".to_string());
        raw.guest_name = "Ana".to_string();
        raw.date = "2025-03-10T12:00:00Z".to_string();
        raw.channel = Channel::Airbnb;

        let normalized = normalize(&raw);
        assert_eq!(normalized.id, "r-1");
        assert_eq!(normalized.listing_id, "42");
        assert_eq!(normalized.guest_name, "Ana");
        assert_eq!(normalized.date, "2025-03-10T12:00:00Z");
        assert_eq!(normalized.channel, Channel::Airbnb);
        assert_eq!(normalized.rating, 5.0);
        assert_eq!(normalized.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_normalize_is_stable_on_its_own_output() {
        let raw = review("google", Some(8.0), "Excellent host");
        let first = normalize(&raw);
        let second = normalize(&RawReview::from(first.clone()));

        assert_eq!(first, second);
    }
}
