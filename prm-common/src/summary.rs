//! Aggregation over normalized reviews
//!
//! Summary counts, monthly trends, per-source counts and the approved-review
//! rating shown on property pages.

use chrono::{DateTime, Datelike, Month, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::review::{NormalizedReview, Sentiment};

/// All calendar months in order
pub const ALL_MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Naive timestamp layouts accepted besides RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Timestamp layouts with a numeric offset, colon optional (`+0200`, `+02:00`)
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
];

/// Review counts and mean rating
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_reviews: usize,
    /// Mean normalized rating, one decimal place
    pub average_rating: f64,
    pub positive_reviews: usize,
    pub neutral_reviews: usize,
    pub negative_reviews: usize,
}

/// Review count for one month of the target year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub reviews: usize,
}

/// Summarize a set of reviews
pub fn summarize(reviews: &[NormalizedReview]) -> Summary {
    let mut summary = Summary {
        total_reviews: reviews.len(),
        average_rating: mean_rating(reviews.iter()).map_or(0.0, round_one_decimal),
        ..Summary::default()
    };

    for review in reviews {
        match review.sentiment {
            Sentiment::Positive => summary.positive_reviews += 1,
            Sentiment::Neutral => summary.neutral_reviews += 1,
            Sentiment::Negative => summary.negative_reviews += 1,
        }
    }

    summary
}

/// Round to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean_rating<'a>(reviews: impl Iterator<Item = &'a NormalizedReview>) -> Option<f64> {
    let (sum, count) = reviews.fold((0.0, 0usize), |(sum, count), review| {
        (sum + review.normalized_rating, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}

/// Short label used for a month ("Jan", "Feb", ...)
pub fn month_label(month: Month) -> &'static str {
    &month.name()[..3]
}

/// Parse a review date into a calendar date
///
/// Accepts RFC 3339 timestamps, timestamps with a `+hhmm` offset, naive `T`-
/// or space-separated timestamps, bare `YYYY-MM-DD` dates and the partial
/// forms `YYYY-MM` and `YYYY` (first day of the period). Returns `None` for
/// anything else, including calendar-invalid dates such as `2025-02-30`.
pub fn parse_review_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    if let Some(timestamp) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(timestamp.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|timestamp| timestamp.date())
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .or_else(|| parse_partial_date(value))
}

/// `YYYY-MM` or `YYYY`
fn parse_partial_date(value: &str) -> Option<NaiveDate> {
    if !value.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        return None;
    }

    match value.len() {
        4 => NaiveDate::from_ymd_opt(value.parse().ok()?, 1, 1),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Count reviews per month of `year`
///
/// Reviews whose date does not parse are excluded from every month.
pub fn monthly_trends(reviews: &[NormalizedReview], year: i32, months: &[Month]) -> Vec<MonthlyTrend> {
    let dates: Vec<NaiveDate> = reviews
        .iter()
        .filter_map(|review| parse_review_date(&review.date))
        .filter(|date| date.year() == year)
        .collect();

    months
        .iter()
        .map(|month| MonthlyTrend {
            month: month_label(*month).to_string(),
            reviews: dates
                .iter()
                .filter(|date| date.month() == month.number_from_month())
                .count(),
        })
        .collect()
}

/// Count reviews per source system
pub fn reviews_by_source(reviews: &[NormalizedReview]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for review in reviews {
        *counts.entry(review.source.clone()).or_insert(0) += 1;
    }
    counts
}

/// Property rating: mean normalized rating of its approved reviews
///
/// Callers pass only approved reviews; approval state is kept outside the
/// pipeline. `None` when there are none.
pub fn approved_rating<'a>(approved: impl IntoIterator<Item = &'a NormalizedReview>) -> Option<f64> {
    mean_rating(approved.into_iter()).map(round_one_decimal)
}
