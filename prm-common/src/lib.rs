//! # PRM Common Library
//!
//! Shared code for the Property Review Manager services including:
//! - Review and property data models
//! - The review pipeline (normalization, grouping, aggregation)
//! - Configuration loading and root folder resolution
//! - SQLite-backed review/property repositories
//! - Approval storage

pub mod approvals;
pub mod config;
pub mod db;
pub mod error;
pub mod grouping;
pub mod normalize;
pub mod property;
pub mod review;
pub mod summary;

pub use error::{Error, Result};
pub use grouping::{group_by, GroupKey, Groups};
pub use normalize::{normalize, normalize_all};
pub use review::{Channel, NormalizedReview, RawReview, ReviewCategory, ReviewStatus, ReviewType, Sentiment};
pub use summary::{monthly_trends, summarize, MonthlyTrend, Summary};
