//! SQLite document store
//!
//! Reviews and properties are stored one row per document; nested lists
//! (review categories, amenities, images) are kept as JSON text.

pub mod init;
pub mod properties;
pub mod reviews;

pub use init::*;
pub use properties::{PropertiesRepository, PropertyPatch};
pub use reviews::{ReviewPatch, ReviewQuery, ReviewRepository, ReviewSort};

use sqlx::{QueryBuilder, Sqlite};

/// Append `LIMIT`/`OFFSET`; zero or absent values mean "no limit"/"no offset"
pub(crate) fn push_paging(builder: &mut QueryBuilder<'_, Sqlite>, limit: Option<i64>, skip: Option<i64>) {
    let limit = limit.filter(|l| *l > 0);
    let skip = skip.filter(|s| *s > 0);

    if limit.is_some() || skip.is_some() {
        builder
            .push(" LIMIT ")
            .push_bind(limit.unwrap_or(-1))
            .push(" OFFSET ")
            .push_bind(skip.unwrap_or(0));
    }
}

/// Case-insensitive `LIKE` pattern matching `value` anywhere, wildcards escaped
pub(crate) fn contains_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
