//! Review persistence
//!
//! Repository over the `reviews` table. Constructed with a pool and passed
//! to whoever needs it; there is no process-wide instance.

use chrono::Utc;
use serde::Deserialize;
use sqlx::{sqlite::SqliteRow, Executor, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::BTreeMap;
use tracing::debug;

use super::push_paging;
use crate::review::{Channel, RawReview, ReviewCategory, ReviewStatus, ReviewType};
use crate::{Error, Result};

const REVIEW_COLUMNS: &str = "id, listing_id, rating, comment, guest_name, date, review_type, \
                              channel, source, approved, status, review_category, listing_name";

/// Result ordering for review queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewSort {
    #[default]
    DateDesc,
    DateAsc,
    RatingDesc,
    RatingAsc,
}

impl ReviewSort {
    fn order_by(&self) -> &'static str {
        match self {
            ReviewSort::DateDesc => " ORDER BY date DESC, id ASC",
            ReviewSort::DateAsc => " ORDER BY date ASC, id ASC",
            ReviewSort::RatingDesc => " ORDER BY rating DESC, date DESC",
            ReviewSort::RatingAsc => " ORDER BY rating ASC, date DESC",
        }
    }
}

/// Review filter, paging and ordering
///
/// Empty `listingId` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub listing_id: Option<String>,
    pub channel: Option<Channel>,
    pub status: Option<ReviewStatus>,
    pub approved: Option<bool>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    #[serde(default)]
    pub sort: ReviewSort,
}

/// Partial review update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    pub listing_id: Option<String>,
    pub rating: Option<f64>,
    pub comment: Option<String>,
    pub guest_name: Option<String>,
    pub date: Option<String>,
    pub review_type: Option<ReviewType>,
    pub channel: Option<Channel>,
    pub source: Option<String>,
    pub approved: Option<bool>,
    pub status: Option<ReviewStatus>,
    pub review_category: Option<Vec<ReviewCategory>>,
    pub listing_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new review; a duplicate id is a [`Error::Conflict`]
    pub async fn create(&self, review: &RawReview) -> Result<RawReview> {
        if let Err(e) = insert_review(&self.pool, review, false).await {
            return Err(match e {
                Error::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Error::Conflict(format!("Review {} already exists", review.id))
                }
                other => other,
            });
        }

        self.find_by_id(&review.id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Review {} vanished after insert", review.id)))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<RawReview>> {
        let row = sqlx::query(&format!("SELECT {} FROM reviews WHERE id = ?", REVIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(review_from_row).transpose()
    }

    pub async fn find_all(&self, query: &ReviewQuery) -> Result<Vec<RawReview>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM reviews", REVIEW_COLUMNS));
        push_filters(&mut builder, query);
        builder.push(query.sort.order_by());
        push_paging(&mut builder, query.limit, query.skip);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(review_from_row).collect()
    }

    /// Apply a patch; `None` when no review has this id
    pub async fn update_by_id(&self, id: &str, patch: &ReviewPatch) -> Result<Option<RawReview>> {
        let categories = patch
            .review_category
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE reviews SET
                listing_id = COALESCE(?, listing_id),
                rating = COALESCE(?, rating),
                comment = COALESCE(?, comment),
                guest_name = COALESCE(?, guest_name),
                date = COALESCE(?, date),
                review_type = COALESCE(?, review_type),
                channel = COALESCE(?, channel),
                source = COALESCE(?, source),
                approved = COALESCE(?, approved),
                status = COALESCE(?, status),
                review_category = COALESCE(?, review_category),
                listing_name = COALESCE(?, listing_name),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.listing_id)
        .bind(patch.rating)
        .bind(&patch.comment)
        .bind(&patch.guest_name)
        .bind(&patch.date)
        .bind(patch.review_type.map(|t| t.as_str()))
        .bind(patch.channel.map(|c| c.as_str()))
        .bind(&patch.source)
        .bind(patch.approved)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(categories)
        .bind(&patch.listing_name)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Delete a review; `false` when no review has this id
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the approval flag; status follows (published/pending)
    pub async fn approve_review(&self, id: &str, approved: bool) -> Result<Option<RawReview>> {
        let status = if approved {
            ReviewStatus::Published
        } else {
            ReviewStatus::Pending
        };

        let result = sqlx::query(
            "UPDATE reviews SET approved = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(approved)
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        debug!(review_id = %id, approved, "Review approval updated");
        self.find_by_id(id).await
    }

    /// Approval flag of a review; `false` for unknown ids
    pub async fn get_approval_status(&self, id: &str) -> Result<bool> {
        let approved: Option<bool> = sqlx::query_scalar("SELECT approved FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(approved.unwrap_or(false))
    }

    pub async fn get_all_approval_statuses(&self) -> Result<BTreeMap<String, bool>> {
        let rows: Vec<(String, bool)> = sqlx::query_as("SELECT id, approved FROM reviews")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Number of reviews matching the filter (paging ignored)
    pub async fn count(&self, query: &ReviewQuery) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM reviews");
        push_filters(&mut builder, query);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert many reviews in one transaction, skipping ids already stored
    ///
    /// Returns the number of rows inserted.
    pub async fn bulk_create(&self, reviews: &[RawReview]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for review in reviews {
            inserted += insert_review(&mut *tx, review, true).await?;
        }
        tx.commit().await?;

        debug!(requested = reviews.len(), inserted, "Bulk review insert");
        Ok(inserted)
    }

    /// Reviews of one listing, newest first
    pub async fn reviews_by_listing(&self, listing_id: &str, query: ReviewQuery) -> Result<Vec<RawReview>> {
        self.find_all(&ReviewQuery {
            listing_id: Some(listing_id.to_string()),
            sort: ReviewSort::DateDesc,
            ..query
        })
        .await
    }

    /// Reviews from one channel, newest first
    pub async fn reviews_by_channel(&self, channel: Channel, query: ReviewQuery) -> Result<Vec<RawReview>> {
        self.find_all(&ReviewQuery {
            channel: Some(channel),
            sort: ReviewSort::DateDesc,
            ..query
        })
        .await
    }
}

async fn insert_review<'e, E>(executor: E, review: &RawReview, skip_existing: bool) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let categories = serde_json::to_string(review.review_category.as_deref().unwrap_or(&[]))?;
    let now = Utc::now();

    let mut sql = String::from(
        r#"
        INSERT INTO reviews (
            id, listing_id, rating, comment, guest_name, date, review_type, channel,
            source, approved, status, review_category, listing_name, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    );
    if skip_existing {
        sql.push_str(" ON CONFLICT(id) DO NOTHING");
    }

    let result = sqlx::query(&sql)
        .bind(&review.id)
        .bind(&review.listing_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.guest_name)
        .bind(&review.date)
        .bind(review.review_type.as_str())
        .bind(review.channel.as_str())
        .bind(&review.source)
        .bind(review.approved.unwrap_or(false))
        .bind(review.status.unwrap_or_default().as_str())
        .bind(categories)
        .bind(&review.listing_name)
        .bind(now)
        .bind(now)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ReviewQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(listing_id) = query.listing_id.as_deref().filter(|id| !id.is_empty()) {
        builder.push(" AND listing_id = ").push_bind(listing_id.to_string());
    }
    if let Some(channel) = query.channel {
        builder.push(" AND channel = ").push_bind(channel.as_str());
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(approved) = query.approved {
        builder.push(" AND approved = ").push_bind(approved);
    }
}

fn review_from_row(row: &SqliteRow) -> Result<RawReview> {
    let review_type: String = row.try_get("review_type")?;
    let channel: String = row.try_get("channel")?;
    let status: String = row.try_get("status")?;
    let categories: String = row.try_get("review_category")?;

    Ok(RawReview {
        id: row.try_get("id")?,
        listing_id: row.try_get("listing_id")?,
        rating: row.try_get("rating")?,
        comment: row.try_get("comment")?,
        guest_name: row.try_get("guest_name")?,
        date: row.try_get("date")?,
        review_type: review_type.parse()?,
        channel: channel.parse()?,
        source: row.try_get("source")?,
        review_category: Some(serde_json::from_str(&categories)?),
        approved: Some(row.try_get("approved")?),
        status: Some(status.parse()?),
        listing_name: row.try_get("listing_name")?,
    })
}
