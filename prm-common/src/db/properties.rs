//! Property persistence

use chrono::Utc;
use serde::Deserialize;
use sqlx::{sqlite::SqliteRow, Executor, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use super::{contains_pattern, push_paging};
use crate::property::{Property, PropertyFilter};
use crate::{Error, Result};

const PROPERTY_COLUMNS: &str = "id, name, location, rating, description, amenities, images, slug, \
                                price, bedrooms, bathrooms, max_guests, created_at, updated_at";

/// Partial property update; absent fields are left unchanged
///
/// `rating` is not patchable here, see [`PropertiesRepository::update_rating`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub slug: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub max_guests: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PropertiesRepository {
    pool: SqlitePool,
}

impl PropertiesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new property; a missing slug is derived from the name
    pub async fn create(&self, property: &Property) -> Result<Property> {
        if let Err(e) = insert_property(&self.pool, property, false).await {
            return Err(match e {
                Error::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Error::Conflict(format!("Property {} already exists", property.id))
                }
                other => other,
            });
        }

        self.find_by_id(&property.id).await?.ok_or_else(|| {
            Error::Internal(format!("Property {} vanished after insert", property.id))
        })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Property>> {
        let row = sqlx::query(&format!("SELECT {} FROM properties WHERE id = ?", PROPERTY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(property_from_row).transpose()
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Property>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM properties WHERE slug = ? LIMIT 1",
            PROPERTY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(property_from_row).transpose()
    }

    /// Filtered listing, best rated first (unrated last), then by name
    pub async fn find_all(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM properties", PROPERTY_COLUMNS));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY rating IS NULL, rating DESC, name ASC");
        push_paging(&mut builder, filter.limit, filter.skip);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(property_from_row).collect()
    }

    pub async fn update_by_id(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>> {
        let amenities = patch.amenities.as_ref().map(serde_json::to_string).transpose()?;
        let images = patch.images.as_ref().map(serde_json::to_string).transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE properties SET
                name = COALESCE(?, name),
                location = COALESCE(?, location),
                description = COALESCE(?, description),
                amenities = COALESCE(?, amenities),
                images = COALESCE(?, images),
                slug = COALESCE(?, slug),
                price = COALESCE(?, price),
                bedrooms = COALESCE(?, bedrooms),
                bathrooms = COALESCE(?, bathrooms),
                max_guests = COALESCE(?, max_guests),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.location)
        .bind(&patch.description)
        .bind(amenities)
        .bind(images)
        .bind(&patch.slug)
        .bind(patch.price)
        .bind(patch.bedrooms)
        .bind(patch.bathrooms)
        .bind(patch.max_guests)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Store the rating derived from approved reviews (`None` clears it)
    ///
    /// Returns `false` when no property has this id.
    pub async fn update_rating(&self, id: &str, rating: Option<f64>) -> Result<bool> {
        check_rating(rating)?;

        let result = sqlx::query("UPDATE properties SET rating = ?, updated_at = ? WHERE id = ?")
            .bind(rating)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(property_id = %id, ?rating, "Property rating refreshed");
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of properties matching the filter (paging ignored)
    pub async fn count(&self, filter: &PropertyFilter) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM properties");
        push_filters(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert many properties in one transaction, skipping ids already stored
    pub async fn bulk_create(&self, properties: &[Property]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for property in properties {
            inserted += insert_property(&mut *tx, property, true).await?;
        }
        tx.commit().await?;

        debug!(requested = properties.len(), inserted, "Bulk property insert");
        Ok(inserted)
    }

    /// Case-insensitive text search over name and description
    ///
    /// The filter narrows the result further; ordering is rating descending.
    pub async fn search(&self, text: &str, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let pattern = contains_pattern(text.trim());

        let mut builder = QueryBuilder::new(format!("SELECT {} FROM properties", PROPERTY_COLUMNS));
        push_filters(&mut builder, filter);
        builder
            .push(" AND (LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(description) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
        builder.push(" ORDER BY rating IS NULL, rating DESC, name ASC");
        push_paging(&mut builder, filter.limit, filter.skip);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(property_from_row).collect()
    }

    pub async fn properties_by_location(&self, location: &str) -> Result<Vec<Property>> {
        self.find_all(&PropertyFilter {
            location: Some(location.to_string()),
            ..Default::default()
        })
        .await
    }

    /// Highest rated properties; unrated ones are excluded
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<Property>> {
        self.find_all(&PropertyFilter {
            min_rating: Some(0.0),
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }
}

/// Ratings are stored on the 0-5 scale
fn check_rating(rating: Option<f64>) -> Result<()> {
    match rating {
        Some(value) if !(0.0..=5.0).contains(&value) => Err(Error::InvalidInput(format!(
            "Property rating {} outside 0-5",
            value
        ))),
        _ => Ok(()),
    }
}

async fn insert_property<'e, E>(executor: E, property: &Property, skip_existing: bool) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    check_rating(property.rating)?;
    let now = Utc::now();
    let mut sql = String::from(
        r#"
        INSERT INTO properties (
            id, name, location, rating, description, amenities, images, slug,
            price, bedrooms, bathrooms, max_guests, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    );
    if skip_existing {
        sql.push_str(" ON CONFLICT(id) DO NOTHING");
    }

    let result = sqlx::query(&sql)
        .bind(&property.id)
        .bind(&property.name)
        .bind(&property.location)
        .bind(property.rating)
        .bind(&property.description)
        .bind(serde_json::to_string(&property.amenities)?)
        .bind(serde_json::to_string(&property.images)?)
        .bind(property.slug_or_derived())
        .bind(property.price)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.max_guests)
        .bind(property.created_at.unwrap_or(now))
        .bind(property.updated_at.unwrap_or(now))
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &PropertyFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(location) = filter.location.as_deref().filter(|l| !l.is_empty()) {
        builder
            .push(" AND LOWER(location) LIKE ")
            .push_bind(contains_pattern(location))
            .push(" ESCAPE '\\'");
    }
    if let Some(min_rating) = filter.min_rating {
        builder.push(" AND rating >= ").push_bind(min_rating);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(amenities) = filter.amenities.as_ref().filter(|a| !a.is_empty()) {
        builder.push(" AND EXISTS (SELECT 1 FROM json_each(properties.amenities) WHERE json_each.value IN (");
        let mut separated = builder.separated(", ");
        for amenity in amenities {
            separated.push_bind(amenity.clone());
        }
        separated.push_unseparated("))");
    }
}

fn property_from_row(row: &SqliteRow) -> Result<Property> {
    let amenities: String = row.try_get("amenities")?;
    let images: String = row.try_get("images")?;

    Ok(Property {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        rating: row.try_get("rating")?,
        description: row.try_get("description")?,
        amenities: serde_json::from_str(&amenities)?,
        images: serde_json::from_str(&images)?,
        slug: row.try_get("slug")?,
        price: row.try_get("price")?,
        bedrooms: row.try_get("bedrooms")?,
        bathrooms: row.try_get("bathrooms")?,
        max_guests: row.try_get("max_guests")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    fn property(id: &str, name: &str, location: &str, rating: Option<f64>, amenities: &[&str]) -> Property {
        Property {
            id: id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            rating,
            description: format!("{} in {}", name, location),
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            images: vec![],
            slug: None,
            price: Some(100.0),
            bedrooms: Some(1),
            bathrooms: Some(1),
            max_guests: Some(2),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_amenities_filter_is_any_of() {
        let repo = PropertiesRepository::new(init_memory_database().await.unwrap());
        repo.bulk_create(&[
            property("1", "A", "Downtown", Some(4.0), &["WiFi", "Pool"]),
            property("2", "B", "Midtown", Some(3.0), &["Parking"]),
            property("3", "C", "Uptown", None, &["Gym"]),
        ])
        .await
        .unwrap();

        let filter = PropertyFilter {
            amenities: Some(vec!["Pool".to_string(), "Parking".to_string()]),
            ..Default::default()
        };
        let ids: Vec<String> = repo.find_all(&filter).await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(repo.count(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_location_filter_escapes_wildcards() {
        let repo = PropertiesRepository::new(init_memory_database().await.unwrap());
        repo.bulk_create(&[
            property("1", "A", "Downtown Bangkok", None, &[]),
            property("2", "B", "Midtown Bangkok", None, &[]),
        ])
        .await
        .unwrap();

        let filter = PropertyFilter {
            location: Some("%".to_string()),
            ..Default::default()
        };
        assert!(repo.find_all(&filter).await.unwrap().is_empty());
        assert_eq!(repo.properties_by_location("bangkok").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_scale_rating() {
        let repo = PropertiesRepository::new(init_memory_database().await.unwrap());

        let result = repo.create(&property("1", "A", "Downtown", Some(7.5), &[])).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = repo.bulk_create(&[property("2", "B", "Midtown", Some(-1.0), &[])]).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(repo.count(&PropertyFilter::default()).await.unwrap(), 0);

        assert!(repo.create(&property("3", "C", "Uptown", Some(5.0), &[])).await.is_ok());
    }
}
