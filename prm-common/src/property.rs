//! Property model
//!
//! A property is referenced by reviews through `listingId`. Its `rating` is
//! derived from approved reviews and is absent until one exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_guests: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Slug if set, otherwise derived from the name
    pub fn slug_or_derived(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// Property listing filter
///
/// `limit`/`skip` of 0 mean "no limit"/"no offset".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl PropertyFilter {
    /// In-memory equivalent of the store query (ignores paging)
    ///
    /// Location is a case-insensitive substring match; amenities match when
    /// the property has any of them. A property without rating or price
    /// fails the respective bound.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(location) = &self.location {
            if !property
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if !property.rating.is_some_and(|rating| rating >= min_rating) {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if !property.price.is_some_and(|price| price <= max_price) {
                return false;
            }
        }

        match self.amenities.as_deref() {
            Some(wanted) if !wanted.is_empty() => {
                wanted.iter().any(|amenity| property.amenities.contains(amenity))
            }
            _ => true,
        }
    }
}

/// Page of properties
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchResult {
    pub properties: Vec<Property>,
    pub total: i64,
    pub has_more: bool,
}

impl PropertySearchResult {
    pub fn new(properties: Vec<Property>, total: i64, skip: i64) -> Self {
        let has_more = skip + (properties.len() as i64) < total;
        Self {
            properties,
            total,
            has_more,
        }
    }
}

/// URL slug from a display name: lower-case alphanumerics joined by `-`
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(location: &str, rating: Option<f64>, price: Option<f64>, amenities: &[&str]) -> Property {
        Property {
            id: "1".to_string(),
            name: "Luxury Downtown Apartment".to_string(),
            location: location.to_string(),
            rating,
            description: String::new(),
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            images: Vec::new(),
            slug: None,
            price,
            bedrooms: None,
            bathrooms: None,
            max_guests: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Luxury Downtown Apartment"), "luxury-downtown-apartment");
        assert_eq!(slugify("  Cozy Studio -- in Midtown! "), "cozy-studio-in-midtown");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slug_or_derived() {
        let mut p = property("Bangkok", None, None, &[]);
        assert_eq!(p.slug_or_derived(), "luxury-downtown-apartment");
        p.slug = Some("custom".to_string());
        assert_eq!(p.slug_or_derived(), "custom");
    }

    #[test]
    fn test_filter_location_is_case_insensitive() {
        let filter = PropertyFilter {
            location: Some("downtown".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&property("Downtown Bangkok", None, None, &[])));
        assert!(!filter.matches(&property("Midtown Bangkok", None, None, &[])));
    }

    #[test]
    fn test_filter_bounds() {
        let filter = PropertyFilter {
            min_rating: Some(4.5),
            max_price: Some(200.0),
            ..Default::default()
        };
        assert!(filter.matches(&property("x", Some(4.7), Some(150.0), &[])));
        assert!(!filter.matches(&property("x", Some(4.2), Some(150.0), &[])));
        assert!(!filter.matches(&property("x", Some(4.7), Some(250.0), &[])));
        assert!(!filter.matches(&property("x", None, Some(150.0), &[])));
    }

    #[test]
    fn test_filter_amenities_any_of() {
        let filter = PropertyFilter {
            amenities: Some(vec!["Gym access".to_string(), "Parking".to_string()]),
            ..Default::default()
        };
        assert!(filter.matches(&property("x", None, None, &["WiFi", "Parking"])));
        assert!(!filter.matches(&property("x", None, None, &["WiFi"])));
        assert!(PropertyFilter::default().matches(&property("x", None, None, &[])));
    }

    #[test]
    fn test_search_result_has_more() {
        let page = vec![property("x", None, None, &[])];
        assert!(PropertySearchResult::new(page.clone(), 3, 0).has_more);
        assert!(!PropertySearchResult::new(page, 3, 2).has_more);
    }
}
