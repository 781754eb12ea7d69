//! Repository tests against an in-memory SQLite store

use prm_common::db::{
    init_memory_database, PropertiesRepository, PropertyPatch, ReviewPatch, ReviewQuery,
    ReviewRepository, ReviewSort,
};
use prm_common::property::{Property, PropertyFilter};
use prm_common::{Channel, Error, RawReview, ReviewCategory, ReviewStatus, ReviewType};

fn review(id: &str, listing: &str, channel: Channel, rating: f64, date: &str) -> RawReview {
    let mut review = RawReview::new(id, ReviewType::GuestToHost, Channel::Hostaway, channel.as_str());
    review.channel = channel;
    review.listing_id = Some(listing.to_string());
    review.rating = Some(rating);
    review.comment = format!("Review {}", id);
    review.guest_name = "Guest".to_string();
    review.date = date.to_string();
    review
}

fn property(id: &str, name: &str, location: &str, rating: Option<f64>, price: f64) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        rating,
        description: format!("A place called {}", name),
        amenities: vec!["WiFi".to_string()],
        images: vec![],
        slug: None,
        price: Some(price),
        bedrooms: Some(1),
        bathrooms: Some(1),
        max_guests: Some(2),
        created_at: None,
        updated_at: None,
    }
}

async fn review_repo() -> ReviewRepository {
    ReviewRepository::new(init_memory_database().await.unwrap())
}

async fn property_repo() -> PropertiesRepository {
    PropertiesRepository::new(init_memory_database().await.unwrap())
}

#[tokio::test]
async fn test_review_create_and_find() {
    let repo = review_repo().await;
    let mut input = review("7453", "1", Channel::Hostaway, 4.0, "2025-03-10 22:45:14");
    input.review_category = Some(vec![ReviewCategory::new("cleanliness", 10.0)]);
    input.listing_name = Some("Luxury Downtown Apartment".to_string());

    let created = repo.create(&input).await.unwrap();
    assert_eq!(created.id, "7453");
    assert_eq!(created.approved, Some(false));
    assert_eq!(created.status, Some(ReviewStatus::Pending));
    assert_eq!(created.review_category, input.review_category);
    assert_eq!(created.listing_name.as_deref(), Some("Luxury Downtown Apartment"));

    assert!(repo.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_review_create_duplicate_is_conflict() {
    let repo = review_repo().await;
    let input = review("1", "1", Channel::Airbnb, 4.0, "2025-01-01");
    repo.create(&input).await.unwrap();

    let result = repo.create(&input).await;
    assert!(matches!(result, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_review_query_filters_and_sort() {
    let repo = review_repo().await;
    repo.bulk_create(&[
        review("a", "1", Channel::Airbnb, 3.0, "2025-01-01"),
        review("b", "1", Channel::Hostaway, 5.0, "2025-03-01"),
        review("c", "2", Channel::Airbnb, 4.0, "2025-02-01"),
    ])
    .await
    .unwrap();

    let all = repo.find_all(&ReviewQuery::default()).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);

    let by_listing = repo
        .find_all(&ReviewQuery {
            listing_id: Some("1".to_string()),
            sort: ReviewSort::RatingAsc,
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<&str> = by_listing.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    // Empty listing id is ignored
    let query = ReviewQuery {
        listing_id: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(repo.count(&query).await.unwrap(), 3);

    let airbnb = repo
        .reviews_by_channel(Channel::Airbnb, ReviewQuery::default())
        .await
        .unwrap();
    assert_eq!(airbnb.len(), 2);
    assert_eq!(repo.reviews_by_listing("2", ReviewQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_review_paging() {
    let repo = review_repo().await;
    let reviews: Vec<RawReview> = (1..=5)
        .map(|i| review(&i.to_string(), "1", Channel::Direct, 4.0, &format!("2025-01-0{}", i)))
        .collect();
    repo.bulk_create(&reviews).await.unwrap();

    let page = repo
        .find_all(&ReviewQuery {
            limit: Some(2),
            skip: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<&str> = page.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["4", "3"]);

    // Skip without limit returns the remainder
    let rest = repo
        .find_all(&ReviewQuery {
            skip: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rest.len(), 2);

    // Count ignores paging
    let query = ReviewQuery {
        limit: Some(1),
        ..Default::default()
    };
    assert_eq!(repo.count(&query).await.unwrap(), 5);
}

#[tokio::test]
async fn test_review_update_and_delete() {
    let repo = review_repo().await;
    repo.create(&review("1", "1", Channel::Booking, 2.0, "2025-01-01")).await.unwrap();

    let updated = repo
        .update_by_id(
            "1",
            &ReviewPatch {
                comment: Some("Updated".to_string()),
                rating: Some(4.5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.comment, "Updated");
    assert_eq!(updated.rating, Some(4.5));
    assert_eq!(updated.channel, Channel::Booking);

    assert!(repo.update_by_id("missing", &ReviewPatch::default()).await.unwrap().is_none());

    assert!(repo.delete_by_id("1").await.unwrap());
    assert!(!repo.delete_by_id("1").await.unwrap());
}

#[tokio::test]
async fn test_approve_review_sets_status() {
    let repo = review_repo().await;
    repo.create(&review("1", "1", Channel::Hostaway, 4.0, "2025-01-01")).await.unwrap();

    assert!(!repo.get_approval_status("1").await.unwrap());

    let approved = repo.approve_review("1", true).await.unwrap().unwrap();
    assert_eq!(approved.approved, Some(true));
    assert_eq!(approved.status, Some(ReviewStatus::Published));
    assert!(repo.get_approval_status("1").await.unwrap());

    let revoked = repo.approve_review("1", false).await.unwrap().unwrap();
    assert_eq!(revoked.status, Some(ReviewStatus::Pending));

    assert!(repo.approve_review("missing", true).await.unwrap().is_none());
    assert!(!repo.get_approval_status("missing").await.unwrap());

    let statuses = repo.get_all_approval_statuses().await.unwrap();
    assert_eq!(statuses.get("1"), Some(&false));
}

#[tokio::test]
async fn test_bulk_create_skips_existing_ids() {
    let repo = review_repo().await;
    let batch = vec![
        review("1", "1", Channel::Hostaway, 4.0, "2025-01-01"),
        review("2", "1", Channel::Hostaway, 4.0, "2025-01-02"),
    ];

    assert_eq!(repo.bulk_create(&batch).await.unwrap(), 2);
    assert_eq!(repo.bulk_create(&batch).await.unwrap(), 0);
    assert_eq!(repo.count(&ReviewQuery::default()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_property_create_derives_slug() {
    let repo = property_repo().await;
    let created = repo
        .create(&property("1", "Luxury Downtown Apartment", "Downtown Bangkok", None, 150.0))
        .await
        .unwrap();

    assert_eq!(created.slug.as_deref(), Some("luxury-downtown-apartment"));
    assert!(created.created_at.is_some());

    let by_slug = repo.find_by_slug("luxury-downtown-apartment").await.unwrap().unwrap();
    assert_eq!(by_slug.id, "1");

    let duplicate = repo
        .create(&property("1", "Other", "Elsewhere", None, 1.0))
        .await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_property_filter_and_ordering() {
    let repo = property_repo().await;
    repo.bulk_create(&[
        property("1", "Luxury Downtown Apartment", "Downtown Bangkok", Some(4.5), 150.0),
        property("2", "Cozy Studio in Midtown", "Midtown Bangkok", Some(4.2), 80.0),
        property("3", "Modern City Loft", "Central Bangkok", Some(4.7), 200.0),
        property("4", "Unrated Cabin", "Chiang Mai", None, 50.0),
    ])
    .await
    .unwrap();

    let all = repo.find_all(&PropertyFilter::default()).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2", "4"]);

    let filter = PropertyFilter {
        location: Some("BANGKOK".to_string()),
        max_price: Some(160.0),
        ..Default::default()
    };
    let ids: Vec<String> = repo.find_all(&filter).await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(repo.count(&filter).await.unwrap(), 2);

    let filter = PropertyFilter {
        min_rating: Some(4.5),
        ..Default::default()
    };
    assert_eq!(repo.count(&filter).await.unwrap(), 2);

    let top = repo.top_rated(2).await.unwrap();
    let ids: Vec<&str> = top.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1"]);
}

#[tokio::test]
async fn test_property_search_and_update() {
    let repo = property_repo().await;
    repo.bulk_create(&[
        property("1", "Luxury Downtown Apartment", "Downtown Bangkok", Some(4.5), 150.0),
        property("2", "Cozy Studio in Midtown", "Midtown Bangkok", Some(4.2), 80.0),
    ])
    .await
    .unwrap();

    let found = repo.search("studio", &PropertyFilter::default()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "2");

    // Description match
    let found = repo.search("PLACE CALLED", &PropertyFilter::default()).await.unwrap();
    assert_eq!(found.len(), 2);

    let updated = repo
        .update_by_id(
            "2",
            &PropertyPatch {
                price: Some(95.0),
                amenities: Some(vec!["WiFi".to_string(), "Gym access".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.price, Some(95.0));
    assert_eq!(updated.amenities.len(), 2);
    assert_eq!(updated.name, "Cozy Studio in Midtown");

    assert!(repo.update_rating("2", Some(3.8)).await.unwrap());
    assert_eq!(repo.find_by_id("2").await.unwrap().unwrap().rating, Some(3.8));
    assert!(repo.update_rating("2", Some(7.0)).await.is_err());
    assert!(!repo.update_rating("missing", None).await.unwrap());

    assert!(repo.delete_by_id("1").await.unwrap());
    assert_eq!(repo.count(&PropertyFilter::default()).await.unwrap(), 1);
}
