//! Built-in datasets
//!
//! Served with `?mock=true`, used as the fallback when the Hostaway source
//! fails, and seeded into the store by `POST /api/migrate`.

use prm_common::property::{slugify, Property};
use prm_common::{Channel, RawReview, ReviewCategory, ReviewStatus, ReviewType};
use serde::Serialize;

/// Review from the Google Places mock feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleReview {
    pub id: u32,
    pub rating: f64,
    pub comment: String,
    pub author_name: String,
    pub date: String,
}

#[allow(clippy::too_many_arguments)]
fn review(
    id: &str,
    listing_id: &str,
    listing_name: &str,
    channel: Channel,
    review_type: ReviewType,
    rating: Option<f64>,
    categories: &[(&str, f64)],
    guest_name: &str,
    date: &str,
    comment: &str,
) -> RawReview {
    let mut review = RawReview::new(id, review_type, channel, "hostaway");
    review.listing_id = Some(listing_id.to_string());
    review.listing_name = Some(listing_name.to_string());
    review.rating = rating;
    review.guest_name = guest_name.to_string();
    review.date = date.to_string();
    review.comment = comment.to_string();
    review.review_category = Some(
        categories
            .iter()
            .map(|(category, rating)| ReviewCategory::new(*category, *rating))
            .collect(),
    );
    review.status = Some(ReviewStatus::Published);
    review.approved = Some(false);
    review
}

const DOWNTOWN: &str = "Luxury Downtown Apartment";
const MIDTOWN: &str = "Cozy Studio in Midtown";
const LOFT: &str = "Modern City Loft";

/// Hostaway-shaped review dataset
pub fn hostaway_reviews() -> Vec<RawReview> {
    use Channel::*;
    use ReviewType::*;

    let mut reviews = vec![
        review(
            "7453", "1", DOWNTOWN, Hostaway, GuestToHost, None,
            &[("cleanliness", 10.0), ("communication", 10.0), ("respect_house_rules", 10.0)],
            "Shane Finkelstein", "2025-01-12 22:45:14",
            "Amazing apartment with a fantastic view of the city. Highly recommend!",
        ),
        review(
            "7454", "1", DOWNTOWN, Airbnb, GuestToHost, Some(4.0), &[],
            "Maria Lopez", "2025-02-03 10:12:00",
            "Great location and a comfortable bed. Check-in was smooth.",
        ),
        review(
            "7455", "1", DOWNTOWN, Booking, GuestToHost, None,
            &[("cleanliness", 4.0), ("communication", 6.0), ("value", 5.0)],
            "Tom Becker", "2025-03-18 08:30:00",
            "The bathroom was dirty and the AC was broken for two days.",
        ),
        review(
            "7456", "1", DOWNTOWN, Hostaway, HostToGuest, Some(5.0), &[],
            "Yuki Tanaka", "2025-04-22 17:05:41",
            "Wonderful guest, left the place spotless.",
        ),
        review(
            "7457", "2", MIDTOWN, Airbnb, GuestToHost, None,
            &[("cleanliness", 9.0), ("communication", 8.0), ("location", 9.0)],
            "Priya Sharma", "2025-03-02 14:20:00",
            "Perfect little studio, we loved the neighborhood cafes.",
        ),
        review(
            "7458", "2", MIDTOWN, Direct, GuestToHost, Some(3.0), &[],
            "Lucas Martin", "2025-05-09 09:45:12",
            "Decent stay but overpriced for the size.",
        ),
        review(
            "7459", "2", MIDTOWN, Booking, GuestToHost, Some(2.0), &[],
            "Emma Wilson", "2025-06-14 19:33:27",
            "Noisy at night and the wifi kept dropping.",
        ),
        review(
            "7460", "2", MIDTOWN, Hostaway, Automatic, None, &[],
            "Hostaway", "2025-07-01 00:00:00",
            "",
        ),
        review(
            "7461", "3", LOFT, Hostaway, GuestToHost, None,
            &[("cleanliness", 10.0), ("communication", 9.0), ("location", 10.0), ("value", 9.0)],
            "Daniel Kim", "2025-05-27 11:11:11",
            "Outstanding loft, beautiful design and an excellent host.",
        ),
        review(
            "7462", "3", LOFT, Airbnb, GuestToHost, Some(4.5), &[],
            "Sofia Rossi", "2025-08-08 16:40:00",
            "Stylish space and great rooftop, but the elevator needed maintenance.",
        ),
        review(
            "7463", "3", LOFT, Direct, GuestToHost, Some(3.5), &[],
            "Noah Brown", "2025-09-03 13:15:09",
            "Good value overall, a few scuffs on the walls.",
        ),
    ];

    // Google-sourced review on the 0-10 scale
    let mut google = review(
        "7464", "3", LOFT, Direct, GuestToHost, Some(9.0), &[],
        "Olivia Chen", "2025-09-15T10:00:00Z",
        "Brilliant stay, superb service from start to finish.",
    );
    google.source = "google".to_string();
    reviews.push(google);

    reviews
}

/// Mock Google Places reviews
pub fn google_reviews() -> Vec<GoogleReview> {
    vec![
        GoogleReview {
            id: 1,
            rating: 5.0,
            comment: "Amazing location!".to_string(),
            author_name: "Alice Johnson".to_string(),
            date: "2023-01-02".to_string(),
        },
        GoogleReview {
            id: 2,
            rating: 4.0,
            comment: "Clean and modern".to_string(),
            author_name: "Bob Wilson".to_string(),
            date: "2023-01-04".to_string(),
        },
    ]
}

fn property(
    id: &str,
    name: &str,
    location: &str,
    rating: f64,
    description: &str,
    amenities: &[&str],
    images: &[&str],
) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        rating: Some(rating),
        description: description.to_string(),
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        images: images.iter().map(|i| i.to_string()).collect(),
        slug: Some(slugify(name)),
        price: None,
        bedrooms: None,
        bathrooms: None,
        max_guests: None,
        created_at: None,
        updated_at: None,
    }
}

const IMAGE_LIVING_ROOM: &str = "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80";
const IMAGE_KITCHEN: &str = "https://images.unsplash.com/photo-1484154218962-a197022b5858?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80";
const IMAGE_BEDROOM: &str = "https://images.unsplash.com/photo-1586023492125-27b2c045efd7?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80";
const IMAGE_STUDIO: &str = "https://images.unsplash.com/photo-1555854877-bab0e564b8d5?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80";
const IMAGE_LOFT: &str = "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80";

/// The three demo properties; ids match the review `listingId`s
pub fn properties() -> Vec<Property> {
    vec![
        property(
            "1",
            DOWNTOWN,
            "Downtown Bangkok",
            4.5,
            "A stunning luxury apartment in the heart of Bangkok's bustling downtown district. \
             This modern property features floor-to-ceiling windows with panoramic city views, \
             high-end finishes, and premium amenities.",
            &[
                "WiFi",
                "Air conditioning",
                "Kitchen",
                "Washer",
                "Dryer",
                "Elevator",
                "Gym access",
                "Swimming pool",
                "Concierge service",
                "Parking",
            ],
            &[IMAGE_LIVING_ROOM, IMAGE_KITCHEN, IMAGE_BEDROOM],
        ),
        property(
            "2",
            MIDTOWN,
            "Midtown Bangkok",
            4.2,
            "A charming studio apartment perfect for solo travelers or couples. Located in a \
             quiet midtown neighborhood with easy access to public transportation and local \
             attractions.",
            &[
                "WiFi",
                "Air conditioning",
                "Kitchenette",
                "Coffee maker",
                "Smart TV",
                "Workspace",
                "Laundry facilities",
                "Security system",
            ],
            &[IMAGE_STUDIO, IMAGE_BEDROOM],
        ),
        property(
            "3",
            LOFT,
            "Central Bangkok",
            4.7,
            "An exquisite modern loft in the heart of Bangkok, featuring industrial-chic design \
             with exposed brick walls, high ceilings, and state-of-the-art amenities perfect for \
             urban living.",
            &[
                "WiFi",
                "Air conditioning",
                "Fully equipped kitchen",
                "In-unit washer/dryer",
                "Rooftop access",
                "Gym membership",
                "24/7 security",
                "Parking",
                "Concierge",
                "City views",
            ],
            &[IMAGE_LOFT, IMAGE_KITCHEN, IMAGE_BEDROOM],
        ),
    ]
}
