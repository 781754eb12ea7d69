//! HTTP API handlers for prm-api

pub mod analytics;
pub mod health;
pub mod migrate;
pub mod properties;
pub mod records;
pub mod reviews;

pub use analytics::analytics_routes;
pub use health::health_routes;
pub use migrate::migrate_routes;
pub use properties::property_routes;
pub use records::record_routes;
pub use reviews::review_routes;
