//! Grouping of normalized reviews for reporting
//!
//! Every grouping is a stable partition: each input review lands in exactly
//! one bucket and buckets keep input order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::review::NormalizedReview;
use crate::Error;

/// Reviews bucketed by key value
pub type Groups = BTreeMap<String, Vec<NormalizedReview>>;

/// Field used to group reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Listing,
    Type,
    Channel,
    Date,
}

impl GroupKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Listing => "listing",
            GroupKey::Type => "type",
            GroupKey::Channel => "channel",
            GroupKey::Date => "date",
        }
    }

    /// Key value of a review under this grouping
    pub fn key_of(&self, review: &NormalizedReview) -> String {
        match self {
            GroupKey::Listing => review.listing_id.clone(),
            GroupKey::Type => review.review_type.as_str().to_string(),
            GroupKey::Channel => review.channel.as_str().to_string(),
            GroupKey::Date => date_key(&review.date).to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listing" => Ok(GroupKey::Listing),
            "type" => Ok(GroupKey::Type),
            "channel" => Ok(GroupKey::Channel),
            "date" => Ok(GroupKey::Date),
            other => Err(Error::InvalidInput(format!("Unknown grouping key: {}", other))),
        }
    }
}

/// Date-only portion of a review date: everything before the first `T`
///
/// No validation is done; a malformed date is its own key.
pub fn date_key(date: &str) -> &str {
    date.split_once('T').map_or(date, |(day, _)| day)
}

/// Partition reviews by the given key
pub fn group_by(reviews: &[NormalizedReview], key: GroupKey) -> Groups {
    let mut groups = Groups::new();
    for review in reviews {
        groups
            .entry(key.key_of(review))
            .or_default()
            .push(review.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{Channel, ReviewType, Sentiment};

    fn review(id: &str, listing: &str, channel: Channel, date: &str) -> NormalizedReview {
        NormalizedReview {
            id: id.to_string(),
            listing_id: listing.to_string(),
            rating: 4.0,
            comment: String::new(),
            guest_name: String::new(),
            date: date.to_string(),
            review_type: ReviewType::GuestToHost,
            channel,
            source: "hostaway".to_string(),
            normalized_rating: 4.0,
            sentiment: Sentiment::Neutral,
            review_category: None,
        }
    }

    #[test]
    fn test_group_by_date_uses_day_prefix() {
        let reviews = vec![
            review("a", "1", Channel::Hostaway, "2025-03-10T00:00:00Z"),
            review("b", "1", Channel::Hostaway, "2025-03-10T12:00:00Z"),
            review("c", "1", Channel::Hostaway, "not-a-date"),
        ];

        let groups = group_by(&reviews, GroupKey::Date);
        assert_eq!(groups.len(), 2);

        let ids: Vec<&str> = groups["2025-03-10"].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(groups["not-a-date"].len(), 1);
    }

    #[test]
    fn test_date_key_without_time() {
        assert_eq!(date_key("2025-03-10"), "2025-03-10");
        assert_eq!(date_key("2025-03-10 22:45:14"), "2025-03-10 22:45:14");
        assert_eq!(date_key(""), "");
    }

    #[test]
    fn test_missing_listing_groups_under_empty_key() {
        let reviews = vec![
            review("a", "", Channel::Direct, "2025-01-01"),
            review("b", "7", Channel::Direct, "2025-01-01"),
        ];

        let groups = group_by(&reviews, GroupKey::Listing);
        assert_eq!(groups[""].len(), 1);
        assert_eq!(groups["7"].len(), 1);
    }

    #[test]
    fn test_grouping_is_a_stable_partition() {
        let reviews = vec![
            review("a", "1", Channel::Airbnb, "2025-01-01"),
            review("b", "2", Channel::Booking, "2025-01-02"),
            review("c", "1", Channel::Airbnb, "2025-01-03"),
            review("d", "3", Channel::Hostaway, "2025-01-04"),
            review("e", "2", Channel::Airbnb, "2025-01-05"),
        ];

        for key in [GroupKey::Listing, GroupKey::Type, GroupKey::Channel, GroupKey::Date] {
            let groups = group_by(&reviews, key);
            let total: usize = groups.values().map(Vec::len).sum();
            assert_eq!(total, reviews.len(), "grouping by {} lost records", key);

            for bucket in groups.values() {
                let positions: Vec<usize> = bucket
                    .iter()
                    .map(|r| reviews.iter().position(|x| x.id == r.id).unwrap())
                    .collect();
                assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }

        let by_channel = group_by(&reviews, GroupKey::Channel);
        let airbnb: Vec<&str> = by_channel["airbnb"].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(airbnb, vec!["a", "c", "e"]);
    }

    #[test]
    fn test_group_key_parsing() {
        assert_eq!("listing".parse::<GroupKey>().unwrap(), GroupKey::Listing);
        assert_eq!("type".parse::<GroupKey>().unwrap(), GroupKey::Type);
        assert_eq!("channel".parse::<GroupKey>().unwrap(), GroupKey::Channel);
        assert_eq!("date".parse::<GroupKey>().unwrap(), GroupKey::Date);
        assert!("month".parse::<GroupKey>().is_err());
        assert!("Listing".parse::<GroupKey>().is_err());
    }

    #[test]
    fn test_group_by_type_uses_wire_names() {
        let reviews = vec![review("a", "1", Channel::Hostaway, "2025-01-01")];
        let groups = group_by(&reviews, GroupKey::Type);
        assert!(groups.contains_key("guest-to-host"));
    }

    #[test]
    fn test_empty_input_has_no_groups() {
        assert!(group_by(&[], GroupKey::Channel).is_empty());
    }
}
