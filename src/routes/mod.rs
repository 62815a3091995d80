use chrono::{DateTime, Utc};

pub mod availability;
pub mod bookings;
pub mod health;
pub mod itinerary;

/// HTTP inputs carry RFC 3339 timestamps; storage compares bson instants.
pub(crate) fn bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}
