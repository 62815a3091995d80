use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::itinerary::MultiDayItinerary;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Tour,
    Vehicle,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Tour => "tour",
            BookingType::Vehicle => "vehicle",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

// Older documents were written without a status field; treat them as pending.
impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// A booking that still holds capacity: pending or confirmed.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Allowed lifecycle transitions. Cancelled and completed are terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        match self {
            BookingStatus::Pending => {
                matches!(next, BookingStatus::Confirmed | BookingStatus::Cancelled)
            }
            BookingStatus::Confirmed => {
                matches!(next, BookingStatus::Cancelled | BookingStatus::Completed)
            }
            BookingStatus::Cancelled | BookingStatus::Completed => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub resource_id: ObjectId,
    pub booking_type: BookingType,
    #[serde(default)]
    pub status: BookingStatus,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub total_price: i64,
    pub user_id: ObjectId,
    pub user_name: String,
    pub user_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary_details: Option<MultiDayItinerary>,
    pub created_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));

        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Pending));

        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let doc = mongodb::bson::doc! {
            "resource_id": ObjectId::new(),
            "booking_type": "vehicle",
            "start_date": DateTime::now(),
            "end_date": DateTime::now(),
            "total_price": 2000_i64,
            "user_id": ObjectId::new(),
            "user_name": "Asha Rao",
            "user_email": "asha@example.com",
            "created_at": DateTime::now(),
        };

        let booking: Booking = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_active_statuses() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(!BookingStatus::Completed.is_active());
    }
}
