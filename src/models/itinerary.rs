use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::landmark::Landmark;

/// A landmark reference inside a customer-assembled itinerary. The `order`
/// field is authoritative; insertion order of the list is not.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItineraryStop {
    pub landmark_id: ObjectId,
    pub order: u32,
}

/// Single-day custom itinerary as submitted by a customer.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Itinerary {
    pub stops: Vec<ItineraryStop>,
    /// Minutes; recomputed server-side, never trusted from the client.
    #[serde(default)]
    pub total_time: u32,
    pub is_full_package: bool,
}

impl Itinerary {
    /// Stops sorted by their explicit order field.
    pub fn sorted_stops(&self) -> Vec<&ItineraryStop> {
        let mut stops: Vec<&ItineraryStop> = self.stops.iter().collect();
        stops.sort_by_key(|s| s.order);
        stops
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TourDuration {
    #[serde(rename = "1-day")]
    OneDay,
    #[serde(rename = "2-days")]
    TwoDays,
}

/// One day of a priced itinerary, with the landmarks resolved from the
/// catalog in visiting order.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DayPlan {
    pub day: u8,
    pub landmarks: Vec<Landmark>,
    /// Minutes, including inter-stop travel.
    pub total_time: u32,
}

/// The priced itinerary document stored on a tour booking.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MultiDayItinerary {
    pub duration: TourDuration,
    pub days: Vec<DayPlan>,
    pub is_full_package: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_stops_honors_order_field() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let c = ObjectId::new();
        let itinerary = Itinerary {
            stops: vec![
                ItineraryStop { landmark_id: c, order: 2 },
                ItineraryStop { landmark_id: a, order: 0 },
                ItineraryStop { landmark_id: b, order: 1 },
            ],
            total_time: 0,
            is_full_package: false,
        };

        let sorted: Vec<ObjectId> = itinerary
            .sorted_stops()
            .into_iter()
            .map(|s| s.landmark_id)
            .collect();
        assert_eq!(sorted, vec![a, b, c]);
    }

    #[test]
    fn test_tour_duration_serde_tags() {
        assert_eq!(
            serde_json::to_string(&TourDuration::OneDay).unwrap(),
            "\"1-day\""
        );
        assert_eq!(
            serde_json::to_string(&TourDuration::TwoDays).unwrap(),
            "\"2-days\""
        );
    }
}
