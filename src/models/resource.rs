use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::booking::BookingType;

/// A rentable catalog entry: a vehicle or a tour-date slot. The catalog
/// owns these records; this crate only reads stock and unit price.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Resource {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Total units that may be booked concurrently.
    pub stock_count: u32,
    pub price_per_unit: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl Resource {
    /// Catalog collection holding resources of the given booking type.
    pub fn collection_name(booking_type: BookingType) -> &'static str {
        match booking_type {
            BookingType::Vehicle => "Vehicles",
            BookingType::Tour => "TourSlots",
        }
    }
}
