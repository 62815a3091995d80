use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A visitable stop from the catalog. Owned by the catalog service;
/// read-only here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Landmark {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub location: GeoPoint,
    /// Minutes a visitor spends once on-site.
    pub estimated_duration: u32,
    pub category: String,
    pub tour_type: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}
