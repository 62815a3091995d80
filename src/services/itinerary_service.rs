//! Resolves customer-assembled itineraries against the landmark catalog and
//! prices them. Client-supplied totals are never trusted: every quote
//! recomputes visit and travel time from catalog records.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::db::mongo::{db_name, LANDMARKS_COLLECTION};
use crate::models::itinerary::{DayPlan, Itinerary, ItineraryStop, MultiDayItinerary, TourDuration};
use crate::models::landmark::Landmark;
use crate::services::geo_service::GeoService;
use crate::services::pricing_service::{MultiDayPriceBreakdown, PricingService};

#[derive(Debug, Deserialize)]
pub struct DayRequest {
    pub day: u8,
    pub stops: Vec<ItineraryStop>,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryRequest {
    pub duration: TourDuration,
    pub days: Vec<DayRequest>,
    pub is_full_package: bool,
}

#[derive(Debug, Serialize)]
pub struct ItineraryQuote {
    pub itinerary: MultiDayItinerary,
    pub total_price: i64,
    pub breakdown: MultiDayPriceBreakdown,
    /// True when the (not selected) package rate would be strictly cheaper.
    /// A suggestion for the customer; billing never switches on its own.
    pub full_package_suggested: bool,
}

#[derive(Debug)]
pub enum ItineraryError {
    DayCountMismatch { expected: usize, got: usize },
    InvalidDayNumbers,
    UnknownLandmark(ObjectId),
    Store(mongodb::error::Error),
}

impl fmt::Display for ItineraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryError::DayCountMismatch { expected, got } => {
                write!(f, "expected {} day(s), got {}", expected, got)
            }
            ItineraryError::InvalidDayNumbers => {
                write!(f, "days must be numbered 1..=2 without gaps")
            }
            ItineraryError::UnknownLandmark(id) => write!(f, "unknown landmark: {}", id),
            ItineraryError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for ItineraryError {}

impl From<mongodb::error::Error> for ItineraryError {
    fn from(e: mongodb::error::Error) -> Self {
        ItineraryError::Store(e)
    }
}

pub struct ItineraryService {
    client: Arc<Client>,
}

impl ItineraryService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn landmarks(&self) -> Collection<Landmark> {
        self.client
            .database(&db_name())
            .collection(LANDMARKS_COLLECTION)
    }

    /// Quote a single-day itinerary as submitted by the customer builder.
    /// The submitted `total_time` is ignored entirely and recomputed from
    /// catalog records.
    pub async fn quote_single_day(
        &self,
        itinerary: &Itinerary,
    ) -> Result<ItineraryQuote, ItineraryError> {
        let request = ItineraryRequest {
            duration: TourDuration::OneDay,
            days: vec![DayRequest {
                day: 1,
                stops: itinerary.sorted_stops().into_iter().cloned().collect(),
            }],
            is_full_package: itinerary.is_full_package,
        };
        self.quote(&request).await
    }

    /// Resolve and price an itinerary request. One catalog query fetches
    /// every referenced landmark; stops are visited in their explicit
    /// `order`, days in ascending day number.
    pub async fn quote(&self, request: &ItineraryRequest) -> Result<ItineraryQuote, ItineraryError> {
        let expected = match request.duration {
            TourDuration::OneDay => 1,
            TourDuration::TwoDays => 2,
        };
        if request.days.len() != expected {
            return Err(ItineraryError::DayCountMismatch {
                expected,
                got: request.days.len(),
            });
        }

        let ids: Vec<ObjectId> = request
            .days
            .iter()
            .flat_map(|d| d.stops.iter().map(|s| s.landmark_id))
            .collect();

        let found: Vec<Landmark> = if ids.is_empty() {
            Vec::new()
        } else {
            self.landmarks()
                .find(doc! { "_id": { "$in": ids.clone() } })
                .await?
                .try_collect()
                .await?
        };
        let by_id: HashMap<ObjectId, Landmark> = found
            .into_iter()
            .filter_map(|l| l.id.map(|id| (id, l)))
            .collect();

        let mut day_requests: Vec<&DayRequest> = request.days.iter().collect();
        day_requests.sort_by_key(|d| d.day);
        if day_requests
            .iter()
            .enumerate()
            .any(|(i, d)| usize::from(d.day) != i + 1)
        {
            return Err(ItineraryError::InvalidDayNumbers);
        }

        let mut days = Vec::with_capacity(day_requests.len());
        for day_request in day_requests {
            let mut stops: Vec<&ItineraryStop> = day_request.stops.iter().collect();
            stops.sort_by_key(|s| s.order);

            let mut landmarks = Vec::with_capacity(stops.len());
            for stop in stops {
                let landmark = by_id
                    .get(&stop.landmark_id)
                    .cloned()
                    .ok_or(ItineraryError::UnknownLandmark(stop.landmark_id))?;
                landmarks.push(landmark);
            }

            let total_time = GeoService::total_time(&landmarks);
            days.push(DayPlan {
                day: day_request.day,
                landmarks,
                total_time,
            });
        }

        let day1_minutes = days[0].total_time;
        let day2_minutes = days.get(1).map(|d| d.total_time);

        let total_price =
            PricingService::multi_day_price(day1_minutes, day2_minutes, request.is_full_package);
        let breakdown =
            PricingService::multi_day_breakdown(day1_minutes, day2_minutes, request.is_full_package);

        let full_package_suggested = !request.is_full_package
            && match day2_minutes {
                Some(day2) => PricingService::is_two_day_package_better(day1_minutes, day2),
                None => PricingService::is_full_package_better(day1_minutes),
            };

        Ok(ItineraryQuote {
            itinerary: MultiDayItinerary {
                duration: request.duration,
                days,
                is_full_package: request.is_full_package,
            },
            total_price,
            breakdown,
            full_package_suggested,
        })
    }
}
