//! Overlap-Based Availability Aggregator
//!
//! Counts bookings whose `[start_date, end_date]` conflicts with a candidate
//! window and reports remaining capacity against a resource's stock. Two
//! counting policies exist on purpose: capacity reporting counts confirmed
//! bookings only, while the pre-insert admission check also counts pending
//! ones so two unconfirmed requests cannot both slip through.
//!
//! Counts always come from the durable store, never from an in-process
//! cache; a store failure propagates instead of reporting open capacity.

use std::collections::HashMap;
use std::sync::Arc;

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::db::mongo::{db_name, BOOKINGS_COLLECTION};
use crate::models::booking::{Booking, BookingStatus};

/// Candidate reservation window, both ends inclusive instants.
#[derive(Debug, Clone, Copy)]
pub struct BookingWindow {
    pub start: DateTime,
    pub end: DateTime,
}

/// Which statuses hold capacity for a given check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Dashboard/capacity reporting: confirmed bookings only.
    ConfirmedOnly,
    /// Admission control before inserting a new booking: pending requests
    /// already consume capacity.
    ConfirmedAndPending,
}

impl CountingMode {
    pub fn counts(&self, status: BookingStatus) -> bool {
        match self {
            CountingMode::ConfirmedOnly => status == BookingStatus::Confirmed,
            CountingMode::ConfirmedAndPending => status.is_active(),
        }
    }

    fn status_filter(&self) -> Bson {
        match self {
            CountingMode::ConfirmedOnly => Bson::String("confirmed".to_string()),
            CountingMode::ConfirmedAndPending => {
                Bson::Document(doc! { "$in": ["pending", "confirmed"] })
            }
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAvailability {
    pub booked_count: u32,
    pub available_count: u32,
    pub is_available: bool,
}

pub struct AvailabilityService {
    client: Arc<Client>,
}

impl AvailabilityService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn bookings(&self) -> Collection<Booking> {
        self.client
            .database(&db_name())
            .collection(BOOKINGS_COLLECTION)
    }

    /// Half-open overlap test: a booking ending exactly when the candidate
    /// window starts does not conflict. Changing `<`/`>` to `<=`/`>=` alters
    /// boundary behavior and is a regression.
    pub fn windows_overlap(window: &BookingWindow, booking_start: DateTime, booking_end: DateTime) -> bool {
        booking_start < window.end && booking_end > window.start
    }

    /// Remaining capacity from a conflict count. Oversold resources clamp
    /// to zero rather than going negative.
    pub fn from_counts(stock_count: u32, booked_count: u32) -> ResourceAvailability {
        let available_count = stock_count.saturating_sub(booked_count);
        ResourceAvailability {
            booked_count,
            available_count,
            is_available: available_count > 0,
        }
    }

    /// In-memory conflict count over already-fetched bookings.
    pub fn count_conflicts(bookings: &[Booking], window: &BookingWindow, mode: CountingMode) -> u32 {
        bookings
            .iter()
            .filter(|b| mode.counts(b.status))
            .filter(|b| Self::windows_overlap(window, b.start_date, b.end_date))
            .count() as u32
    }

    /// Availability of a single resource for the window. The resource
    /// equality, status, and overlap filters all run server-side.
    pub async fn resource_availability(
        &self,
        resource_id: ObjectId,
        window: &BookingWindow,
        stock_count: u32,
        mode: CountingMode,
    ) -> Result<ResourceAvailability, mongodb::error::Error> {
        let filter = doc! {
            "resource_id": resource_id,
            "status": mode.status_filter(),
            "start_date": { "$lt": window.end },
            "end_date": { "$gt": window.start },
        };

        let booked = self.bookings().count_documents(filter).await?;
        Ok(Self::from_counts(stock_count, booked as u32))
    }

    /// Availability of every vehicle in the fleet for one window, computed
    /// from a single scan of confirmed vehicle bookings so query cost does
    /// not grow with catalog size.
    pub async fn fleet_availability(
        &self,
        resources: &[(ObjectId, u32)],
        window: &BookingWindow,
    ) -> Result<HashMap<ObjectId, ResourceAvailability>, mongodb::error::Error> {
        let filter = doc! {
            "booking_type": "vehicle",
            "status": "confirmed",
            "start_date": { "$lt": window.end },
            "end_date": { "$gt": window.start },
        };

        let conflicting: Vec<Booking> = self.bookings().find(filter).await?.try_collect().await?;

        let mut counts: HashMap<ObjectId, u32> = HashMap::new();
        for booking in &conflicting {
            *counts.entry(booking.resource_id).or_insert(0) += 1;
        }

        log::debug!(
            "fleet availability: {} conflicting bookings across {} resources",
            conflicting.len(),
            resources.len()
        );

        Ok(resources
            .iter()
            .map(|(id, stock)| {
                let booked = counts.get(id).copied().unwrap_or(0);
                (*id, Self::from_counts(*stock, booked))
            })
            .collect())
    }
}
