use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::mongo::{db_name, BOOKINGS_COLLECTION};
use crate::models::booking::{Booking, BookingStatus, BookingType};
use crate::models::resource::Resource;
use crate::routes::bson_datetime;
use crate::services::availability_service::{AvailabilityService, BookingWindow, CountingMode};
use crate::services::booking_query_service::{
    BookingFeed, BookingFilters, MongoBookingStore, PageCursor,
};
use crate::services::itinerary_service::{ItineraryError, ItineraryRequest, ItineraryService};

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
    pub booking_type: Option<BookingType>,
    pub user_id: Option<String>,
    pub search: Option<String>,
    pub cursor: Option<String>,
}

/*
    GET /api/bookings
*/
pub async fn list_bookings(
    data: web::Data<Arc<Client>>,
    query: web::Query<ListBookingsQuery>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let query = query.into_inner();

    let user_id = match &query.user_id {
        Some(raw) => match ObjectId::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
        },
        None => None,
    };

    let filters = BookingFilters {
        status: query.status,
        booking_type: query.booking_type,
        user_id,
    };
    let store = MongoBookingStore::new(client);

    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let mut feed = match (search, &query.cursor) {
        // A non-empty search term wins over any cursor: search mode has no
        // pagination.
        (Some(term), _) => {
            let mut feed = BookingFeed::new(store, filters);
            feed.set_search_term(Some(term)).await;
            feed
        }
        (None, Some(raw)) => {
            let cursor = match PageCursor::parse(raw) {
                Ok(cursor) => cursor,
                Err(e) => return HttpResponse::BadRequest().body(e),
            };
            let mut feed = BookingFeed::resume(store, filters, cursor);
            feed.load_more().await;
            feed
        }
        (None, None) => {
            let mut feed = BookingFeed::new(store, filters);
            feed.refresh().await;
            feed
        }
    };

    match feed.error() {
        Some(err) => {
            log::error!("Failed to list bookings: {}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
        None => HttpResponse::Ok().json(feed.page()),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingInput {
    pub resource_id: String,
    pub booking_type: BookingType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    /// Custom tour itineraries only; priced server-side.
    pub itinerary: Option<ItineraryRequest>,
}

/*
    POST /api/bookings

    The booking-creation flow: admission-control availability check
    (pending bookings count as consumed capacity), then insert as pending.
*/
pub async fn create_booking(
    data: web::Data<Arc<Client>>,
    input: web::Json<CreateBookingInput>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let input = input.into_inner();

    let resource_id = match ObjectId::parse_str(&input.resource_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid resource ID"),
    };
    let user_id = match ObjectId::parse_str(&input.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };
    if input.end_date < input.start_date {
        return HttpResponse::BadRequest().body("end_date must not precede start_date");
    }

    // The catalog owns the resource; we only read stock and unit price.
    let resources: mongodb::Collection<Resource> = client
        .database(&db_name())
        .collection(Resource::collection_name(input.booking_type));
    let resource = match resources.find_one(doc! { "_id": resource_id }).await {
        Ok(Some(resource)) => resource,
        Ok(None) => return HttpResponse::NotFound().body("Resource not found"),
        Err(e) => {
            log::error!("Failed to fetch resource {}: {}", resource_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch resource");
        }
    };

    let window = BookingWindow {
        start: bson_datetime(input.start_date),
        end: bson_datetime(input.end_date),
    };

    let availability = match AvailabilityService::new(client.clone())
        .resource_availability(
            resource_id,
            &window,
            resource.stock_count,
            CountingMode::ConfirmedAndPending,
        )
        .await
    {
        Ok(availability) => availability,
        // Never fall back to optimistic availability: blocking a booking
        // beats overselling.
        Err(e) => {
            log::error!("Availability check failed for {}: {}", resource_id, e);
            return HttpResponse::InternalServerError().body("Failed to check availability");
        }
    };

    if !availability.is_available {
        // Expected business outcome, not a failure.
        return HttpResponse::Conflict().json(serde_json::json!({
            "error": "Resource is fully booked for the requested dates",
            "availability": availability,
        }));
    }

    let (total_price, itinerary_details) = match (&input.itinerary, input.booking_type) {
        (Some(request), BookingType::Tour) => {
            match ItineraryService::new(client.clone()).quote(request).await {
                Ok(quote) => (quote.total_price, Some(quote.itinerary)),
                Err(ItineraryError::Store(e)) => {
                    log::error!("Failed to resolve itinerary: {}", e);
                    return HttpResponse::InternalServerError().body("Failed to resolve itinerary");
                }
                Err(ItineraryError::UnknownLandmark(id)) => {
                    return HttpResponse::NotFound().body(format!("Unknown landmark: {}", id));
                }
                Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
            }
        }
        _ => (rental_price(&resource, &input), None),
    };

    let booking = Booking {
        id: None,
        resource_id,
        booking_type: input.booking_type,
        status: BookingStatus::Pending,
        start_date: window.start,
        end_date: window.end,
        total_price,
        user_id,
        user_name: input.user_name,
        user_email: input.user_email,
        itinerary_details,
        created_at: bson::DateTime::now(),
    };

    let collection: mongodb::Collection<Booking> = client
        .database(&db_name())
        .collection(BOOKINGS_COLLECTION);
    match collection.insert_one(&booking).await {
        Ok(result) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "booking_id": result.inserted_id.as_object_id().map(|id| id.to_hex()),
            "status": "pending",
            "total_price": total_price,
        })),
        Err(e) => {
            log::error!("Failed to create booking: {}", e);
            HttpResponse::InternalServerError().body("Failed to create booking")
        }
    }
}

/// Vehicles bill per inclusive rental day; tour slots without a custom
/// itinerary bill the slot's unit price.
fn rental_price(resource: &Resource, input: &CreateBookingInput) -> i64 {
    match input.booking_type {
        BookingType::Vehicle => {
            let seconds = (input.end_date - input.start_date).num_seconds();
            let days = (seconds + 86_399) / 86_400;
            resource.price_per_unit * days.max(1)
        }
        BookingType::Tour => resource.price_per_unit,
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    pub status: BookingStatus,
}

/*
    PUT /api/bookings/{id}/status
*/
pub async fn update_booking_status(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<StatusUpdateInput>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let next = input.into_inner().status;

    let booking_id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID"),
    };

    let collection: mongodb::Collection<Booking> = client
        .database(&db_name())
        .collection(BOOKINGS_COLLECTION);

    let booking = match collection.find_one(doc! { "_id": booking_id }).await {
        Ok(Some(booking)) => booking,
        Ok(None) => return HttpResponse::NotFound().body("Booking not found"),
        Err(e) => {
            log::error!("Failed to fetch booking {}: {}", booking_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch booking");
        }
    };

    if !booking.status.can_transition_to(next) {
        return HttpResponse::Conflict().body(format!(
            "Cannot transition booking from {} to {}",
            booking.status.as_str(),
            next.as_str()
        ));
    }

    let update = doc! { "$set": { "status": next.as_str() } };
    match collection.update_one(doc! { "_id": booking_id }, update).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "status": next.as_str(),
        })),
        Err(e) => {
            log::error!("Failed to update booking {}: {}", booking_id, e);
            HttpResponse::InternalServerError().body("Failed to update booking")
        }
    }
}
