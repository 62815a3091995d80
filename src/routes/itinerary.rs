use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use std::sync::Arc;

use crate::models::itinerary::Itinerary;
use crate::services::itinerary_service::{ItineraryError, ItineraryRequest, ItineraryService};

fn quote_error_response(e: ItineraryError) -> HttpResponse {
    match e {
        ItineraryError::UnknownLandmark(id) => {
            HttpResponse::NotFound().body(format!("Unknown landmark: {}", id))
        }
        ItineraryError::Store(e) => {
            log::error!("Failed to quote itinerary: {}", e);
            HttpResponse::InternalServerError().body("Failed to quote itinerary")
        }
        e => HttpResponse::BadRequest().body(e.to_string()),
    }
}

/*
    POST /api/itineraries/quote

    Resolves a customer-assembled itinerary against the landmark catalog,
    recomputes visit and travel time, and prices it. The display layer only
    renders the returned breakdown; it never computes a price itself.
*/
pub async fn quote_itinerary(
    data: web::Data<Arc<Client>>,
    input: web::Json<ItineraryRequest>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let request = input.into_inner();

    match ItineraryService::new(client).quote(&request).await {
        Ok(quote) => HttpResponse::Ok().json(quote),
        Err(e) => quote_error_response(e),
    }
}

/*
    POST /api/itineraries/quote-day

    Single-day variant used by the day-trip builder. Any total_time the
    client sends along is recomputed, never trusted.
*/
pub async fn quote_single_day(
    data: web::Data<Arc<Client>>,
    input: web::Json<Itinerary>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let itinerary = input.into_inner();

    match ItineraryService::new(client).quote_single_day(&itinerary).await {
        Ok(quote) => HttpResponse::Ok().json(quote),
        Err(e) => quote_error_response(e),
    }
}
