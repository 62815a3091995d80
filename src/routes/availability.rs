use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::mongo::db_name;
use crate::models::booking::BookingType;
use crate::models::resource::Resource;
use crate::routes::bson_datetime;
use crate::services::availability_service::{AvailabilityService, BookingWindow, CountingMode};

#[derive(Debug, Deserialize)]
pub struct AvailabilityCheckInput {
    pub resource_id: String,
    pub booking_type: BookingType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Defaults to admission control: pending bookings hold capacity.
    pub counting_mode: Option<CountingMode>,
}

/*
    POST /api/availability/check
*/
pub async fn check_availability(
    data: web::Data<Arc<Client>>,
    input: web::Json<AvailabilityCheckInput>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let input = input.into_inner();

    let resource_id = match ObjectId::parse_str(&input.resource_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid resource ID"),
    };
    if input.end_date < input.start_date {
        return HttpResponse::BadRequest().body("end_date must not precede start_date");
    }

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
    let mode = input.counting_mode.unwrap_or(CountingMode::ConfirmedAndPending);

    match AvailabilityService::new(client)
        .resource_availability(resource_id, &window, resource.stock_count, mode)
        .await
    {
        Ok(availability) => HttpResponse::Ok().json(serde_json::json!({
            "resource_id": resource_id.to_hex(),
            "stock_count": resource.stock_count,
            "booked_count": availability.booked_count,
            "available_count": availability.available_count,
            "is_available": availability.is_available,
        })),
        Err(e) => {
            log::error!("Availability check failed for {}: {}", resource_id, e);
            HttpResponse::InternalServerError().body("Failed to check availability")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FleetAvailabilityInput {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/*
    POST /api/availability/fleet

    Dashboard view over the whole vehicle catalog: confirmed bookings only,
    one booking scan regardless of fleet size.
*/
pub async fn fleet_availability(
    data: web::Data<Arc<Client>>,
    input: web::Json<FleetAvailabilityInput>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let input = input.into_inner();

    if input.end_date < input.start_date {
        return HttpResponse::BadRequest().body("end_date must not precede start_date");
    }

    let vehicles_collection: mongodb::Collection<Resource> = client
        .database(&db_name())
        .collection(Resource::collection_name(BookingType::Vehicle));
    let vehicles: Vec<Resource> = match vehicles_collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect().await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                log::error!("Failed to collect vehicles: {}", e);
                return HttpResponse::InternalServerError().body("Failed to fetch vehicles");
            }
        },
        Err(e) => {
            log::error!("Failed to fetch vehicles: {}", e);
            return HttpResponse::InternalServerError().body("Failed to fetch vehicles");
        }
    };

    let window = BookingWindow {
        start: bson_datetime(input.start_date),
        end: bson_datetime(input.end_date),
    };
    let resources: Vec<(ObjectId, u32)> = vehicles
        .iter()
        .filter_map(|v| v.id.map(|id| (id, v.stock_count)))
        .collect();

    let availability = match AvailabilityService::new(client)
        .fleet_availability(&resources, &window)
        .await
    {
        Ok(availability) => availability,
        Err(e) => {
            log::error!("Fleet availability scan failed: {}", e);
            return HttpResponse::InternalServerError().body("Failed to check availability");
        }
    };

    let report: Vec<serde_json::Value> = vehicles
        .iter()
        .filter_map(|v| {
            let id = v.id?;
            let entry = availability.get(&id)?;
            Some(serde_json::json!({
                "resource_id": id.to_hex(),
                "name": v.name,
                "stock_count": v.stock_count,
                "booked_count": entry.booked_count,
                "available_count": entry.available_count,
                "is_available": entry.is_available,
            }))
        })
        .collect();

    HttpResponse::Ok().json(report)
}
