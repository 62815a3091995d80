use actix_web::{test, web, App};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use roamio_api::routes;

/// The driver connects lazily, so handlers that reject input before touching
/// the store run fine without a MongoDB instance.
async fn offline_client() -> Arc<Client> {
    Arc::new(
        Client::with_uri_str("mongodb://localhost:27017")
            .await
            .expect("parse mongodb uri"),
    )
}

macro_rules! test_app {
    ($client:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($client))
                .route("/health", web::get().to(routes::health::health_check))
                .route("/api/bookings", web::get().to(routes::bookings::list_bookings))
                .route("/api/bookings", web::post().to(routes::bookings::create_booking))
                .route(
                    "/api/bookings/{id}/status",
                    web::put().to(routes::bookings::update_booking_status),
                )
                .route(
                    "/api/availability/check",
                    web::post().to(routes::availability::check_availability),
                )
                .route(
                    "/api/itineraries/quote",
                    web::post().to(routes::itinerary::quote_itinerary),
                )
                .route(
                    "/api/itineraries/quote-day",
                    web::post().to(routes::itinerary::quote_single_day),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "OK");
}

#[actix_web::test]
async fn test_list_bookings_rejects_bad_cursor() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::get()
        .uri("/api/bookings?cursor=not-a-cursor")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_list_bookings_rejects_bad_user_id() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::get()
        .uri("/api/bookings?user_id=zzz")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_booking_rejects_bad_resource_id() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(json!({
            "resource_id": "not-an-id",
            "booking_type": "vehicle",
            "start_date": "2026-08-10T10:00:00Z",
            "end_date": "2026-08-12T10:00:00Z",
            "user_id": "665f1f77bcf86cd799439011",
            "user_name": "Asha Rao",
            "user_email": "asha@example.com",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_booking_rejects_inverted_window() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(json!({
            "resource_id": "665f1f77bcf86cd799439012",
            "booking_type": "vehicle",
            "start_date": "2026-08-12T10:00:00Z",
            "end_date": "2026-08-10T10:00:00Z",
            "user_id": "665f1f77bcf86cd799439011",
            "user_name": "Asha Rao",
            "user_email": "asha@example.com",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_status_update_rejects_bad_booking_id() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::put()
        .uri("/api/bookings/garbage/status")
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_availability_check_rejects_inverted_window() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::post()
        .uri("/api/availability/check")
        .set_json(json!({
            "resource_id": "665f1f77bcf86cd799439012",
            "booking_type": "tour",
            "start_date": "2026-08-12T10:00:00Z",
            "end_date": "2026-08-10T10:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_quote_rejects_day_count_mismatch() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/quote")
        .set_json(json!({
            "duration": "2-days",
            "days": [{ "day": 1, "stops": [] }],
            "is_full_package": false,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_quote_empty_day_bills_base_rate() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/quote")
        .set_json(json!({
            "duration": "1-day",
            "days": [{ "day": 1, "stops": [] }],
            "is_full_package": false,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_price"], 2000);
    assert_eq!(body["full_package_suggested"], false);
    assert_eq!(body["itinerary"]["days"][0]["total_time"], 0);
}

#[actix_web::test]
async fn test_single_day_quote_ignores_claimed_total_time() {
    let app = test_app!(offline_client().await);

    // A client claiming 600 minutes with no stops still bills the base
    // rate: totals are recomputed from the catalog, never trusted.
    let req = test::TestRequest::post()
        .uri("/api/itineraries/quote-day")
        .set_json(json!({
            "stops": [],
            "total_time": 600,
            "is_full_package": false,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_price"], 2000);
    assert_eq!(body["itinerary"]["days"][0]["total_time"], 0);
}

#[actix_web::test]
async fn test_quote_two_day_package_is_flat() {
    let app = test_app!(offline_client().await);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/quote")
        .set_json(json!({
            "duration": "2-days",
            "days": [
                { "day": 1, "stops": [] },
                { "day": 2, "stops": [] },
            ],
            "is_full_package": true,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total_price"], 7000);
    assert_eq!(body["breakdown"]["two_day_package"], true);
}
