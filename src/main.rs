use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use roamio_api::{db, routes};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(web::Data::new(client.clone()))
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/bookings")
                            .route("", web::get().to(routes::bookings::list_bookings))
                            .route("", web::post().to(routes::bookings::create_booking))
                            .route(
                                "/{id}/status",
                                web::put().to(routes::bookings::update_booking_status),
                            ),
                    )
                    .service(
                        web::scope("/availability")
                            .route(
                                "/check",
                                web::post().to(routes::availability::check_availability),
                            )
                            .route(
                                "/fleet",
                                web::post().to(routes::availability::fleet_availability),
                            ),
                    )
                    .service(
                        web::scope("/itineraries")
                            .route("/quote", web::post().to(routes::itinerary::quote_itinerary))
                            .route(
                                "/quote-day",
                                web::post().to(routes::itinerary::quote_single_day),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
