pub mod availability_service;
pub mod booking_query_service;
pub mod geo_service;
pub mod itinerary_service;
pub mod pricing_service;
