pub mod booking;
pub mod itinerary;
pub mod landmark;
pub mod resource;
