use crate::models::landmark::Landmark;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed travel time between any two consecutive stops, in minutes.
/// Distances between city landmarks are short enough that a flat hop beats
/// a live traffic lookup; pricing depends on this exact value.
pub const TRAVEL_UNIT_MINUTES: u32 = 20;

pub struct GeoService;

impl GeoService {
    /// Great-circle distance between two coordinates (decimal degrees)
    /// using the Haversine formula. Inputs are not range-checked; the
    /// catalog validates coordinates on write.
    pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lon = (lon2 - lon1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Travel time between consecutive stops. Deliberately a constant: see
    /// `TRAVEL_UNIT_MINUTES`.
    pub fn estimate_travel_time_minutes(_distance_km: f64) -> u32 {
        TRAVEL_UNIT_MINUTES
    }

    /// Total itinerary time in minutes for landmarks in visiting order:
    /// on-site durations plus one estimated travel hop between each
    /// consecutive pair, i.e. Σ durations + 20 × (count − 1).
    pub fn total_time(landmarks: &[Landmark]) -> u32 {
        if landmarks.is_empty() {
            return 0;
        }

        let visit_minutes: u32 = landmarks.iter().map(|l| l.estimated_duration).sum();
        let travel_minutes: u32 = landmarks
            .windows(2)
            .map(|pair| {
                let distance = Self::distance_km(
                    pair[0].location.lat,
                    pair[0].location.lng,
                    pair[1].location.lat,
                    pair[1].location.lng,
                );
                Self::estimate_travel_time_minutes(distance)
            })
            .sum();

        visit_minutes + travel_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmark::GeoPoint;

    fn landmark(duration: u32) -> Landmark {
        Landmark {
            id: None,
            name: "Test Landmark".to_string(),
            location: GeoPoint { lat: 0.0, lng: 0.0 },
            estimated_duration: duration,
            category: "heritage".to_string(),
            tour_type: "city".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_distance_known_pair() {
        // Jaipur city centre to Amer Fort is roughly 9.7 km as the crow flies.
        let d = GeoService::distance_km(26.9124, 75.7873, 26.9855, 75.8513);
        assert!((d - 10.3).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let d = GeoService::distance_km(26.9124, 75.7873, 26.9124, 75.7873);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ab = GeoService::distance_km(26.9, 75.8, 27.1, 76.0);
        let ba = GeoService::distance_km(27.1, 76.0, 26.9, 75.8);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_travel_time_is_flat() {
        assert_eq!(GeoService::estimate_travel_time_minutes(0.5), 20);
        assert_eq!(GeoService::estimate_travel_time_minutes(42.0), 20);
    }

    #[test]
    fn test_total_time_empty() {
        assert_eq!(GeoService::total_time(&[]), 0);
    }

    #[test]
    fn test_total_time_single_stop_has_no_travel() {
        assert_eq!(GeoService::total_time(&[landmark(45)]), 45);
    }

    #[test]
    fn test_total_time_adds_travel_between_stops() {
        let stops = [landmark(60), landmark(30), landmark(90)];
        // 180 on-site + 2 hops of 20.
        assert_eq!(GeoService::total_time(&stops), 220);
    }
}
