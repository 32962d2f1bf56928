use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (and of longitude at the equator)
const KM_PER_DEGREE: f64 = 111.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// Symmetric, and exactly `0.0` for identical points. Inputs are trusted
/// to be valid coordinates.
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Great-circle distance in kilometers, unrounded
#[inline]
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to one decimal place for display
#[inline]
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 10.0).round() / 10.0
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine and always over-inclusive, so index-backed
/// sources can use it as a pre-filter.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude).
/// Near the poles, or when the box would wrap the antimeridian, the
/// longitude range widens to the full [-180, 180].
pub fn calculate_bounding_box(center: GeoPoint, radius_km: f64) -> BoundingBox {
    let radius_km = radius_km.max(0.0);
    let lat_delta = radius_km / KM_PER_DEGREE;

    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let cos_lat = center.latitude.to_radians().cos().abs();
    let touches_pole = min_lat <= -90.0 || max_lat >= 90.0 || cos_lat < 1e-6;

    let (min_lon, max_lon) = if touches_pole {
        (-180.0, 180.0)
    } else {
        let lon_delta = radius_km / (KM_PER_DEGREE * cos_lat);
        let min_lon = center.longitude - lon_delta;
        let max_lon = center.longitude + lon_delta;
        if min_lon < -180.0 || max_lon > 180.0 {
            (-180.0, 180.0)
        } else {
            (min_lon, max_lon)
        }
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: GeoPoint, bbox: &BoundingBox) -> bool {
    point.latitude >= bbox.min_lat
        && point.latitude <= bbox.max_lat
        && point.longitude >= bbox.min_lon
        && point.longitude <= bbox.max_lon
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: GeoPoint = GeoPoint::new(51.5074, -0.1278);
    const PARIS: GeoPoint = GeoPoint::new(48.8566, 2.3522);
    const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);

    #[test]
    fn test_haversine_distance() {
        let distance = haversine_distance(LONDON, PARIS);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        assert_eq!(haversine_distance(LONDON, PARIS), haversine_distance(PARIS, LONDON));
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine_distance(NEW_YORK, NEW_YORK), 0.0);
    }

    #[test]
    fn test_round_km() {
        assert_eq!(round_km(2.8749), 2.9);
        assert_eq!(round_km(13.94), 13.9);
        assert_eq!(round_km(0.0), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(NEW_YORK, 10.0);

        assert!(bbox.min_lat < NEW_YORK.latitude);
        assert!(bbox.max_lat > NEW_YORK.latitude);
        assert!(bbox.min_lon < NEW_YORK.longitude);
        assert!(bbox.max_lon > NEW_YORK.longitude);

        // 20km / 111km per degree = ~0.18 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_bounding_box_near_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(GeoPoint::new(89.9, 10.0), 50.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
    }

    #[test]
    fn test_bounding_box_across_antimeridian() {
        let bbox = calculate_bounding_box(GeoPoint::new(0.0, 179.95), 20.0);
        assert!(is_within_bounding_box(GeoPoint::new(0.0, -179.95), &bbox));
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(NEW_YORK, 10.0);

        assert!(is_within_bounding_box(NEW_YORK, &bbox));
        assert!(is_within_bounding_box(GeoPoint::new(40.71, -74.0), &bbox));
        assert!(!is_within_bounding_box(GeoPoint::new(50.0, -80.0), &bbox));
    }
}
