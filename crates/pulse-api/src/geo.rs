/// Great-circle distance helpers for nearby queries.
///
/// SQLite has no geospatial index, so nearby lookups run in two steps: a
/// bounding-box prefilter in SQL on the (latitude, longitude) index, then a
/// haversine refine here to drop corner results, sort ascending, and cap.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Nearby result lists are truncated to this many entries.
pub const MAX_NEARBY_RESULTS: usize = 50;

pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// (min_lat, max_lat, min_lng, max_lng) box that encloses the radius circle.
/// The longitude span widens with latitude; near the poles it degenerates to
/// the full range rather than dividing by ~0. A span that would cross the
/// antimeridian also widens to the full range, since a single min..max pair
/// cannot express a wrapped interval; the haversine refine drops the excess.
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_delta = (radius_km / EARTH_RADIUS_KM).to_degrees();

    let cos_lat = lat.to_radians().cos();
    let lng_delta = if cos_lat.abs() < 1e-6 {
        180.0
    } else {
        lat_delta / cos_lat
    };

    let (min_lng, max_lng) = if lng - lng_delta < -180.0 || lng + lng_delta > 180.0 {
        (-180.0, 180.0)
    } else {
        (lng - lng_delta, lng + lng_delta)
    };

    (
        (lat - lat_delta).max(-90.0),
        (lat + lat_delta).min(90.0),
        min_lng,
        max_lng,
    )
}

/// Refine a candidate set against the query point: keep entries within
/// `radius_km`, sort ascending by distance, truncate to the result cap.
pub fn rank_within<T>(
    items: Vec<T>,
    lat: f64,
    lng: f64,
    radius_km: f64,
    coords: impl Fn(&T) -> (f64, f64),
) -> Vec<(T, f64)> {
    let mut ranked: Vec<(T, f64)> = items
        .into_iter()
        .map(|item| {
            let (item_lat, item_lng) = coords(&item);
            let d = haversine_km(lat, lng, item_lat, item_lng);
            (item, d)
        })
        .filter(|(_, d)| *d <= radius_km)
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(MAX_NEARBY_RESULTS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distances() {
        // Tunis -> Sousse is roughly 115 km as the crow flies
        let d = haversine_km(36.8065, 10.1815, 35.8256, 10.6369);
        assert!((d - 115.0).abs() < 5.0, "got {}", d);

        // zero distance to self
        assert!(haversine_km(36.8, 10.18, 36.8, 10.18) < 1e-9);

        // antipodal-ish sanity: half circumference is ~20015 km
        let half = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!((half - 20015.0).abs() < 10.0, "got {}", half);
    }

    #[test]
    fn test_bounding_box_encloses_radius() {
        let (min_lat, max_lat, min_lng, max_lng) = bounding_box(36.8, 10.18, 10.0);
        // every point within 10 km must fall inside the box
        for bearing_deg in [0, 45, 90, 135, 180, 225, 270, 315] {
            let b = (bearing_deg as f64).to_radians();
            let lat = 36.8 + (10.0 / EARTH_RADIUS_KM).to_degrees() * b.cos();
            let lng = 10.18
                + (10.0 / EARTH_RADIUS_KM).to_degrees() * b.sin() / 36.8f64.to_radians().cos();
            assert!(lat >= min_lat && lat <= max_lat);
            assert!(lng >= min_lng && lng <= max_lng);
        }
    }

    #[test]
    fn test_bounding_box_spans_antimeridian() {
        // a circle straddling the 180th meridian cannot be expressed as one
        // longitude interval; the box must widen so the far side stays visible
        let (_, _, min_lng, max_lng) = bounding_box(0.0, 179.9, 50.0);
        assert_eq!((min_lng, max_lng), (-180.0, 180.0));

        // the point just across the line is inside both the radius and the box
        let d = haversine_km(0.0, 179.9, 0.0, -179.9);
        assert!(d < 50.0, "got {}", d);
        assert!(-179.9 >= min_lng && -179.9 <= max_lng);

        // a box away from the line stays tight
        let (_, _, min_lng, max_lng) = bounding_box(36.8, 10.18, 10.0);
        assert!(max_lng - min_lng < 1.0);
    }

    #[test]
    fn test_rank_within_filters_sorts_and_caps() {
        // points at increasing distance along the equator; ~111 km per degree
        let points: Vec<(f64, f64)> = (0..60).map(|i| (0.0, i as f64 * 0.01)).collect();

        let ranked = rank_within(points, 0.0, 0.0, 30.0, |p| (p.0, p.1));

        // within 30 km: offsets 0.00 .. 0.27 degrees (28 points), under the cap
        assert!(ranked.len() < MAX_NEARBY_RESULTS);
        assert!(ranked.iter().all(|(_, d)| *d <= 30.0));
        for pair in ranked.windows(2) {
            assert!(pair[0].1 <= pair[1].1, "not sorted ascending");
        }

        // with a huge radius the cap applies
        let points: Vec<(f64, f64)> = (0..60).map(|i| (0.0, i as f64 * 0.01)).collect();
        let ranked = rank_within(points, 0.0, 0.0, 1000.0, |p| (p.0, p.1));
        assert_eq!(ranked.len(), MAX_NEARBY_RESULTS);
    }
}
