/// Mean Earth radius in meters (spherical approximation)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters via the haversine formula.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_m(13.7563, 100.5018, 13.7563, 100.5018), 0.0);
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        // 2 * pi * R / 360 ~ 111,195 m
        let d = haversine_m(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn test_symmetry() {
        let a = haversine_m(10.0, 20.0, 10.0005, 20.0004);
        let b = haversine_m(10.0005, 20.0004, 10.0, 20.0);
        assert!((a - b).abs() < 1e-9);
    }
}
