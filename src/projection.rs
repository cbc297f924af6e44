//! Geodesic projection on a spherical Earth
use nalgebra::Vector2;

/// Earth mean radius [km]
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic point in decimal degrees
#[derive(Debug, Default, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Longitude [ddeg]
    pub longitude: f64,
    /// Latitude [ddeg]
    pub latitude: f64,
}

impl GeoPoint {
    /// Builds new [GeoPoint] from (longitude, latitude) in decimal degrees
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
    /// Planar (longitude, latitude) vector
    pub(crate) fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.longitude, self.latitude)
    }
    pub(crate) fn from_vector(v: Vector2<f64>) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Projects `start` along `bearing_deg` (clockwise from north) over
/// `distance_km`, using the closed form direct solution on a sphere of
/// radius `earth_radius_km`.
/// Engine users never call this with their own distance: the ray length
/// is [Config](crate::prelude::Config) wide.
pub fn project(
    start: GeoPoint,
    bearing_deg: f64,
    distance_km: f64,
    earth_radius_km: f64,
) -> GeoPoint {
    let phi1 = start.latitude.to_radians();
    let lambda1 = start.longitude.to_radians();
    let theta = bearing_deg.rem_euclid(360.0).to_radians();
    let delta = distance_km / earth_radius_km;

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let phi2 = (sin_phi1 * cos_delta + cos_phi1 * sin_delta * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * sin_delta * cos_phi1).atan2(cos_delta - sin_phi1 * phi2.sin());

    GeoPoint::new(lambda2.to_degrees(), phi2.to_degrees())
}

/// Great circle (haversine) distance between two points [km]
pub fn distance_km(a: GeoPoint, b: GeoPoint, earth_radius_km: f64) -> f64 {
    let (phi1, phi2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * earth_radius_km * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod test {
    use super::{distance_km, project, GeoPoint, EARTH_RADIUS_KM};
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0, 1.0)]
    #[case(90.0, 1.0, 0.0)]
    #[case(180.0, 0.0, -1.0)]
    #[case(270.0, -1.0, 0.0)]
    #[case(360.0, 0.0, 1.0)]
    fn cardinal_bearings(#[case] bearing: f64, #[case] dlon: f64, #[case] dlat: f64) {
        let end = project(GeoPoint::default(), bearing, 25.0, EARTH_RADIUS_KM);
        let deg = 25.0 / EARTH_RADIUS_KM * 180.0 / std::f64::consts::PI;
        assert!(
            (end.longitude - dlon * deg).abs() < 1.0E-9,
            "bearing {}: longitude {}",
            bearing,
            end.longitude
        );
        assert!(
            (end.latitude - dlat * deg).abs() < 1.0E-9,
            "bearing {}: latitude {}",
            bearing,
            end.latitude
        );
    }

    #[test]
    fn projected_distance() {
        let mut rng = SmallRng::seed_from_u64(0x41524446);
        for _ in 0..1000 {
            let start = GeoPoint::new(
                rng.random_range(-180.0..180.0),
                rng.random_range(-80.0..80.0),
            );
            let bearing = rng.random_range(0.0..=360.0);
            let distance = rng.random_range(0.1..500.0);
            let end = project(start, bearing, distance, EARTH_RADIUS_KM);
            let err = (distance_km(start, end, EARTH_RADIUS_KM) - distance).abs();
            assert!(
                err < 1.0E-6,
                "{:?} bearing={} d={}: distance error too large {}",
                start,
                bearing,
                distance,
                err
            );
        }
    }

    #[test]
    fn deterministic() {
        let start = GeoPoint::new(5.123456, 52.654321);
        for bearing in [0.0, 13.5, 90.0, 211.25, 359.999] {
            let a = project(start, bearing, 25.0, EARTH_RADIUS_KM);
            let b = project(start, bearing, 25.0, EARTH_RADIUS_KM);
            assert_eq!(a.longitude.to_bits(), b.longitude.to_bits());
            assert_eq!(a.latitude.to_bits(), b.latitude.to_bits());
        }
    }

    #[test]
    fn haversine() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((distance_km(a, b, EARTH_RADIUS_KM) - expected).abs() < 1.0E-9);
        assert_eq!(distance_km(a, a, EARTH_RADIUS_KM), 0.0);
    }
}
