use serde::{Deserialize, Serialize};

use super::Vec3;

/// A position on the unit sphere in degrees.
///
/// Longitude comes first to match GeoJSON coordinate order.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Unit vector with x towards (0°, 0°), y towards (90°E, 0°) and z towards
    /// the north pole.
    pub fn to_unit_vector(self) -> Vec3 {
        let lon = self.lon_deg.to_radians();
        let lat = self.lat_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

#[cfg(test)]
mod tests {
    use super::LonLat;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_prime_meridian_is_x_axis() {
        let v = LonLat::new(0.0, 0.0).to_unit_vector();
        assert_close(v.x, 1.0, 1e-12);
        assert_close(v.y, 0.0, 1e-12);
        assert_close(v.z, 0.0, 1e-12);
    }

    #[test]
    fn north_pole_is_z_axis() {
        let v = LonLat::new(123.0, 90.0).to_unit_vector();
        assert_close(v.z, 1.0, 1e-12);
        assert_close(v.x.hypot(v.y), 0.0, 1e-12);
    }
}
