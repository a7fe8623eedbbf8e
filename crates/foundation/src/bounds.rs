use crate::math::LonLat;

/// Axis-aligned longitude/latitude bounding box (degrees).
///
/// This is a planar box in coordinate space; it does not try to handle rings
/// that cross the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LonLatBounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl LonLatBounds {
    pub fn new(min: LonLat, max: LonLat) -> Self {
        LonLatBounds { min, max }
    }

    /// Bounds of a point set, or `None` when it is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LonLat>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = LonLatBounds::new(first, first);
        for p in iter {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LonLat) {
        self.min.lon_deg = self.min.lon_deg.min(p.lon_deg);
        self.min.lat_deg = self.min.lat_deg.min(p.lat_deg);
        self.max.lon_deg = self.max.lon_deg.max(p.lon_deg);
        self.max.lat_deg = self.max.lat_deg.max(p.lat_deg);
    }
}

#[cfg(test)]
mod tests {
    use super::LonLatBounds;
    use crate::math::LonLat;

    #[test]
    fn bounds_of_points() {
        let pts = [
            LonLat::new(10.0, -5.0),
            LonLat::new(-20.0, 7.5),
            LonLat::new(3.0, 40.0),
        ];
        let b = LonLatBounds::from_points(&pts).unwrap();
        assert_eq!(b.min, LonLat::new(-20.0, -5.0));
        assert_eq!(b.max, LonLat::new(10.0, 40.0));
    }

    #[test]
    fn empty_points_have_no_bounds() {
        let pts: [LonLat; 0] = [];
        assert!(LonLatBounds::from_points(&pts).is_none());
    }
}
