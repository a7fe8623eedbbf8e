use foundation::LonLatBounds;
use foundation::math::LonLat;
use formats::{LandFeature, LandGeometry, Ring};

/// Even-odd ray casting against a single ring, treating lon/lat as planar x/y.
///
/// Points exactly on an edge may land on either side.
pub fn point_in_ring(p: LonLat, ring: &[LonLat]) -> bool {
    let (x, y) = (p.lon_deg, p.lat_deg);
    let mut inside = false;
    let mut j = match ring.len() {
        0 => return false,
        n => n - 1,
    };
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lon_deg, ring[i].lat_deg);
        let (xj, yj) = (ring[j].lon_deg, ring[j].lat_deg);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside ring 0 and outside every later ring.
pub fn point_in_polygon(p: LonLat, rings: &[Ring]) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(p, outer) && !holes.iter().any(|hole| point_in_ring(p, hole))
}

/// Point-in-area test over the geometry kinds a land feature can carry.
pub trait Containment {
    fn contains(&self, p: LonLat) -> bool;
}

impl Containment for LandGeometry {
    fn contains(&self, p: LonLat) -> bool {
        match self {
            LandGeometry::Polygon(rings) => point_in_polygon(p, rings),
            LandGeometry::MultiPolygon(polys) => polys.iter().any(|rings| point_in_polygon(p, rings)),
            LandGeometry::Unsupported { .. } => false,
        }
    }
}

impl Containment for LandFeature {
    fn contains(&self, p: LonLat) -> bool {
        self.geometry.contains(p)
    }
}

/// Planar bounding box over every vertex of the feature, holes included.
/// `None` for unsupported or empty geometry.
pub fn feature_bounds(feature: &LandFeature) -> Option<LonLatBounds> {
    LonLatBounds::from_points(feature.geometry.rings().into_iter().flatten())
}
