//! Projected polylines.
//!
//! Vertices beyond the clip angle lift the pen. Edges that cross the limb
//! are cut where they meet it so outlines end on the sphere's rim instead
//! of stopping short at the last visible vertex.

use foundation::math::{LonLat, Orthographic, Projected};
use formats::{LandGeometry, Ring};

use crate::Surface;

/// Appends an open polyline to the current path. Returns the number of line
/// segments emitted.
pub fn trace_line<S: Surface + ?Sized>(
    surface: &mut S,
    projection: &Orthographic,
    points: &[LonLat],
) -> usize {
    let mut segments = 0;
    let mut prev = None;

    for &p in points {
        let v = projection.view_vector(p);
        let visible = projection.is_visible_depth(v.x);

        match prev {
            Some((pv, was_visible)) if was_visible != visible => {
                let limb = projection.clip_crossing(pv, v);
                if visible {
                    let s = projection.screen_from_view(v);
                    match limb {
                        Some(limb) => {
                            surface.move_to(limb.x, limb.y);
                            surface.line_to(s.x, s.y);
                            segments += 1;
                        }
                        None => surface.move_to(s.x, s.y),
                    }
                } else if let Some(limb) = limb {
                    surface.line_to(limb.x, limb.y);
                    segments += 1;
                }
            }
            Some((_, true)) => {
                let Projected { x, y, .. } = projection.screen_from_view(v);
                surface.line_to(x, y);
                segments += 1;
            }
            None if visible => {
                let Projected { x, y, .. } = projection.screen_from_view(v);
                surface.move_to(x, y);
            }
            _ => {}
        }
        prev = Some((v, visible));
    }
    segments
}

/// Appends a closed ring to the current path.
pub fn trace_ring<S: Surface + ?Sized>(
    surface: &mut S,
    projection: &Orthographic,
    ring: &Ring,
) -> usize {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => {
            let mut closed = Vec::with_capacity(ring.len() + 1);
            closed.extend_from_slice(ring);
            closed.push(*first);
            trace_line(surface, projection, &closed)
        }
        _ => trace_line(surface, projection, ring),
    }
}

/// Appends every ring of a land geometry. Unsupported geometry draws
/// nothing.
pub fn trace_geometry<S: Surface + ?Sized>(
    surface: &mut S,
    projection: &Orthographic,
    geometry: &LandGeometry,
) -> usize {
    match geometry {
        LandGeometry::Polygon(_) | LandGeometry::MultiPolygon(_) => geometry
            .rings()
            .into_iter()
            .map(|ring| trace_ring(surface, projection, ring))
            .sum(),
        LandGeometry::Unsupported { .. } => 0,
    }
}

#[cfg(test)]
mod tests {
    use foundation::math::{LonLat, Orthographic};
    use formats::LandGeometry;
    use serde_json::Value;

    use super::{trace_geometry, trace_line, trace_ring};
    use crate::{DrawOp, RecordingSurface};

    fn projection() -> Orthographic {
        Orthographic::new(100.0, [100.0, 100.0], 90.0)
    }

    fn moves(surface: &RecordingSurface) -> usize {
        surface.count(|op| matches!(op, DrawOp::MoveTo(..)))
    }

    #[test]
    fn visible_line_is_one_stroke() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        let line = [LonLat::new(-10.0, 0.0), LonLat::new(0.0, 0.0), LonLat::new(10.0, 0.0)];
        assert_eq!(trace_line(&mut surface, &projection(), &line), 2);
        assert_eq!(moves(&surface), 1);
    }

    #[test]
    fn hidden_line_draws_nothing() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        let line = [LonLat::new(150.0, 0.0), LonLat::new(170.0, 0.0)];
        assert_eq!(trace_line(&mut surface, &projection(), &line), 0);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn line_crossing_the_limb_ends_on_the_rim() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        let line = [LonLat::new(80.0, 0.0), LonLat::new(100.0, 0.0)];
        assert_eq!(trace_line(&mut surface, &projection(), &line), 1);

        let Some(DrawOp::LineTo(x, y)) = surface.ops.last().cloned() else {
            panic!("expected a line to the limb, got {:?}", surface.ops);
        };
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn pen_lifts_across_the_far_side() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        // Out over the eastern limb, round the back, and in over the western one.
        let line = [
            LonLat::new(60.0, 0.0),
            LonLat::new(120.0, 0.0),
            LonLat::new(180.0, 0.0),
            LonLat::new(240.0, 0.0),
            LonLat::new(300.0, 0.0),
        ];
        trace_line(&mut surface, &projection(), &line);
        assert_eq!(moves(&surface), 2);
    }

    #[test]
    fn rings_are_closed() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        let ring = vec![LonLat::new(0.0, 0.0), LonLat::new(10.0, 0.0), LonLat::new(10.0, 10.0)];
        assert_eq!(trace_ring(&mut surface, &projection(), &ring), 3);
    }

    #[test]
    fn unsupported_geometry_is_skipped() {
        let mut surface = RecordingSurface::new(200.0, 200.0);
        let geometry = LandGeometry::Unsupported {
            kind: "LineString".into(),
            raw: Value::Null,
        };
        assert_eq!(trace_geometry(&mut surface, &projection(), &geometry), 0);
        assert!(surface.ops.is_empty());
    }
}
