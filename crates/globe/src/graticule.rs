use foundation::math::LonLat;

pub const GRATICULE_STEP_DEG: f64 = 10.0;
pub const GRATICULE_PRECISION_DEG: f64 = 2.5;
/// Parallels stop short of the poles, where they collapse to points.
pub const GRATICULE_MAX_PARALLEL_DEG: f64 = 80.0;

/// Meridians then parallels, each as a densified polyline.
pub fn graticule_lines() -> Vec<Vec<LonLat>> {
    let mut lines = Vec::new();

    let meridians = (360.0 / GRATICULE_STEP_DEG) as usize;
    let meridian_samples = (180.0 / GRATICULE_PRECISION_DEG) as usize;
    for i in 0..meridians {
        let lon = -180.0 + i as f64 * GRATICULE_STEP_DEG;
        lines.push(
            (0..=meridian_samples)
                .map(|j| LonLat::new(lon, -90.0 + j as f64 * GRATICULE_PRECISION_DEG))
                .collect(),
        );
    }

    let parallels = (2.0 * GRATICULE_MAX_PARALLEL_DEG / GRATICULE_STEP_DEG) as usize;
    let parallel_samples = (360.0 / GRATICULE_PRECISION_DEG) as usize;
    for i in 0..=parallels {
        let lat = -GRATICULE_MAX_PARALLEL_DEG + i as f64 * GRATICULE_STEP_DEG;
        lines.push(
            (0..=parallel_samples)
                .map(|j| LonLat::new(-180.0 + j as f64 * GRATICULE_PRECISION_DEG, lat))
                .collect(),
        );
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::graticule_lines;

    #[test]
    fn has_every_meridian_and_parallel() {
        let lines = graticule_lines();
        // 36 meridians, 17 parallels from -80 to 80.
        assert_eq!(lines.len(), 36 + 17);

        let meridian = &lines[0];
        assert_eq!(meridian.len(), 73);
        assert_eq!(meridian[0].lat_deg, -90.0);
        assert_eq!(meridian[72].lat_deg, 90.0);

        let equator = &lines[36 + 8];
        assert_eq!(equator[0].lat_deg, 0.0);
        assert_eq!(equator.len(), 145);
        assert_eq!(equator[144].lon_deg, 180.0);
    }
}
