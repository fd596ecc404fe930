use geojson::{PolygonType, Position};

/// Even-odd ray casting against a single ring of `[lon, lat]` positions.
///
/// A horizontal ray is cast from the query point and every edge it crosses
/// toggles the result. Horizontal edges never count as crossings. Points lying
/// exactly on an edge or a vertex may be reported either way. Positions with
/// fewer than two coordinates are skipped.
pub fn ring_contains(ring: &[Position], lat: f64, lng: f64) -> bool {
    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|it| match it.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        })
        .collect();
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if yi != yj && (yi > lat) != (yj > lat) && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Polygon test with holes: the outer ring and every hole take part in the same
/// even-odd count, so a point inside a hole is outside the polygon.
pub fn polygon_contains(polygon: &PolygonType, lat: f64, lng: f64) -> bool {
    polygon
        .iter()
        .filter(|ring| ring_contains(ring, lat, lng))
        .count()
        % 2
        == 1
}

pub fn multi_polygon_contains(polygons: &[PolygonType], lat: f64, lng: f64) -> bool {
    polygons.iter().any(|it| polygon_contains(it, lat, lng))
}
