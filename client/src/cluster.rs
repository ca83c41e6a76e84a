use std::collections::HashMap;

use floormap_shared::Location;

/// Below this scale marker density causes visual overlap, so nearby markers
/// merge into cluster bubbles. At or above it every location renders as its
/// own marker.
pub const CLUSTER_SCALE_THRESHOLD: f64 = 0.85;

/// Cluster radius in index pixels at tile extent, supercluster-style.
const CLUSTER_RADIUS_PX: f64 = 64.0;
const TILE_EXTENT: f64 = 256.0;
const MAX_ZOOM: f64 = 15.0;

/// What the render stage draws: either one location or an aggregate bubble.
/// A location never appears both as a singleton and inside a cluster within
/// one pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem {
    Marker(Location),
    Cluster(ClusterBubble),
}

impl RenderItem {
    /// Stable list key: the location id for markers, the synthetic id for
    /// clusters.
    pub fn key(&self) -> &str {
        match self {
            RenderItem::Marker(loc) => &loc.id,
            RenderItem::Cluster(c) => &c.id,
        }
    }
}

/// Ephemeral aggregate of nearby locations at one zoom level. Recomputed
/// fresh on every location-set or scale change, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBubble {
    /// Synthetic id derived from the zoom level and the seed point index.
    pub id: String,
    pub count: usize,
    /// Centroid in the same percentage space as `Location` coordinates.
    pub x: f64,
    pub y: f64,
    pub zoom: u32,
}

pub fn clustering_active(scale: f64) -> bool {
    scale < CLUSTER_SCALE_THRESHOLD
}

/// Derive the integer index zoom level from the viewport scale.
pub fn zoom_for_scale(scale: f64) -> u32 {
    if scale <= 0.0 {
        return 0;
    }
    (scale * 32.0).log2().clamp(0.0, MAX_ZOOM).floor() as u32
}

/// Spatial index over the location set, rebuilt in full whenever the set
/// changes. Queries per zoom level are cheap; the index itself only stores
/// unit-space projections.
pub struct ClusterIndex {
    points: Vec<(f64, f64)>,
}

impl ClusterIndex {
    /// Project percentage coordinates into unit space. Errors on non-finite
    /// coordinates; callers degrade to unclustered rendering on failure.
    pub fn build(locations: &[Location]) -> Result<Self, String> {
        let mut points = Vec::with_capacity(locations.len());
        for loc in locations {
            let (x, y) = (loc.x_pct(), loc.y_pct());
            if !x.is_finite() || !y.is_finite() {
                return Err(format!("non-finite coordinates on location {}", loc.id));
            }
            points.push((x / 100.0, y / 100.0));
        }
        Ok(Self { points })
    }

    /// Cluster membership at a zoom level, greedy over input order: each
    /// unassigned point seeds a group and absorbs all unassigned points
    /// within the zoom radius. Deterministic for a fixed input. The whole
    /// coordinate domain is queried; there is no viewport culling.
    pub fn items_at(&self, locations: &[Location], zoom: u32) -> Vec<RenderItem> {
        debug_assert_eq!(self.points.len(), locations.len());
        if self.points.len() != locations.len() {
            return markers(locations);
        }

        let radius = CLUSTER_RADIUS_PX / (TILE_EXTENT * f64::powi(2.0, zoom as i32));
        let radius_sq = radius * radius;

        // Bucket every point into a uniform grid with cell size == radius,
        // so all candidates within the radius of a seed sit in the 3x3
        // neighborhood of its cell.
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (idx, &(x, y)) in self.points.iter().enumerate() {
            grid.entry(cell_of(x, y, radius)).or_default().push(idx);
        }

        let mut assigned = vec![false; self.points.len()];
        let mut items = Vec::with_capacity(self.points.len());

        for seed in 0..self.points.len() {
            if assigned[seed] {
                continue;
            }
            assigned[seed] = true;
            let (sx, sy) = self.points[seed];
            let (cx, cy) = cell_of(sx, sy, radius);

            let mut members = vec![seed];
            for dy in -1..=1i64 {
                for dx in -1..=1i64 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    for &idx in bucket {
                        if assigned[idx] {
                            continue;
                        }
                        let (px, py) = self.points[idx];
                        let d2 = (px - sx) * (px - sx) + (py - sy) * (py - sy);
                        if d2 <= radius_sq {
                            assigned[idx] = true;
                            members.push(idx);
                        }
                    }
                }
            }
            members.sort_unstable();

            if members.len() == 1 {
                items.push(RenderItem::Marker(locations[seed].clone()));
            } else {
                let inv = 1.0 / members.len() as f64;
                let (mut mx, mut my) = (0.0, 0.0);
                for &idx in &members {
                    mx += self.points[idx].0;
                    my += self.points[idx].1;
                }
                items.push(RenderItem::Cluster(ClusterBubble {
                    id: format!("cluster-{zoom}-{seed}"),
                    count: members.len(),
                    x: mx * inv * 100.0,
                    y: my * inv * 100.0,
                    zoom,
                }));
            }
        }
        items
    }
}

fn cell_of(x: f64, y: f64, radius: f64) -> (i64, i64) {
    ((x / radius).floor() as i64, (y / radius).floor() as i64)
}

fn markers(locations: &[Location]) -> Vec<RenderItem> {
    locations
        .iter()
        .map(|loc| RenderItem::Marker(loc.clone()))
        .collect()
}

/// Clustering stage entry point: raw markers above the scale threshold, a
/// fresh index query below it. Any index failure degrades to one marker per
/// location so the render stage always receives a drawable list.
pub fn cluster_locations(locations: &[Location], scale: f64) -> Vec<RenderItem> {
    if !clustering_active(scale) {
        return markers(locations);
    }
    match ClusterIndex::build(locations) {
        Ok(index) => index.items_at(locations, zoom_for_scale(scale)),
        Err(_) => markers(locations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc_at(id: &str, x: f64, y: f64) -> Location {
        let mut loc: Location =
            serde_json::from_str(&format!(r#"{{"id":"{id}"}}"#)).unwrap();
        loc.place(x, y);
        loc
    }

    #[test]
    fn zoom_for_scale_mapping() {
        assert_eq!(zoom_for_scale(1.0), 5);
        assert_eq!(zoom_for_scale(0.5), 4);
        assert_eq!(zoom_for_scale(0.1), 1);
        assert_eq!(zoom_for_scale(0.001), 0);
        assert_eq!(zoom_for_scale(0.0), 0);
        assert_eq!(zoom_for_scale(10_000.0), 15);
    }

    #[test]
    fn full_scale_renders_one_marker_per_location_in_order() {
        let locations = vec![
            loc_at("a", 10.0, 10.0),
            loc_at("b", 10.1, 10.1),
            loc_at("c", 90.0, 90.0),
        ];
        let items = cluster_locations(&locations, 1.0);
        assert_eq!(items.len(), 3);
        for (item, loc) in items.iter().zip(&locations) {
            match item {
                RenderItem::Marker(m) => assert_eq!(m.id, loc.id),
                RenderItem::Cluster(_) => panic!("no clusters expected at scale 1.0"),
            }
        }
    }

    #[test]
    fn coincident_points_collapse_to_single_cluster() {
        let locations: Vec<Location> =
            (0..8).map(|i| loc_at(&format!("p{i}"), 42.0, 42.0)).collect();
        let items = cluster_locations(&locations, 0.1);
        assert_eq!(items.len(), 1);
        match &items[0] {
            RenderItem::Cluster(c) => {
                assert_eq!(c.count, 8);
                assert!((c.x - 42.0).abs() < 1e-9);
                assert!((c.y - 42.0).abs() < 1e-9);
                assert_eq!(c.zoom, 1);
            }
            RenderItem::Marker(_) => panic!("expected one cluster"),
        }
    }

    #[test]
    fn distant_singletons_stay_markers() {
        // At zoom 1 the radius is 12.5 percentage points: the first two
        // merge, the far one stays a plain marker.
        let locations = vec![
            loc_at("a", 10.0, 10.0),
            loc_at("b", 11.0, 10.0),
            loc_at("c", 90.0, 90.0),
        ];
        let items = cluster_locations(&locations, 0.1);
        assert_eq!(items.len(), 2);
        match &items[0] {
            RenderItem::Cluster(c) => {
                assert_eq!(c.count, 2);
                assert!((c.x - 10.5).abs() < 1e-9);
            }
            RenderItem::Marker(_) => panic!("expected cluster first"),
        }
        match &items[1] {
            RenderItem::Marker(m) => assert_eq!(m.id, "c"),
            RenderItem::Cluster(_) => panic!("expected singleton marker"),
        }
    }

    #[test]
    fn membership_is_exclusive() {
        let locations: Vec<Location> = (0..20)
            .map(|i| loc_at(&format!("p{i}"), (i as f64) * 3.0, 50.0))
            .collect();
        let items = cluster_locations(&locations, 0.1);
        let total: usize = items
            .iter()
            .map(|item| match item {
                RenderItem::Marker(_) => 1,
                RenderItem::Cluster(c) => c.count,
            })
            .sum();
        assert_eq!(total, locations.len());
    }

    #[test]
    fn clustering_is_deterministic() {
        let locations: Vec<Location> = (0..30)
            .map(|i| loc_at(&format!("p{i}"), (i as f64 * 7.3) % 100.0, (i as f64 * 3.1) % 100.0))
            .collect();
        let a = cluster_locations(&locations, 0.3);
        let b = cluster_locations(&locations, 0.3);
        assert_eq!(a, b);
    }

    #[test]
    fn index_failure_degrades_to_markers() {
        let mut bad = loc_at("a", 10.0, 10.0);
        bad.x = Some(f64::NAN);
        let locations = vec![bad, loc_at("b", 10.0, 10.0)];

        assert!(ClusterIndex::build(&locations).is_err());
        let items = cluster_locations(&locations, 0.1);
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| matches!(item, RenderItem::Marker(_))));
    }

    #[test]
    fn higher_zoom_splits_clusters() {
        let locations = vec![
            loc_at("a", 10.0, 10.0),
            loc_at("b", 16.0, 10.0),
        ];
        let index = ClusterIndex::build(&locations).unwrap();
        // 6 percentage points apart: inside the zoom-1 radius (12.5),
        // outside the zoom-3 radius (~3.1).
        assert_eq!(index.items_at(&locations, 1).len(), 1);
        assert_eq!(index.items_at(&locations, 3).len(), 2);
    }
}
