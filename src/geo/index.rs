use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{haversine_m, MAX_GEO_CELL_DEGREES, METERS_PER_DEGREE, MIN_GEO_CELL_DEGREES};

const DEFAULT_CELL_DEGREES: f64 = 0.05;
// above this latitude a bounding box spans every meridian
const POLAR_LAT: f64 = 89.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyHit {
    pub id: String,
    pub distance_m: f64,
}

#[derive(Debug, Default)]
struct Grid {
    points: HashMap<String, (GeoPoint, (i64, i64))>,
    cells: HashMap<(i64, i64), HashSet<String>>,
}

impl Grid {
    fn detach(&mut self, id: &str) -> bool {
        let Some((_, cell)) = self.points.remove(id) else {
            return false;
        };
        if let Some(members) = self.cells.get_mut(&cell) {
            members.remove(id);
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
        true
    }
}

/// Open-task locations bucketed on a uniform lat/lng grid.
///
/// Only holds ids and coordinates; the task store stays authoritative for state.
/// Every operation takes the lock for a bounded in-memory step and never across I/O.
#[derive(Debug)]
pub struct GeoIndex {
    cell_degrees: f64,
    n_lng_cells: i64,
    grid: RwLock<Grid>,
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_DEGREES)
    }
}

impl GeoIndex {
    pub fn new(cell_degrees: f64) -> Self {
        let requested = if cell_degrees.is_finite() && cell_degrees > 0.0 {
            cell_degrees.clamp(MIN_GEO_CELL_DEGREES, MAX_GEO_CELL_DEGREES)
        } else {
            DEFAULT_CELL_DEGREES
        };
        // cells must tile the full circle of longitude for wrap-around to line up
        let n_lng_cells = (360.0 / requested).round().max(1.0) as i64;
        Self {
            cell_degrees: 360.0 / n_lng_cells as f64,
            n_lng_cells,
            grid: RwLock::new(Grid::default()),
        }
    }

    pub fn cell_degrees(&self) -> f64 {
        self.cell_degrees
    }

    fn read(&self) -> RwLockReadGuard<'_, Grid> {
        self.grid.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Grid> {
        self.grid.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lat_cell(&self, lat: f64) -> i64 {
        ((lat + 90.0) / self.cell_degrees).floor() as i64
    }

    fn lng_cell_unwrapped(&self, lng: f64) -> i64 {
        ((lng + 180.0) / self.cell_degrees).floor() as i64
    }

    fn cell_of(&self, point: &GeoPoint) -> (i64, i64) {
        (
            self.lat_cell(point.lat),
            self.lng_cell_unwrapped(point.lng).rem_euclid(self.n_lng_cells),
        )
    }

    /// Adds or moves `id`. Inserting the same id twice keeps a single entry.
    pub fn insert(&self, id: &str, point: GeoPoint) {
        let cell = self.cell_of(&point);
        let mut grid = self.write();
        grid.detach(id);
        grid.cells.entry(cell).or_default().insert(id.to_string());
        grid.points.insert(id.to_string(), (point, cell));
    }

    /// Returns false when `id` was not indexed.
    pub fn remove(&self, id: &str) -> bool {
        self.write().detach(id)
    }

    pub fn remove_many<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        let mut grid = self.write();
        for id in ids {
            grid.detach(id);
        }
    }

    /// Replaces the whole content, used when warming from storage.
    pub fn rebuild(&self, points: impl IntoIterator<Item = (String, GeoPoint)>) {
        let mut fresh = Grid::default();
        for (id, point) in points {
            let cell = self.cell_of(&point);
            fresh.detach(&id);
            fresh.cells.entry(cell).or_default().insert(id.clone());
            fresh.points.insert(id, (point, cell));
        }
        *self.write() = fresh;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().points.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexed points within `radius_m` of the center, closest first, ties by id.
    pub fn nearest(&self, lat: f64, lng: f64, radius_m: f64, limit: usize) -> Vec<NearbyHit> {
        if limit == 0 || radius_m.is_nan() || radius_m < 0.0 {
            return vec![];
        }
        let lat_delta = radius_m / METERS_PER_DEGREE;
        let lat_min = (lat - lat_delta).max(-90.0);
        let lat_max = (lat + lat_delta).min(90.0);
        let lat_cells = (self.lat_cell(lat_min) - 1)..=(self.lat_cell(lat_max) + 1);

        let max_abs_lat = lat_min.abs().max(lat_max.abs());
        let lng_delta = if max_abs_lat >= POLAR_LAT {
            180.0
        } else {
            lat_delta / max_abs_lat.to_radians().cos()
        };
        let lng_lo = self.lng_cell_unwrapped(lng - lng_delta) - 1;
        let lng_hi = self.lng_cell_unwrapped(lng + lng_delta) + 1;
        let (lng_start, lng_span) = if lng_delta >= 180.0 || lng_hi - lng_lo + 1 >= self.n_lng_cells {
            (0, self.n_lng_cells)
        } else {
            (lng_lo, lng_hi - lng_lo + 1)
        };
        let lng_cells = (0..lng_span).map(|k| (lng_start + k).rem_euclid(self.n_lng_cells));

        let grid = self.read();
        let window = (lat_cells.end() - lat_cells.start() + 1) as usize * lng_span as usize;
        let mut hits: Vec<NearbyHit> = if window > grid.cells.len() {
            grid.points
                .iter()
                .map(|(id, (p, _))| NearbyHit {
                    id: id.clone(),
                    distance_m: haversine_m(lat, lng, p.lat, p.lng),
                })
                .filter(|hit| hit.distance_m <= radius_m)
                .collect()
        } else {
            let mut hits = Vec::new();
            for lat_c in lat_cells {
                for lng_c in lng_cells.clone() {
                    let Some(members) = grid.cells.get(&(lat_c, lng_c)) else {
                        continue;
                    };
                    for id in members {
                        if let Some((p, _)) = grid.points.get(id) {
                            let distance_m = haversine_m(lat, lng, p.lat, p.lng);
                            if distance_m <= radius_m {
                                hits.push(NearbyHit {
                                    id: id.clone(),
                                    distance_m,
                                });
                            }
                        }
                    }
                }
            }
            hits
        };
        drop(grid);

        hits.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn north_of(lat: f64, lng: f64, meters: f64) -> GeoPoint {
        GeoPoint {
            lat: lat + meters / METERS_PER_DEGREE,
            lng,
        }
    }

    #[test]
    fn radius_filters_and_orders_by_distance() {
        let index = GeoIndex::default();
        index.insert("far", north_of(52.52, 13.40, 5_000.0));
        index.insert("mid", north_of(52.52, 13.40, 500.0));
        index.insert("near", north_of(52.52, 13.40, 10.0));

        let hits = index.nearest(52.52, 13.40, 1_000.0, 10);
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!((hits[0].distance_m - 10.0).abs() < 0.5);
        assert!((hits[1].distance_m - 500.0).abs() < 1.0);

        let all = index.nearest(52.52, 13.40, 6_000.0, 10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn limit_truncates_with_id_tie_break() {
        let index = GeoIndex::default();
        let spot = GeoPoint { lat: 1.0, lng: 1.0 };
        index.insert("b", spot);
        index.insert("a", spot);
        index.insert("c", spot);

        let hits = index.nearest(1.0, 1.0, 10.0, 2);
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(index.nearest(1.0, 1.0, 10.0, 0).is_empty());
    }

    #[test]
    fn insert_twice_keeps_one_entry_at_latest_location() {
        let index = GeoIndex::default();
        index.insert("t1", GeoPoint { lat: 10.0, lng: 10.0 });
        index.insert("t1", GeoPoint { lat: -10.0, lng: -10.0 });
        assert_eq!(index.len(), 1);
        assert!(index.nearest(10.0, 10.0, 1_000.0, 5).is_empty());
        assert_eq!(index.nearest(-10.0, -10.0, 1_000.0, 5).len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let index = GeoIndex::default();
        assert!(!index.remove("missing"));
        index.insert("t1", GeoPoint { lat: 0.0, lng: 0.0 });
        assert!(index.remove("t1"));
        assert!(index.is_empty());
        assert!(index.nearest(0.0, 0.0, 1_000.0, 5).is_empty());
    }

    #[test]
    fn query_wraps_across_antimeridian() {
        let index = GeoIndex::default();
        index.insert("east", GeoPoint { lat: 0.0, lng: 179.995 });
        index.insert("west", GeoPoint { lat: 0.0, lng: -179.995 });

        let hits = index.nearest(0.0, 180.0, 2_000.0, 10);
        assert_eq!(hits.len(), 2);
        let hits = index.nearest(0.0, -180.0, 2_000.0, 10);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn polar_query_scans_every_meridian() {
        let index = GeoIndex::default();
        index.insert("a", GeoPoint { lat: 89.99, lng: 0.0 });
        index.insert("b", GeoPoint { lat: 89.99, lng: 180.0 });
        let hits = index.nearest(90.0, 0.0, 5_000.0, 10);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn large_radius_falls_back_to_full_scan() {
        let index = GeoIndex::new(0.01);
        index.insert("x", GeoPoint { lat: 40.0, lng: -70.0 });
        index.insert("y", GeoPoint { lat: -40.0, lng: 110.0 });
        let hits = index.nearest(0.0, 0.0, 25_000_000.0, 10);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn rebuild_replaces_content() {
        let index = GeoIndex::default();
        index.insert("old", GeoPoint { lat: 0.0, lng: 0.0 });
        index.rebuild(vec![
            ("n1".to_string(), GeoPoint { lat: 1.0, lng: 1.0 }),
            ("n2".to_string(), GeoPoint { lat: 2.0, lng: 2.0 }),
        ]);
        assert_eq!(index.len(), 2);
        assert!(!index.contains("old"));
        assert!(index.contains("n2"));
    }

    #[test]
    fn cell_size_is_clamped_to_finest_grid() {
        let index = GeoIndex::new(1e-7);
        assert!(index.cell_degrees() >= MIN_GEO_CELL_DEGREES * 0.999);
        assert!((GeoIndex::new(500.0).cell_degrees() - MAX_GEO_CELL_DEGREES).abs() < 1e-9);
        assert!((GeoIndex::new(f64::NAN).cell_degrees() - DEFAULT_CELL_DEGREES).abs() < 1e-9);
    }

    #[test]
    fn polar_query_on_tiny_cells_stays_bounded() {
        let index = GeoIndex::new(1e-7);
        for i in 0..50 {
            index.insert(&format!("p{i:02}"), GeoPoint { lat: 89.995, lng: -180.0 + i as f64 * 7.2 });
        }
        index.insert("south", GeoPoint { lat: -89.995, lng: 0.0 });

        let hits = index.nearest(90.0, 0.0, 2_000.0, 100);
        assert_eq!(hits.len(), 50);
        assert!(hits.iter().all(|h| h.id != "south"));
    }
}
