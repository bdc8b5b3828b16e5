//! Discretization of continuous lat/lng into canonical integer cells.
//!
//! Cells are computed with FLOOR division (`floor(lat / tileWidth)`), so the
//! tile just west of the prime meridian is `j = -1`, never a second `j = 0`.
//! A position is on the board only when its cell, and the visible
//! neighborhood around it, fit in `i32` indices.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

// --- Coordinates ------------------------------------------------------------

/// Continuous map coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One tile of the infinite integer grid. `i` follows latitude, `j` longitude.
///
/// Ordering is row-major (`i` first, then `j`), which is also the order
/// [`Board::cells_near_point`] yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    /// Storage key for this cell, `"{i}:{j}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.i, self.j)
    }

    pub fn parse_key(key: &str) -> Option<Cell> {
        let (i, j) = key.split_once(':')?;
        Some(Cell {
            i: i.parse().ok()?,
            j: j.parse().ok()?,
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.i, self.j)
    }
}

/// Half-open rectangle `[lat_min, lat_max) x [lng_min, lng_max)` covered by a cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBounds {
    pub lat_min: f64,
    pub lng_min: f64,
    pub lat_max: f64,
    pub lng_max: f64,
}

impl CellBounds {
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.lat_min
            && point.lat < self.lat_max
            && point.lng >= self.lng_min
            && point.lng < self.lng_max
    }
}

// --- Movement ---------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit step in (lat, lng) tile units.
    fn delta(self) -> (f64, f64) {
        match self {
            Direction::North => (1.0, 0.0),
            Direction::South => (-1.0, 0.0),
            Direction::East => (0.0, 1.0),
            Direction::West => (0.0, -1.0),
        }
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            _ => Err(GameError::UnknownDirection(s.to_string())),
        }
    }
}

// --- Board ------------------------------------------------------------------

/// Grid geometry plus the registry of canonical cells handed out so far.
#[derive(Debug, Clone)]
pub struct Board {
    tile_width: f64,
    visibility_radius: i32,
    known_cells: HashMap<(i32, i32), Cell>,
}

impl Board {
    pub fn new(tile_width: f64, visibility_radius: i32) -> Self {
        Self {
            tile_width,
            visibility_radius,
            known_cells: HashMap::new(),
        }
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn visibility_radius(&self) -> i32 {
        self.visibility_radius
    }

    /// Number of distinct cells registered so far.
    pub fn known_cell_count(&self) -> usize {
        self.known_cells.len()
    }

    /// Drop every registered cell.
    pub fn forget_cells(&mut self) {
        self.known_cells.clear();
    }

    fn canonical_cell(&mut self, i: i32, j: i32) -> Cell {
        *self.known_cells.entry((i, j)).or_insert(Cell { i, j })
    }

    /// Grid index for one coordinate, `None` when it is non-finite or too
    /// close to the `i32` limits to hold a full visible neighborhood.
    fn index_for(&self, degrees: f64) -> Option<i32> {
        let index = (degrees / self.tile_width).floor();
        let margin = f64::from(self.visibility_radius.max(0));
        let lowest = f64::from(i32::MIN) + margin;
        let highest = f64::from(i32::MAX) - margin;
        (index >= lowest && index <= highest).then_some(index as i32)
    }

    /// Canonical cell containing `point`, registering it if unseen.
    /// `None` when the point lies off the board.
    pub fn cell_for_point(&mut self, point: LatLng) -> Option<Cell> {
        let i = self.index_for(point.lat)?;
        let j = self.index_for(point.lng)?;
        Some(self.canonical_cell(i, j))
    }

    pub fn cell_bounds(&self, cell: Cell) -> CellBounds {
        let tw = self.tile_width;
        CellBounds {
            lat_min: cell.i as f64 * tw,
            lng_min: cell.j as f64 * tw,
            lat_max: (cell.i as f64 + 1.0) * tw,
            lng_max: (cell.j as f64 + 1.0) * tw,
        }
    }

    /// All cells in `[i-r, i+r) x [j-r, j+r)` around the cell holding `point`,
    /// row-major. Empty when `radius <= 0` or the point is off the board.
    /// Rows and columns past the `i32` limits are left out.
    pub fn cells_near_point(&mut self, point: LatLng, radius: i32) -> Vec<Cell> {
        if radius <= 0 {
            return Vec::new();
        }
        let Some(origin) = self.cell_for_point(point) else {
            return Vec::new();
        };
        let rows = origin.i.saturating_sub(radius)..origin.i.saturating_add(radius);
        let cols = origin.j.saturating_sub(radius)..origin.j.saturating_add(radius);
        let mut cells = Vec::with_capacity(rows.len() * cols.len());
        for i in rows {
            for j in cols.clone() {
                cells.push(self.canonical_cell(i, j));
            }
        }
        cells
    }

    /// The neighborhood at the configured visibility radius.
    pub fn visible_cells(&mut self, point: LatLng) -> Vec<Cell> {
        self.cells_near_point(point, self.visibility_radius)
    }

    /// Position one tile away from `point` in `direction`.
    pub fn step(&self, point: LatLng, direction: Direction) -> LatLng {
        let (dlat, dlng) = direction.delta();
        LatLng {
            lat: point.lat + dlat * self.tile_width,
            lng: point.lng + dlng * self.tile_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CLASSROOM: LatLng = LatLng::new(36.98949379578401, -122.06277128548504);

    #[test]
    fn classroom_cell_uses_floor() {
        let mut board = Board::new(1e-4, 8);
        assert_eq!(board.cell_for_point(CLASSROOM), Some(Cell { i: 369894, j: -1220628 }));
    }

    #[test]
    fn negative_coordinates_floor_away_from_zero() {
        let mut board = Board::new(1.0, 1);
        assert_eq!(board.cell_for_point(LatLng::new(-0.5, 0.5)), Some(Cell { i: -1, j: 0 }));
        assert_eq!(board.cell_for_point(LatLng::new(0.0, -0.0001)), Some(Cell { i: 0, j: -1 }));
    }

    #[test]
    fn repeated_lookups_are_canonical() {
        let mut board = Board::new(1e-4, 8);
        let a = board.cell_for_point(CLASSROOM);
        let b = board.cell_for_point(LatLng::new(CLASSROOM.lat + 1e-6, CLASSROOM.lng));
        assert_eq!(a, b);
        assert_eq!(board.known_cell_count(), 1);
    }

    #[test]
    fn bounds_span_one_tile() {
        let board = Board::new(0.5, 1);
        let b = board.cell_bounds(Cell { i: 2, j: -3 });
        assert_eq!(b, CellBounds { lat_min: 1.0, lng_min: -1.5, lat_max: 1.5, lng_max: -1.0 });
        assert!(b.contains(LatLng::new(1.0, -1.5)));
        assert!(!b.contains(LatLng::new(1.5, -1.2)));
    }

    #[test]
    fn classroom_neighborhood() {
        let mut board = Board::new(1e-4, 8);
        let cells = board.visible_cells(CLASSROOM);
        assert_eq!(cells.len(), 256);
        assert!(cells.iter().all(|c| (369886..369902).contains(&c.i)));
        assert!(cells.iter().all(|c| (-1220636..-1220620).contains(&c.j)));
        assert_eq!(cells.first(), Some(&Cell { i: 369886, j: -1220636 }));
        assert_eq!(cells.last(), Some(&Cell { i: 369901, j: -1220621 }));
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn neighborhood_is_row_major() {
        let mut board = Board::new(1.0, 2);
        let cells = board.cells_near_point(LatLng::new(0.5, 0.5), 2);
        let mut sorted = cells.clone();
        sorted.sort();
        assert_eq!(cells, sorted);
    }

    #[test]
    fn non_positive_radius_is_empty() {
        let mut board = Board::new(1e-4, 8);
        assert!(board.cells_near_point(CLASSROOM, 0).is_empty());
        assert!(board.cells_near_point(CLASSROOM, -4).is_empty());
    }

    #[test]
    fn step_moves_exactly_one_cell() {
        let mut board = Board::new(1e-4, 8);
        let start = board.cell_for_point(CLASSROOM).unwrap();
        let north = board.step(CLASSROOM, Direction::North);
        let west = board.step(CLASSROOM, Direction::West);
        assert_eq!(board.cell_for_point(north), Some(Cell { i: start.i + 1, j: start.j }));
        assert_eq!(board.cell_for_point(west), Some(Cell { i: start.i, j: start.j - 1 }));
    }

    #[test]
    fn far_positions_are_off_the_board() {
        let mut board = Board::new(1e-4, 8);
        assert_eq!(board.cell_for_point(LatLng::new(1e6, 0.0)), None);
        assert_eq!(board.cell_for_point(LatLng::new(0.0, -2e6)), None);
        assert_eq!(board.cell_for_point(LatLng::new(f64::NAN, 0.0)), None);
        assert_eq!(board.cell_for_point(LatLng::new(0.0, f64::INFINITY)), None);
        assert!(board.cells_near_point(LatLng::new(1e6, 0.0), 8).is_empty());
        assert_eq!(board.known_cell_count(), 0);
    }

    #[test]
    fn edge_of_the_board_keeps_a_full_neighborhood() {
        let mut board = Board::new(1.0, 8);
        let edge = LatLng::new(f64::from(i32::MAX - 8) + 0.5, f64::from(i32::MIN + 8) + 0.5);
        assert_eq!(board.cell_for_point(edge), Some(Cell { i: i32::MAX - 8, j: i32::MIN + 8 }));
        assert_eq!(board.visible_cells(edge).len(), 256);
        let past = LatLng::new(f64::from(i32::MAX - 7) + 0.5, 0.5);
        assert_eq!(board.cell_for_point(past), None);
    }

    #[test]
    fn wide_radius_is_clipped_at_the_limits() {
        let mut board = Board::new(1.0, 0);
        let corner = LatLng::new(f64::from(i32::MAX) + 0.5, 0.5);
        let cells = board.cells_near_point(corner, 2);
        assert_eq!(cells.len(), 2 * 4);
        assert!(cells.iter().all(|c| c.i >= i32::MAX - 2));
    }

    #[test]
    fn forgetting_cells_empties_the_registry() {
        let mut board = Board::new(1e-4, 8);
        board.visible_cells(CLASSROOM);
        assert_eq!(board.known_cell_count(), 256);
        board.forget_cells();
        assert_eq!(board.known_cell_count(), 0);
    }

    #[test]
    fn cell_key_round_trip() {
        let cell = Cell { i: -7, j: 12 };
        assert_eq!(cell.key(), "-7:12");
        assert_eq!(Cell::parse_key(&cell.key()), Some(cell));
        assert_eq!(Cell::parse_key("7,12"), None);
        assert_eq!(Cell::parse_key("a:1"), None);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("North".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!("w".parse::<Direction>().unwrap(), Direction::West);
        assert!(matches!("up".parse::<Direction>(), Err(GameError::UnknownDirection(_))));
    }
}
