//! Board model: fixed 15x15 grid, cell classification, neighbourhoods and
//! the optional mask of unplayable cells supplied by the game setup.

use crate::constants::*;
use crate::location::*;
use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellClass: u8 {
        const NONE = 0;
        const CORNER = 1;
        const EDGE = 2;
        const CENTER = 4;
    }
}

/// Neighbor offsets for 8-directional movement.
pub const NEIGHBORS_8: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Classify a cell. Corners are also edges; the centre is the middle 3x3 block.
pub fn classify(loc: Location) -> CellClass {
    let x = loc.x();
    let y = loc.y();
    let on_x_edge = x == 0 || x == BOARD_WIDTH - 1;
    let on_y_edge = y == 0 || y == BOARD_HEIGHT - 1;

    let mut class = CellClass::NONE;
    if on_x_edge || on_y_edge {
        class |= CellClass::EDGE;
    }
    if on_x_edge && on_y_edge {
        class |= CellClass::CORNER;
    }

    let mid_x = BOARD_WIDTH / 2;
    let mid_y = BOARD_HEIGHT / 2;
    if x.abs_diff(mid_x) <= 1 && y.abs_diff(mid_y) <= 1 {
        class |= CellClass::CENTER;
    }

    class
}

pub fn is_corner(loc: Location) -> bool {
    classify(loc).contains(CellClass::CORNER)
}

pub fn is_edge(loc: Location) -> bool {
    classify(loc).contains(CellClass::EDGE)
}

/// Board quadrant index in `0..4`. The middle row/column belongs to the lower half.
pub fn quadrant(loc: Location) -> u8 {
    let east = (loc.x() as u16) * 2 >= BOARD_WIDTH as u16;
    let south = (loc.y() as u16) * 2 >= BOARD_HEIGHT as u16;
    (east as u8) | ((south as u8) << 1)
}

/// In-bounds 8-neighbourhood of a cell, in `NEIGHBORS_8` order.
pub fn neighbors(loc: Location) -> impl Iterator<Item = Location> {
    NEIGHBORS_8
        .iter()
        .filter_map(move |&(dx, dy)| loc.offset(dx, dy))
}

/// Static board: which cells may be stood on.
///
/// Every cell is playable unless the game setup marked it otherwise.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    blocked: Vec<bool>,
}

impl Default for Board {
    fn default() -> Self {
        Board::open()
    }
}

impl Board {
    /// A board with every cell playable.
    pub fn open() -> Self {
        Board {
            blocked: vec![false; (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize)],
        }
    }

    #[inline]
    fn index(loc: Location) -> usize {
        (loc.y() as usize * BOARD_WIDTH as usize) + (loc.x() as usize)
    }

    pub fn set_blocked(&mut self, loc: Location, blocked: bool) {
        let index = Board::index(loc);
        if index >= self.blocked.len() {
            self.blocked.resize(index + 1, false);
        }
        self.blocked[index] = blocked;
    }

    pub fn is_blocked(&self, loc: Location) -> bool {
        self.blocked.get(Board::index(loc)).copied().unwrap_or(false)
    }

    pub fn is_passable(&self, loc: Location) -> bool {
        !self.is_blocked(loc)
    }

    /// All blocked cells, row-major.
    pub fn blocked_cells(&self) -> impl Iterator<Item = Location> + '_ {
        self.blocked.iter().enumerate().filter_map(|(i, &b)| {
            if b {
                let x = (i % BOARD_WIDTH as usize) as u8;
                let y = (i / BOARD_WIDTH as usize) as u8;
                Some(Location::from_coords(x, y))
            } else {
                None
            }
        })
    }

    /// Neighbours that are on the board and playable.
    pub fn passable_neighbors(&self, loc: Location) -> impl Iterator<Item = Location> + '_ {
        neighbors(loc).filter(move |n| self.is_passable(*n))
    }
}
