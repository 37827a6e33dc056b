use crate::constants::*;
use serde::*;
use std::fmt;

/// A board cell. Always inside `[0, BOARD_WIDTH) x [0, BOARD_HEIGHT)`;
/// the only constructors that accept arbitrary coordinates return `Option`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct Location {
    packed: u16,
}

impl Location {
    /// Build a location from coordinates that are already known to be on the board.
    /// Out-of-range values are clamped to the nearest edge.
    pub fn from_coords(x: u8, y: u8) -> Self {
        let x = x.min(BOARD_WIDTH - 1) as u16;
        let y = y.min(BOARD_HEIGHT - 1) as u16;
        Location {
            packed: (x << 8) | y,
        }
    }

    /// Build a location from signed coordinates, returning `None` when off the board.
    pub fn checked(x: i64, y: i64) -> Option<Self> {
        if in_bounds(x, y) {
            Some(Location::from_coords(x as u8, y as u8))
        } else {
            None
        }
    }

    /// Build a location from signed coordinates, clamping into the board.
    pub fn clamped(x: i64, y: i64) -> Self {
        let x = x.clamp(0, BOARD_WIDTH as i64 - 1);
        let y = y.clamp(0, BOARD_HEIGHT as i64 - 1);
        Location::from_coords(x as u8, y as u8)
    }

    #[inline]
    pub fn x(self) -> u8 {
        ((self.packed >> 8) & 0xFF) as u8
    }

    #[inline]
    pub fn y(self) -> u8 {
        (self.packed & 0xFF) as u8
    }

    #[inline]
    pub fn packed_repr(self) -> u16 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u16) -> Self {
        Location::from_coords((packed >> 8) as u8, (packed & 0xFF) as u8)
    }

    /// Chebyshev distance, i.e. the number of 8-directional moves between two cells.
    pub fn distance_to(self, other: Self) -> u8 {
        let dx = (self.x() as i8) - (other.x() as i8);
        let dy = (self.y() as i8) - (other.y() as i8);

        dx.abs().max(dy.abs()) as u8
    }

    pub fn manhattan_distance_to(self, other: Self) -> u32 {
        let dx = (self.x() as i32) - (other.x() as i32);
        let dy = (self.y() as i32) - (other.y() as i32);

        dx.unsigned_abs() + dy.unsigned_abs()
    }

    /// The cell at `(dx, dy)` from this one, if it is on the board.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        Location::checked(self.x() as i64 + dx as i64, self.y() as i64 + dy as i64)
    }

    /// One greedy step toward `target` by the sign of each coordinate delta.
    /// Returns `self` when already at the target.
    pub fn step_toward(self, target: Self) -> Self {
        let dx = (target.x() as i8 - self.x() as i8).signum();
        let dy = (target.y() as i8 - self.y() as i8).signum();

        self.offset(dx, dy).unwrap_or(self)
    }

    pub fn is_adjacent(self, other: Self) -> bool {
        self != other && self.distance_to(other) == 1
    }
}

/// Whether signed coordinates fall on the board.
#[inline]
pub fn in_bounds(x: i64, y: i64) -> bool {
    (0..BOARD_WIDTH as i64).contains(&x) && (0..BOARD_HEIGHT as i64).contains(&y)
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u16::deserialize(deserializer).map(Location::from_packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks() {
        let loc = Location::from_coords(3, 11);
        assert_eq!(loc.x(), 3);
        assert_eq!(loc.y(), 11);
        assert_eq!(Location::from_packed(loc.packed_repr()), loc);
    }

    #[test]
    fn checked_rejects_off_board() {
        assert!(Location::checked(-1, 0).is_none());
        assert!(Location::checked(0, 15).is_none());
        assert!(Location::checked(15, 3).is_none());
        assert_eq!(Location::checked(14, 14), Some(Location::from_coords(14, 14)));
    }

    #[test]
    fn clamped_pulls_onto_board() {
        assert_eq!(Location::clamped(-4, 40), Location::from_coords(0, 14));
        assert_eq!(Location::clamped(7, 7), Location::from_coords(7, 7));
    }

    #[test]
    fn distances() {
        let a = Location::from_coords(1, 1);
        let b = Location::from_coords(4, 6);
        assert_eq!(a.distance_to(b), 5);
        assert_eq!(a.manhattan_distance_to(b), 8);
        assert_eq!(b.distance_to(a), 5);
    }

    #[test]
    fn step_toward_moves_diagonally_then_straight() {
        let start = Location::from_coords(2, 2);
        let target = Location::from_coords(5, 2);
        assert_eq!(start.step_toward(target), Location::from_coords(3, 2));

        let target = Location::from_coords(0, 0);
        assert_eq!(start.step_toward(target), Location::from_coords(1, 1));
        assert_eq!(target.step_toward(target), target);
    }
}
