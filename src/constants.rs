pub const BOARD_WIDTH: u8 = 15;
pub const BOARD_HEIGHT: u8 = 15;

/// Owner id reported for lighthouses nobody controls.
pub const UNOWNED: u32 = 0;

/// Energy an owned lighthouse loses every turn.
pub const LIGHTHOUSE_DECAY_PER_TURN: u32 = 10;

/// Chebyshev radius in which an opposing lighthouse makes one of ours contested.
pub const DEFAULT_DEFENSE_RANGE: u8 = 4;

/// Longest Chebyshev span between two enemy lighthouses still treated as a likely link.
pub const DEFAULT_THREAT_SPAN: u8 = 6;

/// Radius in which an opposing lighthouse raises the energy reserve.
pub const HOSTILE_RESERVE_RADIUS: u8 = 2;

/// Radius for the "easy capture" urgent override.
pub const EASY_CAPTURE_RADIUS: u8 = 3;

/// Radius for the zone valuator's proximity bonus.
pub const PROXIMITY_RADIUS: u8 = 3;

/// Owned-lighthouse count from which the reserve is relaxed.
pub const TERRITORY_DISCOUNT_COUNT: usize = 3;

/// Energy kept back by the surplus tier for mid-sized ratios.
pub const SURPLUS_FLOOR: u32 = 50;
