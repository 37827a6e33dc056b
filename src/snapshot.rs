//! Per-turn data model: lighthouses, the turn snapshot, the action returned,
//! and the signed "raw" records a transport decodes before sanitisation.

use crate::constants::*;
use crate::location::*;
use fnv::FnvHashSet;
use log::*;
use serde::{Deserialize, Serialize};

/// Opaque player id assigned by the join handshake. `UNOWNED` (0) means nobody.
pub type PlayerId = u32;

/// A capturable board node as seen this turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lighthouse {
    pub position: Location,
    pub owner: PlayerId,
    pub energy: u32,
    pub has_key: bool,
    /// Other ends of links already attached to this lighthouse.
    #[serde(default)]
    pub connections: Vec<Location>,
}

impl Lighthouse {
    pub fn new(position: Location, owner: PlayerId, energy: u32) -> Self {
        Lighthouse {
            position,
            owner,
            energy,
            has_key: false,
            connections: Vec::new(),
        }
    }

    pub fn with_key(mut self) -> Self {
        self.has_key = true;
        self
    }

    pub fn with_connection(mut self, other: Location) -> Self {
        self.connections.push(other);
        self
    }

    pub fn is_unowned(&self) -> bool {
        self.owner == UNOWNED
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == player && !self.is_unowned()
    }

    /// Owned by somebody other than `player`.
    pub fn is_opponent_of(&self, player: PlayerId) -> bool {
        !self.is_unowned() && self.owner != player
    }

    pub fn is_connected_to(&self, other: Location) -> bool {
        self.connections.contains(&other)
    }
}

/// Everything the agent learns at the start of a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub position: Location,
    pub energy: u32,
    pub lighthouses: Vec<Lighthouse>,
}

impl TurnSnapshot {
    pub fn new(position: Location, energy: u32, lighthouses: Vec<Lighthouse>) -> Self {
        TurnSnapshot {
            position,
            energy,
            lighthouses,
        }
    }

    pub fn lighthouse_at(&self, loc: Location) -> Option<&Lighthouse> {
        self.lighthouses.iter().find(|lh| lh.position == loc)
    }

    /// The lighthouse under the agent, if any.
    pub fn current_lighthouse(&self) -> Option<&Lighthouse> {
        self.lighthouse_at(self.position)
    }

    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Lighthouse> + '_ {
        self.lighthouses
            .iter()
            .filter(move |lh| lh.is_owned_by(player))
    }

    pub fn owned_positions(&self, player: PlayerId) -> Vec<Location> {
        self.owned_by(player).map(|lh| lh.position).collect()
    }

    pub fn opponents_of(&self, player: PlayerId) -> impl Iterator<Item = &Lighthouse> + '_ {
        self.lighthouses
            .iter()
            .filter(move |lh| lh.is_opponent_of(player))
    }

    /// Whether some opposing lighthouse lies within `range` (Chebyshev) of `loc`.
    pub fn opponent_within(&self, player: PlayerId, loc: Location, range: u8) -> bool {
        self.opponents_of(player)
            .any(|lh| lh.position.distance_to(loc) <= range)
    }

    /// Sanitise a raw turn. Never fails: off-board data is clamped or dropped.
    pub fn from_raw(raw: &RawTurn) -> Self {
        let position = match Location::checked(raw.position.x, raw.position.y) {
            Some(loc) => loc,
            None => {
                let clamped = Location::clamped(raw.position.x, raw.position.y);
                warn!(
                    "Agent position ({}, {}) is off the board; clamped to {}",
                    raw.position.x, raw.position.y, clamped
                );
                clamped
            }
        };

        let energy = clamp_energy(raw.energy, "agent");

        let mut seen: FnvHashSet<Location> = FnvHashSet::default();
        let mut lighthouses = Vec::with_capacity(raw.lighthouses.len());
        for raw_lh in &raw.lighthouses {
            let Some(lighthouse) = raw_lh.sanitize() else {
                continue;
            };
            if !seen.insert(lighthouse.position) {
                warn!("Duplicate lighthouse at {} ignored", lighthouse.position);
                continue;
            }
            lighthouses.push(lighthouse);
        }

        TurnSnapshot {
            position,
            energy,
            lighthouses,
        }
    }
}

/// The single action returned each turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move { destination: Location },
    /// Attack (or recharge, if owned) the lighthouse under the agent.
    Attack { destination: Location, energy: u32 },
    Connect { destination: Location },
    Pass { destination: Location },
}

impl Action {
    pub fn destination(&self) -> Location {
        match self {
            Action::Move { destination }
            | Action::Attack { destination, .. }
            | Action::Connect { destination }
            | Action::Pass { destination } => *destination,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Attack { .. } => "attack",
            Action::Connect { .. } => "connect",
            Action::Pass { .. } => "pass",
        }
    }
}

// ---------------------------------------------------------------------------
// Raw inbound records
// ---------------------------------------------------------------------------

/// Signed coordinate pair as decoded off the wire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosition {
    pub x: i64,
    pub y: i64,
}

impl RawPosition {
    pub fn new(x: i64, y: i64) -> Self {
        RawPosition { x, y }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLighthouse {
    pub position: RawPosition,
    pub owner: i64,
    pub energy: i64,
    pub has_key: bool,
    #[serde(default)]
    pub connections: Vec<RawPosition>,
}

impl RawLighthouse {
    /// Returns `None` when the lighthouse itself is off the board.
    pub fn sanitize(&self) -> Option<Lighthouse> {
        let Some(position) = Location::checked(self.position.x, self.position.y) else {
            warn!(
                "Lighthouse at ({}, {}) is off the board; ignored",
                self.position.x, self.position.y
            );
            return None;
        };

        let owner = if self.owner < 0 || self.owner > PlayerId::MAX as i64 {
            warn!(
                "Lighthouse {} has invalid owner {}; treated as unowned",
                position, self.owner
            );
            UNOWNED
        } else {
            self.owner as PlayerId
        };

        let connections = self
            .connections
            .iter()
            .filter_map(|c| {
                let loc = Location::checked(c.x, c.y);
                if loc.is_none() {
                    warn!(
                        "Lighthouse {} lists off-board connection ({}, {}); dropped",
                        position, c.x, c.y
                    );
                }
                loc
            })
            .collect();

        Some(Lighthouse {
            position,
            owner,
            energy: clamp_energy(self.energy, "lighthouse"),
            has_key: self.has_key,
            connections,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTurn {
    pub position: RawPosition,
    pub energy: i64,
    #[serde(default)]
    pub lighthouses: Vec<RawLighthouse>,
}

fn clamp_energy(energy: i64, what: &str) -> u32 {
    if energy < 0 {
        warn!("Negative {} energy {} clamped to 0", what, energy);
        0
    } else {
        energy.min(u32::MAX as i64) as u32
    }
}
