//! ThreatAssessor: predicts which cells lie on, or will soon lie on, opposing
//! links. Zones are pathfinding obstacles and a scoring penalty.
//!
//! Two sources feed the map each turn:
//!   - pairs of lighthouses held by the same opponent whose Chebyshev span is
//!     at most `threat_span` (likely future links), using remembered sightings;
//!   - links an opponent has already built, regardless of length.
//!
//! A zone remembers the last turn it was reinforced. With a TTL configured,
//! zones not reinforced within it are dropped.

use crate::geometry::interior_line;
use crate::location::*;
use crate::profile::EngineProfile;
use crate::snapshot::*;
use crate::state::EngineState;
use fnv::{FnvHashMap, FnvHashSet};
use itertools::Itertools;
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ThreatMap {
    zones: FnvHashMap<Location, u32>,
}

impl ThreatMap {
    pub fn contains(&self, loc: Location) -> bool {
        self.zones.contains_key(&loc)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Mark (or refresh) a zone.
    pub fn mark(&mut self, loc: Location, turn: u32) {
        let entry = self.zones.entry(loc).or_insert(turn);
        *entry = (*entry).max(turn);
    }

    /// Drop zones not reinforced within `ttl` turns of `turn`. Returns how many went.
    pub fn age_out(&mut self, turn: u32, ttl: u32) -> usize {
        let before = self.zones.len();
        self.zones
            .retain(|_, marked| turn.saturating_sub(*marked) <= ttl);
        before - self.zones.len()
    }

    /// Every zone as a pathfinding obstacle set.
    pub fn as_obstacles(&self) -> FnvHashSet<Location> {
        self.zones.keys().copied().collect()
    }
}

/// Refresh `state.threats` from the current snapshot and remembered sightings.
pub fn update_threats(
    state: &mut EngineState,
    snapshot: &TurnSnapshot,
    me: PlayerId,
    profile: &EngineProfile,
) {
    let turn = state.turn;
    let before = state.threats.len();

    for (owner, holdings) in state.enemy_holdings() {
        if holdings.len() < 2 {
            continue;
        }
        for (a, b) in holdings.iter().tuple_combinations() {
            if a.distance_to(*b) > profile.threat_span {
                continue;
            }
            for cell in interior_line(*a, *b) {
                state.threats.mark(cell, turn);
            }
            trace!("Threat: player {} may link {} - {}", owner, a, b);
        }
    }

    for lh in snapshot.opponents_of(me) {
        for other in &lh.connections {
            let same_owner = snapshot
                .lighthouse_at(*other)
                .map(|o| o.owner == lh.owner)
                .unwrap_or(false);
            if !same_owner {
                continue;
            }
            for cell in interior_line(lh.position, *other) {
                state.threats.mark(cell, turn);
            }
        }
    }

    let aged = match profile.threat_ttl {
        Some(ttl) => state.threats.age_out(turn, ttl),
        None => 0,
    };

    if state.threats.len() != before || aged > 0 {
        debug!(
            "Threat zones: {} (was {}, aged out {})",
            state.threats.len(),
            before,
            aged
        );
    }
}
