//! Cross-turn memory owned by one engine for one game.
//!
//! Everything except the path cache is serialisable; the cache is rebuilt on
//! demand after a restore.

use crate::board::Board;
use crate::location::*;
use crate::pathfinder::PathCache;
use crate::profile::EngineProfile;
use crate::rotation::RotationQueue;
use crate::snapshot::*;
use crate::threat::ThreatMap;
use fnv::{FnvHashMap, FnvHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Early/mid/late classification of the turn counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Early,
    Mid,
    Late,
}

impl GamePhase {
    pub fn from_turn(turn: u32, profile: &EngineProfile) -> Self {
        if turn < profile.early_phase_until {
            GamePhase::Early
        } else if turn < profile.late_phase_from {
            GamePhase::Mid
        } else {
            GamePhase::Late
        }
    }
}

/// What the agent was standing on when the turn started.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStatus {
    pub position: Location,
    pub owner: PlayerId,
}

/// One entry of the bounded turn history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub position: Location,
    pub energy: u32,
    pub action: Action,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineState {
    /// Every lighthouse position ever seen, in discovery order. Append-only.
    known: Vec<Location>,
    #[serde(skip)]
    known_index: FnvHashSet<Location>,
    /// Turns ingested so far; the first turn is 1.
    pub turn: u32,
    /// Where the agent stood on the previous turn.
    pub last_position: Option<Location>,
    /// Lighthouse under the agent this turn, if any.
    pub current_tile: Option<TileStatus>,
    pub board: Board,
    pub threats: ThreatMap,
    #[serde(skip)]
    pub paths: PathCache,
    pub rotation: RotationQueue,
    /// Opponent -> lighthouse -> turn it was last seen held by that opponent.
    pub sightings: FnvHashMap<PlayerId, FnvHashMap<Location, u32>>,
    pub history: VecDeque<TurnRecord>,
}

impl EngineState {
    pub fn new(profile: &EngineProfile) -> Self {
        EngineState {
            paths: PathCache::with_capacity(profile.path_cache_capacity),
            ..Default::default()
        }
    }

    pub fn known_lighthouses(&self) -> &[Location] {
        &self.known
    }

    pub fn is_known(&self, loc: Location) -> bool {
        if self.known_index.len() == self.known.len() {
            self.known_index.contains(&loc)
        } else {
            self.known.contains(&loc)
        }
    }

    /// Add a lighthouse position to the registry. Returns `true` when it was new.
    pub fn remember(&mut self, loc: Location) -> bool {
        if self.known_index.len() != self.known.len() {
            self.known_index = self.known.iter().copied().collect();
        }
        if self.known_index.insert(loc) {
            self.known.push(loc);
            true
        } else {
            false
        }
    }

    /// Seed the registry from the initial roster handed over before the first turn.
    pub fn seed_roster(&mut self, lighthouses: &[Lighthouse]) {
        for lh in lighthouses {
            self.remember(lh.position);
        }
        self.rotation.sync(&self.known);
    }

    pub fn phase(&self, profile: &EngineProfile) -> GamePhase {
        GamePhase::from_turn(self.turn, profile)
    }

    /// Fold one snapshot into long-lived memory. Never fails.
    pub fn ingest(&mut self, snapshot: &TurnSnapshot, me: PlayerId) {
        self.turn = self.turn.saturating_add(1);

        for lh in &snapshot.lighthouses {
            self.remember(lh.position);
        }
        self.rotation.sync(&self.known);

        self.current_tile = snapshot.current_lighthouse().map(|lh| TileStatus {
            position: lh.position,
            owner: lh.owner,
        });

        self.record_sightings(snapshot, me);
    }

    fn record_sightings(&mut self, snapshot: &TurnSnapshot, me: PlayerId) {
        let turn = self.turn;
        for lh in &snapshot.lighthouses {
            for (owner, holdings) in self.sightings.iter_mut() {
                if *owner != lh.owner {
                    holdings.remove(&lh.position);
                }
            }
            if lh.is_opponent_of(me) {
                self.sightings
                    .entry(lh.owner)
                    .or_default()
                    .insert(lh.position, turn);
            }
        }
        self.sightings.retain(|_, holdings| !holdings.is_empty());
    }

    /// Lighthouses each opponent is believed to hold, sorted for determinism.
    pub fn enemy_holdings(&self) -> Vec<(PlayerId, Vec<Location>)> {
        let mut result: Vec<(PlayerId, Vec<Location>)> = self
            .sightings
            .iter()
            .map(|(owner, holdings)| {
                let mut locs: Vec<Location> = holdings.keys().copied().collect();
                locs.sort_unstable();
                (*owner, locs)
            })
            .collect();
        result.sort_unstable_by_key(|(owner, _)| *owner);
        result
    }

    /// Close the turn: remember where we stood and what we did.
    pub fn record_turn(&mut self, snapshot: &TurnSnapshot, action: Action, history_len: usize) {
        self.last_position = Some(snapshot.position);
        if history_len == 0 {
            self.history.clear();
            return;
        }
        self.history.push_back(TurnRecord {
            turn: self.turn,
            position: snapshot.position,
            energy: snapshot.energy,
            action,
        });
        while self.history.len() > history_len {
            self.history.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(x: u8, y: u8) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn phases_follow_thresholds() {
        let profile = EngineProfile::balanced();
        assert_eq!(GamePhase::from_turn(1, &profile), GamePhase::Early);
        assert_eq!(
            GamePhase::from_turn(profile.early_phase_until, &profile),
            GamePhase::Mid
        );
        assert_eq!(
            GamePhase::from_turn(profile.late_phase_from, &profile),
            GamePhase::Late
        );
    }

    #[test]
    fn ingest_is_an_idempotent_union() {
        let profile = EngineProfile::balanced();
        let mut state = EngineState::new(&profile);
        let snapshot = TurnSnapshot::new(
            loc(1, 1),
            10,
            vec![
                Lighthouse::new(loc(1, 1), 1, 10),
                Lighthouse::new(loc(5, 5), 0, 10),
            ],
        );

        state.ingest(&snapshot, 1);
        state.ingest(&snapshot, 1);

        assert_eq!(state.turn, 2);
        assert_eq!(state.known_lighthouses(), &[loc(1, 1), loc(5, 5)]);
        assert_eq!(
            state.current_tile,
            Some(TileStatus {
                position: loc(1, 1),
                owner: 1
            })
        );
    }

    #[test]
    fn sightings_follow_ownership_changes() {
        let profile = EngineProfile::balanced();
        let mut state = EngineState::new(&profile);
        let me = 1;

        let first = TurnSnapshot::new(loc(0, 0), 10, vec![Lighthouse::new(loc(4, 4), 2, 30)]);
        state.ingest(&first, me);
        assert_eq!(state.enemy_holdings(), vec![(2, vec![loc(4, 4)])]);

        let second = TurnSnapshot::new(loc(0, 0), 10, vec![Lighthouse::new(loc(4, 4), 3, 30)]);
        state.ingest(&second, me);
        assert_eq!(state.enemy_holdings(), vec![(3, vec![loc(4, 4)])]);

        let third = TurnSnapshot::new(loc(0, 0), 10, vec![Lighthouse::new(loc(4, 4), me, 30)]);
        state.ingest(&third, me);
        assert!(state.enemy_holdings().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let profile = EngineProfile::balanced();
        let mut state = EngineState::new(&profile);
        let snapshot = TurnSnapshot::new(loc(3, 3), 10, Vec::new());

        for _ in 0..5 {
            state.ingest(&snapshot, 1);
            state.record_turn(
                &snapshot,
                Action::Pass {
                    destination: loc(3, 3),
                },
                3,
            );
        }

        assert_eq!(state.history.len(), 3);
        assert_eq!(state.history.front().map(|r| r.turn), Some(3));
        assert_eq!(state.last_position, Some(loc(3, 3)));
    }
}
