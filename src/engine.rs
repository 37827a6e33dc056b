//! DecisionEngine: turns one snapshot into one action.
//!
//! Each turn the snapshot is folded into `EngineState`, threat zones are
//! refreshed, and the agent's situation is classified:
//!
//!   OnOwnedLighthouse   -> connect, else recharge when contested or thinly
//!                          spread, else move on
//!   OnForeignLighthouse -> attack when the capture is affordable, else move
//!   InTransit           -> move
//!
//! Movement heads for the arbitrated target along an A* route, falling back to
//! a straight step, and explores by zone score when there is no target. The
//! chosen step is then corrected for backtracking and blocked cells. `Pass` is
//! only returned when no neighbouring cell can be entered.

use crate::board::*;
use crate::connection::*;
use crate::energy;
use crate::error::ProfileError;
use crate::location::*;
use crate::profile::EngineProfile;
use crate::random::*;
use crate::snapshot::*;
use crate::state::*;
use crate::targeting::*;
use crate::threat::update_threats;
use crate::zone::ZoneValuator;
use fnv::FnvHashSet;
use log::*;
use std::cmp::Ordering;

/// Where the agent stands this turn. Derived from the snapshot, never stored.
#[derive(Copy, Clone, Debug)]
enum TurnState<'a> {
    OnOwnedLighthouse(&'a Lighthouse),
    OnForeignLighthouse(&'a Lighthouse),
    InTransit,
}

impl<'a> TurnState<'a> {
    fn classify(snapshot: &'a TurnSnapshot, me: PlayerId) -> Self {
        match snapshot.current_lighthouse() {
            Some(lh) if lh.is_owned_by(me) => TurnState::OnOwnedLighthouse(lh),
            Some(lh) => TurnState::OnForeignLighthouse(lh),
            None => TurnState::InTransit,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TurnState::OnOwnedLighthouse(_) => "on-owned",
            TurnState::OnForeignLighthouse(_) => "on-foreign",
            TurnState::InTransit => "in-transit",
        }
    }
}

pub struct DecisionEngine {
    player: PlayerId,
    profile: EngineProfile,
    state: EngineState,
    random: Box<dyn RandomSource + Send>,
}

impl DecisionEngine {
    /// Build an engine for `player`. Tie-breaks draw from an entropy-seeded source.
    pub fn new(player: PlayerId, profile: EngineProfile) -> Result<Self, ProfileError> {
        profile.validate()?;

        let state = EngineState::new(&profile);

        info!(
            "Decision engine for player {} using profile '{}'",
            player, profile.name
        );

        Ok(DecisionEngine {
            player,
            profile,
            state,
            random: Box::new(SeededRandom::from_entropy()),
        })
    }

    /// Build an engine whose tie-breaks are reproducible.
    pub fn seeded(player: PlayerId, profile: EngineProfile, seed: u64) -> Result<Self, ProfileError> {
        Ok(DecisionEngine::new(player, profile)?.with_random(Box::new(SeededRandom::seeded(seed))))
    }

    pub fn with_random(mut self, random: Box<dyn RandomSource + Send>) -> Self {
        self.random = random;
        self
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Replace the engine's memory, e.g. with one restored after a restart.
    pub fn restore_state(&mut self, mut state: EngineState) {
        state.paths.set_capacity(self.profile.path_cache_capacity);
        self.state = state;
    }

    /// Seed the known-lighthouse registry from the roster sent before turn one.
    pub fn seed_roster(&mut self, roster: &[Lighthouse]) {
        self.state.seed_roster(roster);
        info!(
            "Seeded {} lighthouses ({} known)",
            roster.len(),
            self.state.known_lighthouses().len()
        );
    }

    /// Mark cells the agent can never stand on.
    pub fn set_impassable<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Location>,
    {
        for cell in cells {
            self.state.board.set_blocked(cell, true);
        }
    }

    /// Sanitise a raw turn and decide on it.
    pub fn decide_raw(&mut self, raw: &RawTurn) -> Action {
        let snapshot = TurnSnapshot::from_raw(raw);
        self.decide(&snapshot)
    }

    pub fn decide(&mut self, snapshot: &TurnSnapshot) -> Action {
        let me = self.player;

        self.state.ingest(snapshot, me);
        update_threats(&mut self.state, snapshot, me, &self.profile);

        let phase = self.state.phase(&self.profile);
        let turn_state = TurnState::classify(snapshot, me);

        let action = match turn_state {
            TurnState::OnOwnedLighthouse(lh) => self.on_owned(snapshot, lh, phase),
            TurnState::OnForeignLighthouse(lh) => self.on_foreign(snapshot, lh, phase),
            TurnState::InTransit => None,
        }
        .unwrap_or_else(|| self.movement(snapshot, phase));

        debug!(
            "Turn {} ({:?}, {}) at {} with {} energy: {} {}",
            self.state.turn,
            phase,
            turn_state.name(),
            snapshot.position,
            snapshot.energy,
            action.name(),
            action.destination()
        );

        self.state
            .record_turn(snapshot, action, self.profile.history_len);

        action
    }

    fn on_owned(
        &mut self,
        snapshot: &TurnSnapshot,
        lighthouse: &Lighthouse,
        phase: GamePhase,
    ) -> Option<Action> {
        let me = self.player;
        let here = lighthouse.position;
        let owned = snapshot.owned_positions(me);

        let candidates = legal_candidates(here, snapshot, me, self.profile.check_crossings);
        if let Some(destination) = choose_connection(here, &owned, &candidates, self.random.as_mut()) {
            return Some(Action::Connect { destination });
        }

        let contested = snapshot.opponent_within(me, here, self.profile.defense_range);
        if contested || owned.len() <= self.profile.camping_limit {
            let needed = lighthouse.energy.saturating_add(1);
            let granted = energy::allocate(snapshot, me, needed, phase, &self.profile);
            if granted > 0 {
                return Some(Action::Attack {
                    destination: here,
                    energy: granted,
                });
            }
        }

        None
    }

    fn on_foreign(
        &mut self,
        snapshot: &TurnSnapshot,
        lighthouse: &Lighthouse,
        phase: GamePhase,
    ) -> Option<Action> {
        let me = self.player;
        let minimum = lighthouse.energy.saturating_add(1);
        let wanted = energy::desired_commit(lighthouse.energy, snapshot.energy, &self.profile);
        let granted = energy::allocate(snapshot, me, wanted, phase, &self.profile);

        if granted >= minimum {
            Some(Action::Attack {
                destination: lighthouse.position,
                energy: granted,
            })
        } else {
            trace!(
                "Cannot take {} (needs {}, can spend {})",
                lighthouse.position,
                minimum,
                granted
            );
            None
        }
    }

    /// Cells routes must avoid: the board mask plus, when enabled, threat zones.
    fn obstacles(&self) -> FnvHashSet<Location> {
        let mut obstacles = if self.profile.avoid_threats {
            self.state.threats.as_obstacles()
        } else {
            FnvHashSet::default()
        };
        obstacles.extend(self.state.board.blocked_cells());
        obstacles
    }

    fn movement(&mut self, snapshot: &TurnSnapshot, phase: GamePhase) -> Action {
        let here = snapshot.position;
        let target = choose_target(snapshot, &mut self.state, self.player, &self.profile)
            .map(|choice| choice.position)
            .filter(|position| *position != here);

        let proposed = match target {
            Some(goal) => {
                let obstacles = self.obstacles();
                let path = self
                    .state
                    .paths
                    .find_path(here, goal, &obstacles, self.profile.heuristic);
                match path.as_deref() {
                    Some([_, next, ..]) => Some(*next),
                    _ => {
                        trace!("No route {} -> {}; stepping straight", here, goal);
                        Some(here.step_toward(goal))
                    }
                }
            }
            None => self.explore(snapshot, phase),
        };

        self.finalize(here, proposed, target)
    }

    /// Best-scoring neighbour, picking at random between the top two.
    fn explore(&mut self, snapshot: &TurnSnapshot, phase: GamePhase) -> Option<Location> {
        let here = snapshot.position;
        let top: Vec<Location> = {
            let valuator = ZoneValuator::new(snapshot, &self.state, self.player, phase);
            let mut scored: Vec<(Location, f32)> = self
                .state
                .board
                .passable_neighbors(here)
                .map(|n| (n, valuator.score(n)))
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            scored.iter().take(2).map(|(loc, _)| *loc).collect()
        };
        choose(self.random.as_mut(), &top)
    }

    /// Turn a proposed next cell into a legal action.
    ///
    /// Stepping back onto the previous cell is allowed only when it is the one
    /// enterable neighbour left; `Pass` comes after that.
    fn finalize(&mut self, here: Location, proposed: Option<Location>, target: Option<Location>) -> Action {
        let board = &self.state.board;
        let backtrack = self.state.last_position.filter(|last| *last != here);
        let enterable = |loc: Location| loc != here && here.is_adjacent(loc) && board.is_passable(loc);

        if let Some(next) = proposed {
            if enterable(next) && Some(next) != backtrack {
                return Action::Move { destination: next };
            }
            trace!("Step {} from {} rejected; recomputing", next, here);
        }

        for _ in 0..self.profile.expansion_retries {
            let (dx, dy) = NEIGHBORS_8[self.random.next_index(NEIGHBORS_8.len()) % NEIGHBORS_8.len()];
            if let Some(next) = here.offset(dx, dy) {
                if enterable(next) && Some(next) != backtrack {
                    return Action::Move { destination: next };
                }
            }
        }

        let mut options: Vec<Location> = board
            .passable_neighbors(here)
            .filter(|n| Some(*n) != backtrack)
            .collect();
        if options.is_empty() {
            options.extend(backtrack.filter(|b| enterable(*b)));
        }

        if let Some(goal) = target {
            if let Some(best) = options.iter().map(|n| n.distance_to(goal)).min() {
                options.retain(|n| n.distance_to(goal) == best);
            }
        }

        match choose(self.random.as_mut(), &options) {
            Some(destination) => Action::Move { destination },
            None => {
                debug!("Boxed in at {}; passing", here);
                Action::Pass { destination: here }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(x: u8, y: u8) -> Location {
        Location::from_coords(x, y)
    }

    fn engine(player: PlayerId) -> DecisionEngine {
        DecisionEngine::new(player, EngineProfile::balanced())
            .unwrap()
            .with_random(Box::new(FirstChoice))
    }

    #[test]
    fn rejects_invalid_profile() {
        let bad = EngineProfile {
            early_phase_until: 200,
            ..EngineProfile::balanced()
        };
        assert!(matches!(
            DecisionEngine::new(1, bad),
            Err(ProfileError::PhaseOrder { .. })
        ));
    }

    #[test]
    fn does_not_step_back_onto_last_cell() {
        let mut engine = engine(1);
        let first = engine.decide(&TurnSnapshot::new(loc(7, 7), 100, Vec::new()));
        let stepped = first.destination();

        for _ in 0..10 {
            let here = engine.state().history.back().map(|r| r.action.destination()).unwrap();
            let previous = engine.state().last_position.unwrap();
            let action = engine.decide(&TurnSnapshot::new(here, 100, Vec::new()));
            assert_ne!(action.destination(), previous);
            assert!(action.destination().is_adjacent(here));
        }
        assert_ne!(stepped, loc(7, 7));
    }

    #[test]
    fn heads_for_the_rotation_target() {
        let mut engine = engine(1);
        engine.seed_roster(&[Lighthouse::new(loc(10, 3), 2, 500)]);
        let snapshot = TurnSnapshot::new(loc(3, 3), 0, vec![Lighthouse::new(loc(10, 3), 2, 500)]);

        let action = engine.decide(&snapshot);
        assert!(matches!(action, Action::Move { .. }));
        assert_eq!(action.destination().distance_to(loc(10, 3)), 6);
    }

    #[test]
    fn recharges_when_thinly_spread() {
        let mut engine = engine(1);
        let here = loc(7, 7);
        let snapshot = TurnSnapshot::new(here, 100, vec![Lighthouse::new(here, 1, 30)]);

        assert_eq!(
            engine.decide(&snapshot),
            Action::Attack {
                destination: here,
                energy: 31
            }
        );
    }

    #[test]
    fn recharges_a_contested_lighthouse() {
        let mut engine = engine(1);
        let here = loc(7, 7);
        // Three owned lifts the camping limit; the enemy three cells away keeps it contested.
        let snapshot = TurnSnapshot::new(
            here,
            100,
            vec![
                Lighthouse::new(here, 1, 30),
                Lighthouse::new(loc(0, 0), 1, 30),
                Lighthouse::new(loc(14, 14), 1, 30),
                Lighthouse::new(loc(10, 10), 2, 30),
            ],
        );

        assert_eq!(
            engine.decide(&snapshot),
            Action::Attack {
                destination: here,
                energy: 31
            }
        );
    }

    #[test]
    fn moves_on_when_the_reserve_leaves_nothing() {
        let mut engine = engine(1);
        let here = loc(7, 7);
        let snapshot = TurnSnapshot::new(here, 5, vec![Lighthouse::new(here, 1, 30)]);

        match engine.decide(&snapshot) {
            Action::Move { destination } => assert!(destination.is_adjacent(here)),
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn leaves_a_safe_lighthouse_when_spread_out() {
        let mut engine = engine(1);
        let here = loc(7, 7);
        let snapshot = TurnSnapshot::new(
            here,
            100,
            vec![
                Lighthouse::new(here, 1, 30),
                Lighthouse::new(loc(0, 0), 1, 30),
                Lighthouse::new(loc(14, 14), 1, 30),
            ],
        );

        let action = engine.decide(&snapshot);
        assert!(matches!(action, Action::Move { .. }));
    }

    #[test]
    fn threat_zones_block_routes_only_when_avoided() {
        let mut engine = engine(1);
        engine.set_impassable([loc(1, 1)]);
        engine.state.threats.mark(loc(3, 3), 1);

        let obstacles = engine.obstacles();
        assert!(obstacles.contains(&loc(1, 1)));
        assert!(obstacles.contains(&loc(3, 3)));

        engine.profile.avoid_threats = false;
        let obstacles = engine.obstacles();
        assert!(obstacles.contains(&loc(1, 1)));
        assert!(!obstacles.contains(&loc(3, 3)));
    }

    #[test]
    fn state_round_trips_through_serde() {
        let mut engine = engine(1);
        engine.decide(&TurnSnapshot::new(
            loc(2, 2),
            40,
            vec![Lighthouse::new(loc(5, 5), 2, 10)],
        ));

        let json = serde_json::to_string(engine.state()).unwrap();
        let restored: EngineState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.turn, 1);
        assert!(restored.is_known(loc(5, 5)));
        assert_eq!(restored.last_position, Some(loc(2, 2)));
        assert!(restored.paths.is_empty());
    }
}
