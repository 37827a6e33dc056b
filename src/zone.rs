//! ZoneValuator: scores an arbitrary cell for strategic value.
//!
//! The score is additive:
//!   1. positional bonus for corners, edges and the central block, weighted by phase
//!   2. triangle potential with any two owned lighthouses (scaled, capped)
//!   3. proximity to owned lighthouses
//!   4. a flat penalty for recorded threat zones (heavier late)
//!
//! Scoring is pure: nothing in the snapshot or state is modified.

use crate::board::*;
use crate::constants::*;
use crate::geometry::triangle_area;
use crate::location::*;
use crate::snapshot::*;
use crate::state::*;
use itertools::Itertools;

const CORNER_BONUS: f32 = 30.0;
const EDGE_BONUS: f32 = 10.0;
const CENTER_BONUS: f32 = 8.0;

const TRIANGLE_SCALE: f32 = 0.25;
const TRIANGLE_CAP: f32 = 20.0;

const PROXIMITY_STEP: f32 = 2.0;

const THREAT_PENALTY: f32 = 15.0;
const LATE_THREAT_PENALTY: f32 = 30.0;

/// Per-term breakdown of a cell score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZoneScore {
    pub positional: f32,
    pub triangle: f32,
    pub proximity: f32,
    pub threat_penalty: f32,
}

impl ZoneScore {
    pub fn total(&self) -> f32 {
        self.positional + self.triangle + self.proximity - self.threat_penalty
    }
}

/// Corner/edge weight and centre weight for a phase.
fn phase_weights(phase: GamePhase) -> (f32, f32) {
    match phase {
        GamePhase::Early => (1.5, 0.8),
        GamePhase::Mid => (1.0, 1.0),
        GamePhase::Late => (0.6, 1.2),
    }
}

/// Cell scorer for one turn. Owned lighthouses are gathered once up front.
pub struct ZoneValuator<'a> {
    state: &'a EngineState,
    phase: GamePhase,
    owned: Vec<Location>,
}

impl<'a> ZoneValuator<'a> {
    pub fn new(
        snapshot: &TurnSnapshot,
        state: &'a EngineState,
        me: PlayerId,
        phase: GamePhase,
    ) -> Self {
        ZoneValuator {
            state,
            phase,
            owned: snapshot.owned_positions(me),
        }
    }

    pub fn evaluate(&self, pos: Location) -> ZoneScore {
        let (rim_weight, center_weight) = phase_weights(self.phase);
        let class = classify(pos);

        let positional = if class.contains(CellClass::CORNER) {
            CORNER_BONUS * rim_weight
        } else if class.contains(CellClass::EDGE) {
            EDGE_BONUS * rim_weight
        } else if class.contains(CellClass::CENTER) {
            CENTER_BONUS * center_weight
        } else {
            0.0
        };

        let triangle = self
            .owned
            .iter()
            .tuple_combinations()
            .map(|(a, b)| triangle_area(pos, *a, *b))
            .fold(0.0f32, f32::max)
            * TRIANGLE_SCALE;

        let proximity: f32 = self
            .owned
            .iter()
            .map(|o| pos.distance_to(*o))
            .filter(|&d| d <= PROXIMITY_RADIUS)
            .map(|d| (PROXIMITY_RADIUS + 1 - d) as f32 * PROXIMITY_STEP)
            .sum();

        let threat_penalty = if self.state.threats.contains(pos) {
            match self.phase {
                GamePhase::Late => LATE_THREAT_PENALTY,
                _ => THREAT_PENALTY,
            }
        } else {
            0.0
        };

        ZoneScore {
            positional,
            triangle: triangle.min(TRIANGLE_CAP),
            proximity,
            threat_penalty,
        }
    }

    pub fn score(&self, pos: Location) -> f32 {
        self.evaluate(pos).total()
    }
}

/// One-shot convenience wrapper around `ZoneValuator`.
pub fn score_cell(
    pos: Location,
    snapshot: &TurnSnapshot,
    state: &EngineState,
    me: PlayerId,
    phase: GamePhase,
) -> f32 {
    ZoneValuator::new(snapshot, state, me, phase).score(pos)
}
