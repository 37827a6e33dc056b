//! Target arbitration for the movement step.
//!
//! Urgent overrides compete against the rotation queue's suggestion:
//!   - an unowned corner while the game is still early;
//!   - an affordable foreign lighthouse that would close a large triangle for
//!     an opponent;
//!   - a foreign lighthouse close enough, and weak enough on arrival, to take
//!     with the energy we can spend.
//!
//! The best override wins only when it scores above the profile's urgency
//! threshold. Otherwise the rotation target is used.

use crate::board::*;
use crate::constants::*;
use crate::energy;
use crate::geometry::triangle_area;
use crate::location::*;
use crate::profile::EngineProfile;
use crate::snapshot::*;
use crate::state::*;
use itertools::Itertools;
use log::*;

const CORNER_URGENCY: f32 = 90.0;
const CORNER_DISTANCE_STEP: f32 = 3.0;

const BLOCK_MIN_AREA: f32 = 24.0;
const BLOCK_BASE: f32 = 30.0;
const BLOCK_AREA_SCALE: f32 = 0.5;
const BLOCK_DISTANCE_STEP: f32 = 2.0;

const CAPTURE_BASE: f32 = 55.0;
const CAPTURE_CLOSENESS_STEP: f32 = 5.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetReason {
    EarlyCorner,
    BlockEnemyTriangle,
    EasyCapture,
    Rotation,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UrgentCandidate {
    pub position: Location,
    pub reason: TargetReason,
    pub score: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TargetChoice {
    pub position: Location,
    pub reason: TargetReason,
}

/// Energy a lighthouse is expected to hold when the agent gets there.
/// Owned lighthouses decay every turn; unowned ones do not.
pub fn projected_energy(lighthouse: &Lighthouse, distance: u8) -> u32 {
    if lighthouse.is_unowned() {
        lighthouse.energy
    } else {
        lighthouse
            .energy
            .saturating_sub(LIGHTHOUSE_DECAY_PER_TURN.saturating_mul(distance as u32))
    }
}

/// Largest triangle any single opponent could close by holding `target`.
fn enemy_triangle_through(target: Location, snapshot: &TurnSnapshot, me: PlayerId) -> f32 {
    let owners: Vec<PlayerId> = snapshot
        .opponents_of(me)
        .map(|lh| lh.owner)
        .sorted()
        .dedup()
        .collect();

    owners
        .iter()
        .map(|owner| {
            snapshot
                .lighthouses
                .iter()
                .filter(|lh| lh.owner == *owner && lh.position != target)
                .tuple_combinations()
                .map(|(a, b)| triangle_area(a.position, b.position, target))
                .fold(0.0f32, f32::max)
        })
        .fold(0.0f32, f32::max)
}

/// Every urgent override available this turn, in snapshot order.
pub fn urgent_candidates(
    snapshot: &TurnSnapshot,
    me: PlayerId,
    phase: GamePhase,
    profile: &EngineProfile,
) -> Vec<UrgentCandidate> {
    let here = snapshot.position;
    let budget = snapshot
        .energy
        .saturating_sub(energy::reserve(snapshot, me, phase, profile));
    let mut candidates = Vec::new();

    for lh in snapshot.lighthouses.iter() {
        if lh.position == here || lh.is_owned_by(me) {
            continue;
        }
        let distance = here.distance_to(lh.position);

        if phase == GamePhase::Early && lh.is_unowned() && is_corner(lh.position) {
            candidates.push(UrgentCandidate {
                position: lh.position,
                reason: TargetReason::EarlyCorner,
                score: CORNER_URGENCY - CORNER_DISTANCE_STEP * distance as f32,
            });
        }

        let needed = projected_energy(lh, distance).saturating_add(1);
        let affordable = budget >= needed;

        let area = enemy_triangle_through(lh.position, snapshot, me);
        if area >= BLOCK_MIN_AREA && affordable {
            let score = (BLOCK_BASE + area * BLOCK_AREA_SCALE
                - BLOCK_DISTANCE_STEP * distance as f32)
                * profile.aggression;
            candidates.push(UrgentCandidate {
                position: lh.position,
                reason: TargetReason::BlockEnemyTriangle,
                score,
            });
        }

        if distance <= EASY_CAPTURE_RADIUS && affordable {
            let closeness = (EASY_CAPTURE_RADIUS - distance) as f32;
            candidates.push(UrgentCandidate {
                position: lh.position,
                reason: TargetReason::EasyCapture,
                score: (CAPTURE_BASE + CAPTURE_CLOSENESS_STEP * closeness) * profile.aggression,
            });
        }
    }

    for candidate in &candidates {
        trace!(
            "Urgent candidate {} ({:?}): {}",
            candidate.position,
            candidate.reason,
            candidate.score
        );
    }

    candidates
}

/// Pick where to head this turn, or `None` when there is nowhere to go.
pub fn choose_target(
    snapshot: &TurnSnapshot,
    state: &mut EngineState,
    me: PlayerId,
    profile: &EngineProfile,
) -> Option<TargetChoice> {
    let phase = state.phase(profile);
    let rotation = state
        .rotation
        .next_target(snapshot.position, snapshot, me, profile.defense_range);

    let urgent = urgent_candidates(snapshot, me, phase, profile)
        .into_iter()
        .fold(None, |best: Option<UrgentCandidate>, candidate| match best {
            Some(b) if b.score >= candidate.score => Some(b),
            _ => Some(candidate),
        });

    match urgent {
        Some(candidate) if candidate.score > profile.urgency_threshold => {
            debug!(
                "Urgent target {} ({:?}, {}) over rotation {:?}",
                candidate.position, candidate.reason, candidate.score, rotation
            );
            Some(TargetChoice {
                position: candidate.position,
                reason: candidate.reason,
            })
        }
        _ => rotation.map(|position| TargetChoice {
            position,
            reason: TargetReason::Rotation,
        }),
    }
}
