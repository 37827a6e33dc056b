//! ConnectionPlanner: picks which owned lighthouse to link to from the one
//! under the agent.
//!
//! A candidate's score is the best, over every third owned lighthouse, of
//!   shoelace area
//!   + corner bonus (both target and third on corners, or exactly one)
//!   + edge bonus per link endpoint on the board rim
//!   + multi-quadrant bonus when the triangle spans more than one quadrant
//!   + perimeter bonus proportional to the Manhattan perimeter.
//!
//! No positive score, or a tie at the top, falls back to the random source.

use crate::board::*;
use crate::geometry::*;
use crate::location::*;
use crate::random::*;
use crate::snapshot::*;
use itertools::Itertools;
use log::*;

const BOTH_CORNERS_BONUS: f32 = 100.0;
const ONE_CORNER_BONUS: f32 = 25.0;
const EDGE_ENDPOINT_BONUS: f32 = 5.0;
const MULTI_QUADRANT_BONUS: f32 = 10.0;
const PERIMETER_SCALE: f32 = 0.5;

/// Best triangle found for one candidate target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionScore {
    pub target: Location,
    pub third: Location,
    pub area: f32,
    pub total: f32,
}

/// Score the triangle `current`-`target`-`third`.
pub fn triangle_score(current: Location, target: Location, third: Location) -> f32 {
    let area = triangle_area(current, target, third);

    let corner_bonus = match (is_corner(target), is_corner(third)) {
        (true, true) => BOTH_CORNERS_BONUS,
        (true, false) | (false, true) => ONE_CORNER_BONUS,
        (false, false) => 0.0,
    };

    let edge_bonus = [current, target]
        .iter()
        .filter(|p| is_edge(**p))
        .count() as f32
        * EDGE_ENDPOINT_BONUS;

    let quadrant_bonus = if quadrant_span(&[current, target, third]) > 1 {
        MULTI_QUADRANT_BONUS
    } else {
        0.0
    };

    let perimeter_bonus = triangle_perimeter(current, target, third) as f32 * PERIMETER_SCALE;

    area + corner_bonus + edge_bonus + quadrant_bonus + perimeter_bonus
}

/// Best score for linking to `target`, or `None` when no third lighthouse exists.
pub fn score_candidate(
    current: Location,
    target: Location,
    owned: &[Location],
) -> Option<ConnectionScore> {
    owned
        .iter()
        .copied()
        .filter(|third| *third != current && *third != target)
        .map(|third| ConnectionScore {
            target,
            third,
            area: triangle_area(current, target, third),
            total: triangle_score(current, target, third),
        })
        .fold(None, |best: Option<ConnectionScore>, candidate| match best {
            Some(b) if b.total >= candidate.total => Some(b),
            _ => Some(candidate),
        })
}

/// Lighthouses the agent may link to from `current`: owned by the agent, keyed,
/// not `current` itself, and not already linked either way. With
/// `check_crossings`, links that would cross an existing link are rejected too.
pub fn legal_candidates(
    current: Location,
    snapshot: &TurnSnapshot,
    me: PlayerId,
    check_crossings: bool,
) -> Vec<Location> {
    let origin_links: &[Location] = snapshot
        .lighthouse_at(current)
        .map(|lh| lh.connections.as_slice())
        .unwrap_or(&[]);

    let existing_links: Vec<(Location, Location)> = if check_crossings {
        snapshot
            .lighthouses
            .iter()
            .flat_map(|lh| {
                lh.connections
                    .iter()
                    .map(move |other| ordered(lh.position, *other))
            })
            .unique()
            .collect()
    } else {
        Vec::new()
    };

    snapshot
        .owned_by(me)
        .filter(|lh| lh.position != current)
        .filter(|lh| lh.has_key)
        .filter(|lh| !lh.is_connected_to(current))
        .filter(|lh| !origin_links.contains(&lh.position))
        .map(|lh| lh.position)
        .filter(|target| {
            let crosses = existing_links
                .iter()
                .any(|(a, b)| segments_cross(current, *target, *a, *b));
            if crosses {
                trace!("Connection {} -> {} would cross an existing link", current, target);
            }
            !crosses
        })
        .collect()
}

fn ordered(a: Location, b: Location) -> (Location, Location) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Choose a link target among `candidates`.
///
/// Returns `None` when there are no candidates or fewer than two owned lighthouses.
pub fn choose_connection(
    current: Location,
    owned: &[Location],
    candidates: &[Location],
    random: &mut dyn RandomSource,
) -> Option<Location> {
    if candidates.is_empty() || owned.len() < 2 {
        return None;
    }

    let scored: Vec<ConnectionScore> = candidates
        .iter()
        .filter_map(|target| score_candidate(current, *target, owned))
        .collect();

    for score in &scored {
        trace!(
            "Connection candidate {} via {}: area={} total={}",
            score.target,
            score.third,
            score.area,
            score.total
        );
    }

    let best_total = scored
        .iter()
        .map(|s| s.total)
        .fold(f32::NEG_INFINITY, f32::max);

    if scored.is_empty() || best_total <= 0.0 {
        debug!("No scored connection from {}; picking at random", current);
        return choose(random, candidates);
    }

    let top: Vec<Location> = scored
        .iter()
        .filter(|s| s.total == best_total)
        .map(|s| s.target)
        .collect();

    if top.len() > 1 {
        debug!("Connection tie between {} targets; picking at random", top.len());
    }
    choose(random, &top)
}
