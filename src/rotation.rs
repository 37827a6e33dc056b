//! TargetRotator: a priority-ordered queue of known lighthouses the agent
//! cycles through when nothing urgent is going on.
//!
//! The queue is sorted once, when the registry first becomes non-empty:
//! corners, then edges, then everything else, keeping discovery order inside
//! each class. Lighthouses discovered later are appended unsorted.

use crate::board::*;
use crate::location::*;
use crate::snapshot::*;
use log::*;
use serde::{Deserialize, Serialize};

fn priority_class(loc: Location) -> u8 {
    let class = classify(loc);
    if class.contains(CellClass::CORNER) {
        0
    } else if class.contains(CellClass::EDGE) {
        1
    } else {
        2
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RotationQueue {
    queue: Vec<Location>,
    cursor: usize,
    built: bool,
}

impl RotationQueue {
    pub fn entries(&self) -> &[Location] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bring the queue up to date with the known-lighthouse registry.
    pub fn sync(&mut self, known: &[Location]) {
        if !self.built {
            if known.is_empty() {
                return;
            }
            self.queue = known.to_vec();
            self.queue.sort_by_key(|loc| priority_class(*loc));
            self.cursor = 0;
            self.built = true;
            debug!("Rotation queue built with {} lighthouses", self.queue.len());
            return;
        }

        for loc in known {
            if !self.queue.contains(loc) {
                trace!("Rotation queue: appending {}", loc);
                self.queue.push(*loc);
            }
        }
    }

    /// Next lighthouse worth heading for, walking forward from the cursor.
    ///
    /// Lighthouses the agent owns are skipped unless an opposing lighthouse lies
    /// within `defense_range` of them. Arriving on the cursor's lighthouse
    /// advances the cursor.
    pub fn next_target(
        &mut self,
        current: Location,
        snapshot: &TurnSnapshot,
        me: PlayerId,
        defense_range: u8,
    ) -> Option<Location> {
        let len = self.queue.len();
        if len == 0 {
            return None;
        }
        if self.cursor >= len {
            self.cursor = 0;
        }
        if self.queue[self.cursor] == current {
            self.cursor = (self.cursor + 1) % len;
        }

        for step in 0..len {
            let index = (self.cursor + step) % len;
            let candidate = self.queue[index];
            if candidate == current {
                continue;
            }

            let owned = snapshot
                .lighthouse_at(candidate)
                .map(|lh| lh.is_owned_by(me))
                .unwrap_or(false);
            if owned && !snapshot.opponent_within(me, candidate, defense_range) {
                continue;
            }

            self.cursor = index;
            return Some(candidate);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(x: u8, y: u8) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn built_once_by_class_then_appended() {
        let mut rotation = RotationQueue::default();
        rotation.sync(&[]);
        assert!(rotation.is_empty());

        rotation.sync(&[loc(5, 5), loc(0, 7), loc(14, 14), loc(3, 3), loc(0, 0)]);
        assert_eq!(
            rotation.entries(),
            &[loc(14, 14), loc(0, 0), loc(0, 7), loc(5, 5), loc(3, 3)]
        );

        rotation.sync(&[loc(5, 5), loc(0, 7), loc(14, 14), loc(3, 3), loc(0, 0), loc(14, 0)]);
        assert_eq!(rotation.entries().last(), Some(&loc(14, 0)));
        assert_eq!(rotation.len(), 6);
    }

    #[test]
    fn skips_owned_unless_threatened() {
        let mut rotation = RotationQueue::default();
        rotation.sync(&[loc(0, 0), loc(14, 14), loc(6, 6)]);

        let snapshot = TurnSnapshot::new(
            loc(7, 7),
            50,
            vec![
                Lighthouse::new(loc(0, 0), 1, 10),
                Lighthouse::new(loc(14, 14), 1, 10),
                Lighthouse::new(loc(6, 6), 2, 10),
            ],
        );
        assert_eq!(rotation.next_target(loc(7, 7), &snapshot, 1, 4), Some(loc(6, 6)));

        let threatened = TurnSnapshot::new(
            loc(7, 7),
            50,
            vec![
                Lighthouse::new(loc(0, 0), 1, 10),
                Lighthouse::new(loc(14, 14), 1, 10),
                Lighthouse::new(loc(12, 12), 2, 10),
            ],
        );
        let mut fresh = RotationQueue::default();
        fresh.sync(&[loc(0, 0), loc(14, 14)]);
        assert_eq!(fresh.next_target(loc(7, 7), &threatened, 1, 4), Some(loc(14, 14)));
    }

    #[test]
    fn advances_on_arrival_and_wraps() {
        let mut rotation = RotationQueue::default();
        rotation.sync(&[loc(0, 0), loc(14, 0)]);
        let snapshot = TurnSnapshot::new(loc(0, 0), 50, Vec::new());

        assert_eq!(rotation.next_target(loc(7, 7), &snapshot, 1, 4), Some(loc(0, 0)));
        assert_eq!(rotation.next_target(loc(0, 0), &snapshot, 1, 4), Some(loc(14, 0)));
        assert_eq!(rotation.next_target(loc(14, 0), &snapshot, 1, 4), Some(loc(0, 0)));
    }

    #[test]
    fn nothing_left_to_visit() {
        let mut rotation = RotationQueue::default();
        rotation.sync(&[loc(0, 0)]);
        let snapshot = TurnSnapshot::new(loc(0, 0), 50, vec![Lighthouse::new(loc(0, 0), 1, 10)]);
        assert_eq!(rotation.next_target(loc(0, 0), &snapshot, 1, 4), None);
        assert_eq!(RotationQueue::default().next_target(loc(0, 0), &snapshot, 1, 4), None);
    }
}
