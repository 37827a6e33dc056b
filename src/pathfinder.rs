//! A* routing across the board with a bounded LRU cache of results.
//!
//! Movement is 8-directional with unit step cost. Obstacles are supplied per
//! call (threat zones plus unplayable cells); the start and goal cells are
//! never treated as blocked, so a lighthouse sitting inside a threat zone can
//! still be reached.

use crate::board::*;
use crate::location::*;
use crate::profile::PathHeuristic;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use pathfinding::directed::astar::astar;
use std::collections::VecDeque;

/// Cache key: start, goal, the sorted obstacle set and the heuristic in use.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PathKey {
    start: Location,
    goal: Location,
    obstacles: Vec<Location>,
    heuristic: PathHeuristic,
}

/// Least-recently-used cache of search results, including "no path" results.
#[derive(Clone, Debug)]
pub struct PathCache {
    capacity: usize,
    entries: FnvHashMap<PathKey, Option<Vec<Location>>>,
    order: VecDeque<PathKey>,
    hits: u64,
    misses: u64,
}

impl Default for PathCache {
    fn default() -> Self {
        PathCache::with_capacity(256)
    }
}

impl PathCache {
    pub fn with_capacity(capacity: usize) -> Self {
        PathCache {
            capacity: capacity.max(1),
            entries: FnvHashMap::default(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    fn get(&mut self, key: &PathKey) -> Option<Option<Vec<Location>>> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
            if let Some(index) = self.order.iter().position(|k| k == key) {
                if let Some(k) = self.order.remove(index) {
                    self.order.push_back(k);
                }
            }
        } else {
            self.misses += 1;
        }
        found
    }

    fn insert(&mut self, key: PathKey, path: Option<Vec<Location>>) {
        if self.entries.insert(key.clone(), path).is_none() {
            self.order.push_back(key);
        }
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Find a path, answering from the cache when the same query was seen before.
    ///
    /// The returned path starts at `start` and ends at `goal`; `[start]` when they
    /// coincide. `None` when the goal is unreachable.
    pub fn find_path(
        &mut self,
        start: Location,
        goal: Location,
        obstacles: &FnvHashSet<Location>,
        heuristic: PathHeuristic,
    ) -> Option<Vec<Location>> {
        let mut sorted: Vec<Location> = obstacles.iter().copied().collect();
        sorted.sort_unstable();

        let key = PathKey {
            start,
            goal,
            obstacles: sorted,
            heuristic,
        };

        if let Some(cached) = self.get(&key) {
            trace!("Path cache hit {} -> {} (hits={})", start, goal, self.hits);
            return cached;
        }

        let path = find_path(start, goal, obstacles, heuristic);
        self.insert(key, path.clone());
        path
    }
}

/// Uncached A* search.
pub fn find_path(
    start: Location,
    goal: Location,
    obstacles: &FnvHashSet<Location>,
    heuristic: PathHeuristic,
) -> Option<Vec<Location>> {
    if start == goal {
        return Some(vec![start]);
    }

    let result = astar(
        &start,
        |&loc| {
            neighbors(loc)
                .filter(|n| *n == goal || !obstacles.contains(n))
                .map(|n| (n, 1u32))
                .collect::<Vec<_>>()
        },
        |&loc| match heuristic {
            PathHeuristic::Chebyshev => loc.distance_to(goal) as u32,
            PathHeuristic::Manhattan => loc.manhattan_distance_to(goal),
        },
        |&loc| loc == goal,
    );

    result.map(|(path, _cost)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn loc(x: u8, y: u8) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn open_board_path_length_is_chebyshev() {
        let none = FnvHashSet::default();
        for &(a, b) in &[
            (loc(0, 0), loc(14, 14)),
            (loc(3, 9), loc(12, 1)),
            (loc(7, 7), loc(7, 0)),
            (loc(2, 2), loc(3, 3)),
        ] {
            let path = find_path(a, b, &none, PathHeuristic::Chebyshev).unwrap();
            assert_eq!(path.first(), Some(&a));
            assert_eq!(path.last(), Some(&b));
            assert_eq!(path.len() - 1, a.distance_to(b) as usize);
            for pair in path.windows(2) {
                assert!(pair[0].is_adjacent(pair[1]));
            }
        }
    }

    #[test]
    fn start_equals_goal() {
        let none = FnvHashSet::default();
        assert_eq!(
            find_path(loc(4, 4), loc(4, 4), &none, PathHeuristic::Chebyshev),
            Some(vec![loc(4, 4)])
        );
    }

    #[test]
    fn routes_around_a_wall() {
        // Wall at x = 5 with a single gap at y = 14.
        let wall: FnvHashSet<Location> = (0..BOARD_HEIGHT - 1).map(|y| loc(5, y)).collect();
        let path = find_path(loc(2, 2), loc(8, 2), &wall, PathHeuristic::Chebyshev).unwrap();

        assert!(path.iter().all(|p| !wall.contains(p)));
        assert!(path.contains(&loc(5, 14)));
    }

    #[test]
    fn unreachable_goal_is_none() {
        let ring: FnvHashSet<Location> = neighbors(loc(7, 7)).collect();
        assert_eq!(
            find_path(loc(0, 0), loc(7, 7), &ring, PathHeuristic::Chebyshev),
            None
        );
    }

    #[test]
    fn goal_inside_obstacles_is_still_reachable() {
        let obstacles: FnvHashSet<Location> = [loc(3, 3)].into_iter().collect();
        let path = find_path(loc(0, 0), loc(3, 3), &obstacles, PathHeuristic::Chebyshev).unwrap();
        assert_eq!(path.last(), Some(&loc(3, 3)));
    }

    #[test]
    fn cache_hits_and_evicts() {
        let mut cache = PathCache::with_capacity(2);
        let none = FnvHashSet::default();

        let first = cache.find_path(loc(0, 0), loc(5, 5), &none, PathHeuristic::Chebyshev);
        let again = cache.find_path(loc(0, 0), loc(5, 5), &none, PathHeuristic::Chebyshev);
        assert_eq!(first, again);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        cache.find_path(loc(1, 0), loc(5, 5), &none, PathHeuristic::Chebyshev);
        cache.find_path(loc(2, 0), loc(5, 5), &none, PathHeuristic::Chebyshev);
        assert_eq!(cache.len(), 2);

        // The first query was least recently used and has been evicted.
        cache.find_path(loc(0, 0), loc(5, 5), &none, PathHeuristic::Chebyshev);
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn obstacle_set_is_part_of_the_key() {
        let mut cache = PathCache::with_capacity(8);
        let none = FnvHashSet::default();
        let blocked: FnvHashSet<Location> = [loc(1, 1)].into_iter().collect();

        let open = cache.find_path(loc(0, 0), loc(2, 2), &none, PathHeuristic::Chebyshev);
        let detour = cache.find_path(loc(0, 0), loc(2, 2), &blocked, PathHeuristic::Chebyshev);
        assert_eq!(cache.misses(), 2);
        assert_ne!(open, detour);
    }
}
