//! Tuning profiles. The engine has one code path; its behavioural variants
//! (more aggressive, more defensive, stricter about link crossings, ...) are
//! named presets of the same parameter set.

use crate::constants::*;
use crate::error::ProfileError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Heuristic used by the A* search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathHeuristic {
    /// Exact lower bound for unit-cost 8-directional movement.
    Chebyshev,
    /// Overestimates diagonals; finds a path faster but not always a shortest one
    /// once obstacles are involved.
    Manhattan,
}

/// Names accepted by `EngineProfile::from_str`.
pub const PRESET_NAMES: [&str; 6] = [
    "balanced",
    "aggressive",
    "defensive",
    "expansionist",
    "strict",
    "opportunist",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineProfile {
    pub name: String,
    /// Turns strictly before this are the early phase.
    pub early_phase_until: u32,
    /// Turns from this on are the late phase.
    pub late_phase_from: u32,
    pub early_reserve: u32,
    pub mid_reserve: u32,
    pub late_reserve: u32,
    /// Added to the reserve when an opposing lighthouse is within `HOSTILE_RESERVE_RADIUS`.
    pub hostile_reserve_bonus: u32,
    /// Removed from the reserve once the agent owns `TERRITORY_DISCOUNT_COUNT` lighthouses.
    pub territory_discount: u32,
    pub defense_range: u8,
    pub threat_span: u8,
    /// Turns a threat zone survives without being reinforced. `None` keeps zones forever.
    pub threat_ttl: Option<u32>,
    /// Route around threat zones.
    pub avoid_threats: bool,
    pub path_cache_capacity: usize,
    /// Reject links that would cross an existing link.
    pub check_crossings: bool,
    pub urgency_threshold: f32,
    /// Multiplier on capture urgency.
    pub aggression: f32,
    /// While owning at most this many lighthouses, keep recharging the one under the agent.
    pub camping_limit: usize,
    /// Commit more than the bare capture threshold when energy is plentiful.
    pub surplus_commit: bool,
    /// Random directions to try before conceding a Pass.
    pub expansion_retries: u8,
    pub heuristic: PathHeuristic,
    pub history_len: usize,
}

impl Default for EngineProfile {
    fn default() -> Self {
        EngineProfile::balanced()
    }
}

impl EngineProfile {
    pub fn balanced() -> Self {
        EngineProfile {
            name: "balanced".to_string(),
            early_phase_until: 25,
            late_phase_from: 100,
            early_reserve: 10,
            mid_reserve: 25,
            late_reserve: 40,
            hostile_reserve_bonus: 20,
            territory_discount: 10,
            defense_range: DEFAULT_DEFENSE_RANGE,
            threat_span: DEFAULT_THREAT_SPAN,
            threat_ttl: Some(40),
            avoid_threats: true,
            path_cache_capacity: 256,
            check_crossings: false,
            urgency_threshold: 50.0,
            aggression: 1.0,
            camping_limit: 2,
            surplus_commit: true,
            expansion_retries: 0,
            heuristic: PathHeuristic::Chebyshev,
            history_len: 64,
        }
    }

    pub fn aggressive() -> Self {
        EngineProfile {
            name: "aggressive".to_string(),
            early_reserve: 5,
            mid_reserve: 10,
            late_reserve: 25,
            hostile_reserve_bonus: 10,
            threat_ttl: Some(20),
            urgency_threshold: 40.0,
            aggression: 1.5,
            camping_limit: 1,
            ..EngineProfile::balanced()
        }
    }

    pub fn defensive() -> Self {
        EngineProfile {
            name: "defensive".to_string(),
            early_reserve: 20,
            mid_reserve: 40,
            late_reserve: 60,
            hostile_reserve_bonus: 30,
            defense_range: DEFAULT_DEFENSE_RANGE + 1,
            threat_ttl: None,
            urgency_threshold: 60.0,
            aggression: 0.75,
            camping_limit: 3,
            ..EngineProfile::balanced()
        }
    }

    pub fn expansionist() -> Self {
        EngineProfile {
            name: "expansionist".to_string(),
            early_phase_until: 30,
            urgency_threshold: 45.0,
            camping_limit: 1,
            expansion_retries: 4,
            ..EngineProfile::balanced()
        }
    }

    pub fn strict() -> Self {
        EngineProfile {
            name: "strict".to_string(),
            check_crossings: true,
            threat_ttl: None,
            ..EngineProfile::balanced()
        }
    }

    pub fn opportunist() -> Self {
        EngineProfile {
            name: "opportunist".to_string(),
            avoid_threats: false,
            threat_ttl: None,
            urgency_threshold: 35.0,
            aggression: 1.25,
            heuristic: PathHeuristic::Manhattan,
            ..EngineProfile::balanced()
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.early_phase_until >= self.late_phase_from {
            return Err(ProfileError::PhaseOrder {
                early_until: self.early_phase_until,
                late_from: self.late_phase_from,
            });
        }
        if self.path_cache_capacity == 0 {
            return Err(ProfileError::ZeroCacheCapacity);
        }
        if !self.urgency_threshold.is_finite() {
            return Err(ProfileError::NonFiniteThreshold(self.urgency_threshold));
        }
        if !self.aggression.is_finite() || self.aggression < 0.0 {
            return Err(ProfileError::InvalidAggression(self.aggression));
        }
        Ok(())
    }
}

impl FromStr for EngineProfile {
    type Err = ProfileError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(EngineProfile::balanced()),
            "aggressive" => Ok(EngineProfile::aggressive()),
            "defensive" => Ok(EngineProfile::defensive()),
            "expansionist" => Ok(EngineProfile::expansionist()),
            "strict" => Ok(EngineProfile::strict()),
            "opportunist" => Ok(EngineProfile::opportunist()),
            other => Err(ProfileError::UnknownPreset(other.to_string())),
        }
    }
}
