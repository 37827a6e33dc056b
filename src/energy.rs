//! EnergyAllocator: how much of the agent's energy may be spent this turn.
//!
//! The reserve is a phase base, raised when an opposing lighthouse sits
//! within `HOSTILE_RESERVE_RADIUS` of the agent and lowered once the agent
//! holds `TERRITORY_DISCOUNT_COUNT` or more lighthouses.

use crate::constants::*;
use crate::profile::EngineProfile;
use crate::snapshot::*;
use crate::state::GamePhase;
use log::*;

/// Energy the agent keeps back this turn.
pub fn reserve(
    snapshot: &TurnSnapshot,
    me: PlayerId,
    phase: GamePhase,
    profile: &EngineProfile,
) -> u32 {
    let base = match phase {
        GamePhase::Early => profile.early_reserve,
        GamePhase::Mid => profile.mid_reserve,
        GamePhase::Late => profile.late_reserve,
    };

    let hostile = snapshot.opponent_within(me, snapshot.position, HOSTILE_RESERVE_RADIUS);
    let with_bonus = if hostile {
        base.saturating_add(profile.hostile_reserve_bonus)
    } else {
        base
    };

    let owned = snapshot.owned_by(me).count();
    if owned >= TERRITORY_DISCOUNT_COUNT {
        with_bonus.saturating_sub(profile.territory_discount)
    } else {
        with_bonus
    }
}

/// Energy available for an action needing `needed`: never more than the
/// agent holds minus the reserve. Zero means the caller cannot act.
pub fn allocate(
    snapshot: &TurnSnapshot,
    me: PlayerId,
    needed: u32,
    phase: GamePhase,
    profile: &EngineProfile,
) -> u32 {
    let held_back = reserve(snapshot, me, phase, profile);
    let available = snapshot.energy.saturating_sub(held_back);
    let granted = available.min(needed);
    trace!(
        "Energy: have {}, reserve {}, need {}, granted {}",
        snapshot.energy,
        held_back,
        needed,
        granted
    );
    granted
}

/// Preferred attack size against a lighthouse holding `lighthouse_energy`,
/// before the reserve is applied.
///
/// With surplus commitment off this is just the capture threshold. With it
/// on, a large surplus over the threshold is partly committed as well so the
/// captured lighthouse starts harder to take back.
pub fn desired_commit(lighthouse_energy: u32, energy: u32, profile: &EngineProfile) -> u32 {
    let minimum = lighthouse_energy.saturating_add(1);
    if !profile.surplus_commit || energy <= minimum {
        return minimum;
    }

    let ratio = energy / minimum;
    if ratio >= 3 {
        minimum
            .saturating_add(lighthouse_energy / 2)
            .min(energy / 2)
            .max(minimum)
    } else if ratio >= 2 {
        minimum
            .saturating_add(lighthouse_energy / 4)
            .min(energy.saturating_sub(SURPLUS_FLOOR).max(minimum))
    } else {
        minimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::*;

    fn loc(x: u8, y: u8) -> Location {
        Location::from_coords(x, y)
    }

    #[test]
    fn reserve_grows_with_phase() {
        let profile = EngineProfile::balanced();
        let snapshot = TurnSnapshot::new(loc(7, 7), 100, Vec::new());
        let early = reserve(&snapshot, 1, GamePhase::Early, &profile);
        let mid = reserve(&snapshot, 1, GamePhase::Mid, &profile);
        let late = reserve(&snapshot, 1, GamePhase::Late, &profile);
        assert!(early < mid && mid < late);
        assert_eq!(early, profile.early_reserve);
    }

    #[test]
    fn hostile_neighbour_raises_reserve() {
        let profile = EngineProfile::balanced();
        let calm = TurnSnapshot::new(loc(7, 7), 100, vec![Lighthouse::new(loc(12, 12), 2, 10)]);
        let tense = TurnSnapshot::new(loc(7, 7), 100, vec![Lighthouse::new(loc(9, 9), 2, 10)]);

        assert_eq!(
            reserve(&tense, 1, GamePhase::Mid, &profile),
            reserve(&calm, 1, GamePhase::Mid, &profile) + profile.hostile_reserve_bonus
        );
    }

    #[test]
    fn territory_lowers_reserve() {
        let profile = EngineProfile::balanced();
        let snapshot = TurnSnapshot::new(
            loc(7, 7),
            100,
            vec![
                Lighthouse::new(loc(0, 0), 1, 10),
                Lighthouse::new(loc(0, 14), 1, 10),
                Lighthouse::new(loc(14, 0), 1, 10),
            ],
        );
        assert_eq!(
            reserve(&snapshot, 1, GamePhase::Early, &profile),
            profile.early_reserve.saturating_sub(profile.territory_discount)
        );
    }

    #[test]
    fn allocation_is_capped() {
        let profile = EngineProfile::balanced();
        let poor = TurnSnapshot::new(loc(7, 7), 5, Vec::new());
        assert_eq!(allocate(&poor, 1, 11, GamePhase::Early, &profile), 0);

        let rich = TurnSnapshot::new(loc(7, 7), 100, Vec::new());
        assert_eq!(allocate(&rich, 1, 11, GamePhase::Early, &profile), 11);
        assert_eq!(allocate(&rich, 1, 500, GamePhase::Early, &profile), 90);
    }

    #[test]
    fn surplus_tiers() {
        let profile = EngineProfile::balanced();
        // 100 / 11 >= 3: min(11 + 5, 50)
        assert_eq!(desired_commit(10, 100, &profile), 16);
        // 50 / 21 == 2: min(21 + 5, max(0, 21))
        assert_eq!(desired_commit(20, 50, &profile), 21);
        // 90 / 41 == 2: min(41 + 10, 40.max(41))
        assert_eq!(desired_commit(40, 90, &profile), 41);
        // 150 / 61 == 2: min(61 + 15, 100)
        assert_eq!(desired_commit(60, 150, &profile), 76);
        assert_eq!(desired_commit(10, 15, &profile), 11);

        let flat = EngineProfile {
            surplus_commit: false,
            ..EngineProfile::balanced()
        };
        assert_eq!(desired_commit(10, 100, &flat), 11);
    }

    #[test]
    fn commit_never_below_threshold() {
        let profile = EngineProfile::balanced();
        for lh in 0..60 {
            for energy in 0..300 {
                assert!(desired_commit(lh, energy, &profile) >= lh + 1);
            }
        }
    }
}
