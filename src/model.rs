use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const SAVE_VERSION: u32 = 1;

pub(crate) const FRESH_HYDRATION: f64 = 70.0;
pub(crate) const FRESH_HEALTH: f64 = 85.0;

/// The "never boosted" marker for `sunlight_boost_until`.
pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlantState {
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_tick_at: DateTime<Utc>,
    pub(crate) growth: f64,
    pub(crate) hydration: f64,
    pub(crate) health: f64,
    pub(crate) last_action_at: DateTime<Utc>,
    pub(crate) sunlight_boost_until: DateTime<Utc>,
}

impl PlantState {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            last_tick_at: now,
            growth: 0.0,
            hydration: FRESH_HYDRATION,
            health: FRESH_HEALTH,
            last_action_at: now,
            sunlight_boost_until: epoch(),
        }
    }

    pub(crate) fn boost_active(&self, now: DateTime<Utc>) -> bool {
        now < self.sunlight_boost_until
    }

    /// Seconds since the Unix epoch, floored; the vine generator's seed source.
    pub(crate) fn seed_secs(&self) -> i64 {
        self.created_at.timestamp_millis().div_euclid(1000)
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.growth.is_finite()
            && self.growth >= 0.0
            && (0.0..=100.0).contains(&self.hydration)
            && (0.0..=100.0).contains(&self.health)
            && self.last_tick_at >= self.created_at
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct SaveFile {
    pub(crate) version: u32,
    pub(crate) plant: PlantState,
}

impl SaveFile {
    pub(crate) fn new(plant: PlantState) -> Self {
        Self {
            version: SAVE_VERSION,
            plant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fresh_plant_defaults() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let p = PlantState::new(now);
        assert_eq!(p.growth, 0.0);
        assert_eq!(p.hydration, 70.0);
        assert_eq!(p.health, 85.0);
        assert_eq!(p.created_at, now);
        assert_eq!(p.last_tick_at, now);
        assert_eq!(p.last_action_at, now);
        assert!(!p.boost_active(now));
        assert!(p.is_well_formed());
    }

    #[test]
    fn seed_secs_floors_pre_epoch_instants() {
        let t = Utc.timestamp_millis_opt(-1500).unwrap();
        let p = PlantState::new(t);
        assert_eq!(p.seed_secs(), -2);

        let t = Utc.timestamp_millis_opt(1_700_000_000_999).unwrap();
        assert_eq!(PlantState::new(t).seed_secs(), 1_700_000_000);
    }

    #[test]
    fn out_of_range_state_is_not_well_formed() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let mut p = PlantState::new(now);
        p.hydration = 140.0;
        assert!(!p.is_well_formed());
        let mut p = PlantState::new(now);
        p.growth = f64::NAN;
        assert!(!p.is_well_formed());
    }
}
