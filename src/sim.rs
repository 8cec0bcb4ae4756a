use crate::model::PlantState;
use crate::stages::{next_threshold, stage_index};
use chrono::{DateTime, Duration as ChronoDuration, Utc};

pub(crate) const MS_PER_HOUR: f64 = 3_600_000.0;

pub(crate) const HYDRATION_DECAY_PER_HOUR: f64 = 8.0;
pub(crate) const HEALTH_SET_POINT: f64 = 55.0;
pub(crate) const HEALTH_TREND_PER_HOUR: f64 = 10.0;
pub(crate) const BASE_GROWTH_PER_HOUR: f64 = 6.0;
pub(crate) const SUN_BOOST: f64 = 1.35;
pub(crate) const SUN_BOOST_MINUTES: i64 = 30;
pub(crate) const STALL_RATE: f64 = 0.2;

const WATER_HYDRATION: f64 = 25.0;
const WATER_HEALTH: f64 = 4.0;
const SUN_HEALTH: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlantAction {
    Water,
    Sunlight,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Eta {
    /// Already at the last stage.
    Maxed,
    /// Growth has near-stalled; no meaningful estimate.
    NeedsCare,
    /// Simulated time until the next stage.
    Remaining(ChronoDuration),
}

impl Eta {
    /// Converts a simulated-time estimate into wall-clock time at `time_scale`.
    pub(crate) fn wall_clock(self, time_scale: f64) -> Self {
        match self {
            Eta::Remaining(d) => {
                let ms = d.num_milliseconds() as f64 / effective_scale(time_scale);
                Eta::Remaining(ChronoDuration::milliseconds(ms.round() as i64))
            }
            other => other,
        }
    }
}

fn clamp_meter(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

pub(crate) fn effective_scale(time_scale: f64) -> f64 {
    if time_scale.is_finite() && time_scale > 0.0 {
        time_scale
    } else {
        1.0
    }
}

pub(crate) fn growth_rate(hydration: f64, health: f64, boosted: bool) -> f64 {
    let sun = if boosted { SUN_BOOST } else { 1.0 };
    let hydration_factor = (hydration / 80.0).clamp(0.0, 1.2);
    let health_factor = (health / 85.0).clamp(0.0, 1.2);
    BASE_GROWTH_PER_HOUR * hydration_factor * health_factor * sun
}

/// Instantaneous growth points per simulated hour at `now`.
pub(crate) fn current_rate(state: &PlantState, now: DateTime<Utc>) -> f64 {
    growth_rate(state.hydration, state.health, state.boost_active(now))
}

/// Integrates dynamics from `last_tick_at` up to `now`.
pub(crate) fn advance(state: &PlantState, now: DateTime<Utc>, time_scale: f64) -> PlantState {
    let elapsed_ms = (now - state.last_tick_at).num_milliseconds().max(0);
    advance_by(state, elapsed_ms as f64, time_scale, now)
}

/// Integrates an explicit elapsed wall-clock span. Order matters: hydration
/// first, then health from the new hydration, then growth from both.
pub(crate) fn advance_by(
    state: &PlantState,
    elapsed_ms: f64,
    time_scale: f64,
    now: DateTime<Utc>,
) -> PlantState {
    let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };
    let hours = elapsed_ms * effective_scale(time_scale) / MS_PER_HOUR;

    let mut next = state.clone();

    next.hydration = clamp_meter(next.hydration - hours * HYDRATION_DECAY_PER_HOUR);

    let delta = (next.hydration - HEALTH_SET_POINT) / HEALTH_SET_POINT;
    next.health = clamp_meter(next.health + hours * delta * HEALTH_TREND_PER_HOUR);

    let rate = growth_rate(next.hydration, next.health, next.boost_active(now));
    next.growth = next.growth.max(next.growth + hours * rate);

    next.last_tick_at = next.last_tick_at.max(now);
    next
}

pub(crate) fn water(state: &PlantState, now: DateTime<Utc>) -> PlantState {
    let mut next = state.clone();
    next.hydration = clamp_meter(next.hydration + WATER_HYDRATION);
    next.health = clamp_meter(next.health + WATER_HEALTH);
    next.last_action_at = now;
    next
}

pub(crate) fn apply_sunlight(state: &PlantState, now: DateTime<Utc>) -> PlantState {
    let mut next = state.clone();
    next.sunlight_boost_until = now + ChronoDuration::minutes(SUN_BOOST_MINUTES);
    next.health = clamp_meter(next.health + SUN_HEALTH);
    next.last_action_at = now;
    next
}

pub(crate) fn reset(now: DateTime<Utc>) -> PlantState {
    PlantState::new(now)
}

/// Runs one user action: catch up to `now`, adjust, then settle with a
/// zero-elapsed tick so rates reflect the new meters.
pub(crate) fn dispatch(
    state: &PlantState,
    action: PlantAction,
    now: DateTime<Utc>,
    time_scale: f64,
) -> PlantState {
    let adjusted = match action {
        PlantAction::Reset => return reset(now),
        PlantAction::Water => water(&advance(state, now, time_scale), now),
        PlantAction::Sunlight => apply_sunlight(&advance(state, now, time_scale), now),
    };
    advance_by(&adjusted, 0.0, time_scale, now)
}

pub(crate) fn eta(state: &PlantState, now: DateTime<Utc>) -> Eta {
    let Some(next) = next_threshold(stage_index(state.growth)) else {
        return Eta::Maxed;
    };
    let rate = current_rate(state, now);
    if rate <= STALL_RATE {
        return Eta::NeedsCare;
    }
    let ms = (next - state.growth).max(0.0) / rate * MS_PER_HOUR;
    Eta::Remaining(ChronoDuration::milliseconds(ms.ceil() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
    }

    fn plant(growth: f64, hydration: f64, health: f64) -> PlantState {
        let mut p = PlantState::new(t0());
        p.growth = growth;
        p.hydration = hydration;
        p.health = health;
        p
    }

    #[test]
    fn one_hour_on_fresh_plant() {
        let p = PlantState::new(t0());
        let later = t0() + ChronoDuration::hours(1);
        let n = advance(&p, later, 1.0);

        assert!((n.hydration - 62.0).abs() < 1e-9);
        let expected_health = 85.0 + (62.0 - 55.0) / 55.0 * 10.0;
        assert!((n.health - expected_health).abs() < 1e-9);
        assert!(n.health > 85.0);
        let expected_growth = 6.0 * (62.0 / 80.0) * (expected_health / 85.0);
        assert!((n.growth - expected_growth).abs() < 1e-9);
        assert_eq!(n.last_tick_at, later);
        assert_eq!(n.created_at, p.created_at);
    }

    #[test]
    fn time_scale_compresses_hours() {
        let p = PlantState::new(t0());
        let fast = advance(&p, t0() + ChronoDuration::minutes(1), 60.0);
        let slow = advance(&p, t0() + ChronoDuration::hours(1), 1.0);
        assert!((fast.hydration - slow.hydration).abs() < 1e-9);
        assert!((fast.growth - slow.growth).abs() < 1e-9);
    }

    #[test]
    fn bad_scale_falls_back_to_real_time() {
        let p = PlantState::new(t0());
        let later = t0() + ChronoDuration::hours(1);
        assert_eq!(advance(&p, later, 0.0), advance(&p, later, 1.0));
        assert_eq!(advance(&p, later, f64::NAN), advance(&p, later, 1.0));
    }

    #[test]
    fn clock_skew_is_a_no_op() {
        let p = plant(20.0, 50.0, 50.0);
        let n = advance(&p, t0() - ChronoDuration::minutes(5), 1.0);
        assert_eq!(n.hydration, 50.0);
        assert_eq!(n.health, 50.0);
        assert_eq!(n.growth, 20.0);
        assert_eq!(n.last_tick_at, t0());
    }

    #[test]
    fn drought_drains_to_zero_and_hurts_health() {
        let p = plant(0.0, 10.0, 40.0);
        let n = advance(&p, t0() + ChronoDuration::hours(2), 1.0);
        assert_eq!(n.hydration, 0.0);
        assert!((n.health - 20.0).abs() < 1e-9);
        assert_eq!(n.growth, 0.0);
    }

    #[test]
    fn water_adds_and_clamps() {
        let n = water(&plant(0.0, 40.0, 50.0), t0());
        assert_eq!(n.hydration, 65.0);
        assert_eq!(n.health, 54.0);
        assert_eq!(n.last_action_at, t0());

        let n = water(&plant(0.0, 90.0, 98.0), t0());
        assert_eq!(n.hydration, 100.0);
        assert_eq!(n.health, 100.0);
    }

    #[test]
    fn sunlight_boost_window() {
        let p = apply_sunlight(&plant(0.0, 80.0, 85.0), t0());
        assert_eq!(p.health, 87.0);
        assert_eq!(p.sunlight_boost_until, t0() + ChronoDuration::minutes(30));

        let at_29 = t0() + ChronoDuration::minutes(29);
        let at_31 = t0() + ChronoDuration::minutes(31);
        assert!((current_rate(&p, at_29) - growth_rate(80.0, 87.0, false) * 1.35).abs() < 1e-9);
        assert!((current_rate(&p, at_31) - growth_rate(80.0, 87.0, false)).abs() < 1e-9);

        let boosted = advance_by(&p, 60_000.0, 1.0, at_29);
        let plain = advance_by(&p, 60_000.0, 1.0, at_31);
        assert!(boosted.growth > plain.growth);
        let ratio = (boosted.growth - p.growth) / (plain.growth - p.growth);
        assert!((ratio - 1.35).abs() < 1e-9);
    }

    #[test]
    fn reset_yields_fresh_plant() {
        let later = t0() + ChronoDuration::days(3);
        let mut grown = apply_sunlight(&plant(300.0, 12.0, 20.0), later);
        grown.created_at = t0();
        let n = dispatch(&grown, PlantAction::Reset, later, 1.0);
        assert_eq!(n.growth, 0.0);
        assert_eq!(n.hydration, 70.0);
        assert_eq!(n.health, 85.0);
        assert!(!n.boost_active(later));
        assert_eq!(n.created_at, later);
        assert_eq!(n.last_tick_at, later);
    }

    #[test]
    fn dispatch_integrates_pending_time_first() {
        let p = plant(0.0, 40.0, 60.0);
        let later = t0() + ChronoDuration::hours(1);
        let n = dispatch(&p, PlantAction::Water, later, 1.0);
        assert!((n.hydration - (40.0 - 8.0 + 25.0)).abs() < 1e-9);
        assert!(n.growth > 0.0);
        assert_eq!(n.last_tick_at, later);
        assert_eq!(n.last_action_at, later);
    }

    #[test]
    fn eta_cases() {
        assert_eq!(eta(&plant(400.0, 80.0, 85.0), t0()), Eta::Maxed);
        assert_eq!(eta(&plant(10.0, 0.0, 85.0), t0()), Eta::NeedsCare);

        // 80/80 * 85/85 -> exactly the base rate.
        let p = plant(0.0, 80.0, 85.0);
        match eta(&p, t0()) {
            Eta::Remaining(d) => assert_eq!(d, ChronoDuration::hours(2)),
            other => panic!("unexpected eta {other:?}"),
        }
        match eta(&p, t0()).wall_clock(60.0) {
            Eta::Remaining(d) => assert_eq!(d, ChronoDuration::minutes(2)),
            other => panic!("unexpected eta {other:?}"),
        }
    }

    prop_compose! {
        fn any_plant()(
            growth in 0.0f64..500.0,
            hydration in 0.0f64..=100.0,
            health in 0.0f64..=100.0,
            boost_mins in -60i64..60,
        ) -> PlantState {
            let mut p = plant(growth, hydration, health);
            p.sunlight_boost_until = t0() + ChronoDuration::minutes(boost_mins);
            p
        }
    }

    proptest! {
        #[test]
        fn advance_keeps_meters_in_range(
            p in any_plant(),
            elapsed_ms in 0i64..(30 * 24 * 3_600_000),
            scale in 0.1f64..120.0,
        ) {
            let now = t0() + ChronoDuration::milliseconds(elapsed_ms);
            let n = advance(&p, now, scale);
            prop_assert!((0.0..=100.0).contains(&n.hydration));
            prop_assert!((0.0..=100.0).contains(&n.health));
            prop_assert!(n.growth >= p.growth);
            prop_assert!(n.last_tick_at >= p.last_tick_at);
            prop_assert!(stage_index(n.growth) >= stage_index(p.growth));
        }

        #[test]
        fn zero_elapsed_is_idempotent(p in any_plant(), scale in 0.1f64..120.0) {
            let n = advance(&p, p.last_tick_at, scale);
            prop_assert_eq!(n.hydration, p.hydration);
            prop_assert_eq!(n.health, p.health);
            prop_assert_eq!(n.growth, p.growth);
            prop_assert_eq!(n.last_tick_at, p.last_tick_at);
        }

        #[test]
        fn actions_keep_meters_in_range(p in any_plant(), pick in 0u8..2) {
            let action = if pick == 0 { PlantAction::Water } else { PlantAction::Sunlight };
            let n = dispatch(&p, action, t0(), 1.0);
            prop_assert!((0.0..=100.0).contains(&n.hydration));
            prop_assert!((0.0..=100.0).contains(&n.health));
            prop_assert!(n.growth >= p.growth);
        }
    }
}
