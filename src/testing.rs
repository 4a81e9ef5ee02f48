//! Test fixtures: a fixed clock and ready-made scheduling states.
//!
//! Everything here is deterministic so scheduler and session tests can
//! compare exact timestamps.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{Card, Phase, SchedulingState, StoredSchedule};

/// The instant every test treats as "now"
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Learning-phase state at the given step
pub fn learning_state(step_index: usize) -> SchedulingState {
    SchedulingState {
        step_index,
        last_reviewed_at: Some(fixed_now() - Duration::days(1)),
        ..SchedulingState::new(2.5, fixed_now() - Duration::days(1))
    }
}

/// Review-phase state with a few prior repetitions
pub fn review_state(interval_days: f64, ease: f64) -> SchedulingState {
    SchedulingState {
        phase: Phase::Review,
        ease,
        interval_days,
        repetitions: 3,
        ..learning_state(0)
    }
}

/// Relearning-phase state after one lapse
pub fn relearning_state(step_index: usize, pending_interval_days: Option<f64>) -> SchedulingState {
    SchedulingState {
        phase: Phase::Relearning,
        ease: 2.3,
        interval_days: 10.0,
        repetitions: 3,
        lapses: 1,
        step_index,
        pending_interval_days,
        ..learning_state(0)
    }
}

/// Cards numbered `1..=n`
pub fn cards(n: i64) -> Vec<Card> {
    (1..=n)
        .map(|id| Card::new(id, format!("front {id}"), format!("back {id}")))
        .collect()
}

/// Persisted schedule for `card_id`, due `offset` from `fixed_now()`
pub fn schedule(card_id: i64, state: SchedulingState, offset: Duration) -> StoredSchedule {
    StoredSchedule {
        card_id,
        state,
        due_at: fixed_now() + offset,
    }
}
