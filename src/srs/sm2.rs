//! SM-2 scheduling with learning and relearning steps.
//!
//! `apply_review` is a pure function of (previous state, grade, parameters,
//! now). It never reads the clock and never mutates its input.
//!
//! Phase machine:
//! - learning: walk `learning_steps`; "good" past the last step or "easy"
//!   graduates to review
//! - review: interval grows by ease; "again" is a lapse and enters relearning
//! - relearning: walk `relearning_steps`, then graduate back to review with the
//!   interval saved at lapse time

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::duration::{DurationError, DurationSpec, days_to_ms, ms_to_days};
use super::params::SchedulingParameters;
use crate::domain::{Grade, Phase, SchedulingState};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
  #[error(transparent)]
  Duration(#[from] DurationError),
  #[error("scheduling parameters have no learning steps")]
  NoLearningSteps,
  #[error("computed delay of {0} ms is negative")]
  NegativeDelay(i64),
  #[error("computed delay of {0} ms is out of range")]
  DelayOutOfRange(i64),
}

impl ScheduleError {
  pub fn user_message(&self) -> &'static str {
    match self {
      ScheduleError::Duration(e) => e.user_message(),
      ScheduleError::NoLearningSteps => "No learning steps configured",
      ScheduleError::NegativeDelay(_) | ScheduleError::DelayOutOfRange(_) => {
        "Scheduling parameters produce an invalid due date"
      }
    }
  }
}

/// Result of applying one grade
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
  pub state: SchedulingState,
  pub due_at: DateTime<Utc>,
}

/// Compute the next scheduling state and due time for a grade.
///
/// `previous = None` means the card has never been graded; it starts in
/// learning with the starting ease.
pub fn apply_review(
  previous: Option<&SchedulingState>,
  grade: Grade,
  params: &SchedulingParameters,
  now: DateTime<Utc>,
) -> Result<ReviewOutcome, ScheduleError> {
  let mut state = match previous {
    Some(prev) => prev.clone(),
    None => SchedulingState::new(params.starting_ease, now),
  };
  let phase_before = state.phase;
  let max_days = params.max_interval.to_days()?;

  let delay_ms = match state.phase {
    Phase::Learning => learning(&mut state, grade, params, max_days)?,
    Phase::Review => review(&mut state, grade, params, max_days)?,
    Phase::Relearning => relearning(&mut state, grade, params, max_days)?,
  };

  state.ease = state.ease.max(params.minimum_ease);
  state.interval_days = clamp_interval(state.interval_days, max_days);
  state.last_reviewed_at = Some(now);
  state.updated_at = now;

  // Parameters are not guaranteed to be validated
  if delay_ms < 0 {
    return Err(ScheduleError::NegativeDelay(delay_ms));
  }
  let delay =
    Duration::try_milliseconds(delay_ms).ok_or(ScheduleError::DelayOutOfRange(delay_ms))?;
  let due_at = now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC);

  tracing::debug!(
    grade = grade.as_str(),
    from = phase_before.as_str(),
    to = state.phase.as_str(),
    interval_days = state.interval_days,
    ease = state.ease,
    "applied review"
  );

  Ok(ReviewOutcome { state, due_at })
}

/// Learning phase; returns the delay until the card is due, in ms
fn learning(
  state: &mut SchedulingState,
  grade: Grade,
  params: &SchedulingParameters,
  max_days: f64,
) -> Result<i64, ScheduleError> {
  let steps = &params.learning_steps;

  match grade {
    Grade::Again => {
      state.step_index = 0;
      first_learning_step(steps)
    }
    Grade::Hard => match step_ms(steps, state.step_index)? {
      Some(current) => Ok(current),
      None => first_learning_step(steps),
    },
    Grade::Good => match next_step_ms(steps, state.step_index)? {
      Some(next) => {
        state.step_index += 1;
        Ok(next)
      }
      None => {
        let last = steps.last().ok_or(ScheduleError::NoLearningSteps)?.to_ms()?;
        let interval = ms_to_days(last) * params.interval_multiplier;
        Ok(graduate(state, interval, max_days))
      }
    },
    Grade::Easy => {
      let interval = params.easy_interval.to_days()? * params.interval_multiplier;
      state.ease += params.adjustments.easy_ease_bonus;
      Ok(graduate(state, interval, max_days))
    }
  }
}

fn first_learning_step(steps: &[DurationSpec]) -> Result<i64, ScheduleError> {
  step_ms(steps, 0)?.ok_or(ScheduleError::NoLearningSteps)
}

fn review(
  state: &mut SchedulingState,
  grade: Grade,
  params: &SchedulingParameters,
  max_days: f64,
) -> Result<i64, ScheduleError> {
  let adj = &params.adjustments;
  let mult = params.interval_multiplier;

  let interval = match grade {
    Grade::Again => {
      state.pending_interval_days =
        Some((state.interval_days * params.lapse_interval_multiplier).max(1.0));
      state.phase = Phase::Relearning;
      state.step_index = 0;
      state.lapses += 1;
      state.ease = (state.ease - adj.again_ease_penalty).max(params.minimum_ease);
      return Ok(params.forgot_interval.to_ms()?);
    }
    Grade::Hard => {
      state.ease = (state.ease - adj.hard_ease_penalty).max(params.minimum_ease);
      state.interval_days * adj.hard_interval_factor * mult
    }
    Grade::Good => state.interval_days * state.ease * mult,
    Grade::Easy => {
      let interval = state.interval_days * state.ease * params.easy_bonus * mult;
      state.ease += adj.easy_ease_bonus;
      interval
    }
  };

  state.interval_days = clamp_interval(interval, max_days);
  state.repetitions += 1;
  Ok(days_to_ms(state.interval_days))
}

fn relearning(
  state: &mut SchedulingState,
  grade: Grade,
  params: &SchedulingParameters,
  max_days: f64,
) -> Result<i64, ScheduleError> {
  let steps = &params.relearning_steps;

  match grade {
    Grade::Again => {
      state.step_index = 0;
      match step_ms(steps, 0)? {
        Some(first) => Ok(first),
        None => Ok(params.forgot_interval.to_ms()?),
      }
    }
    Grade::Hard => match step_ms(steps, state.step_index)? {
      Some(current) => Ok(current),
      None => match step_ms(steps, 0)? {
        Some(first) => Ok(first),
        None => Ok(params.forgot_interval.to_ms()?),
      },
    },
    Grade::Good => match next_step_ms(steps, state.step_index)? {
      Some(next) => {
        state.step_index += 1;
        Ok(next)
      }
      None => Ok(regraduate(state, params, max_days)),
    },
    Grade::Easy => Ok(regraduate(state, params, max_days)),
  }
}

/// Back to review after relearning, using the interval saved at lapse time
fn regraduate(state: &mut SchedulingState, params: &SchedulingParameters, max_days: f64) -> i64 {
  let interval = state
    .pending_interval_days
    .take()
    .unwrap_or_else(|| (state.interval_days * params.lapse_interval_multiplier).max(1.0));
  graduate(state, interval, max_days)
}

fn graduate(state: &mut SchedulingState, interval_days: f64, max_days: f64) -> i64 {
  state.phase = Phase::Review;
  state.step_index = 0;
  state.interval_days = clamp_interval(interval_days, max_days);
  state.repetitions += 1;
  days_to_ms(state.interval_days)
}

fn step_ms(steps: &[DurationSpec], index: usize) -> Result<Option<i64>, DurationError> {
  steps.get(index).map(|s| s.to_ms()).transpose()
}

/// Step after `index`. A stored index can be anything, so `usize::MAX` has
/// no next step rather than overflowing.
fn next_step_ms(steps: &[DurationSpec], index: usize) -> Result<Option<i64>, DurationError> {
  match index.checked_add(1) {
    Some(next) => step_ms(steps, next),
    None => Ok(None),
  }
}

/// Interval in [0, max]. Written with max/min so a bad max never panics.
fn clamp_interval(days: f64, max_days: f64) -> f64 {
  days.max(0.0).min(max_days.max(0.0))
}
