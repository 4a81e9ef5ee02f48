//! Rebuild scheduling state from a review history.
//!
//! Used by the `recall-replay` binary to check what the scheduler makes of a
//! recorded log, and handy for migrating logs between parameter sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{Grade, StoredSchedule};
use crate::srs::{GradePreview, ScheduleError, SchedulingParameters, apply_review, preview_all};

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayInput {
  #[serde(default)]
  pub parameters: Option<SchedulingParameters>,
  /// Instant the final previews are computed for; defaults to the wall clock
  #[serde(default)]
  pub now: Option<DateTime<Utc>>,
  pub events: Vec<ReplayEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayEvent {
  pub card_id: i64,
  pub grade: Grade,
  pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayedCard {
  #[serde(flatten)]
  pub schedule: StoredSchedule,
  pub reviews: usize,
  /// Due at the replay's `now`
  pub is_due: bool,
  pub preview: GradePreview,
}

#[derive(Debug, Error)]
#[error("replay failed at card {card_id}: {source}")]
pub struct ReplayError {
  pub card_id: i64,
  #[source]
  pub source: ScheduleError,
}

/// Apply `events` in timestamp order, card by card. Output is sorted by card id.
pub fn replay(
  events: &[ReplayEvent],
  params: &SchedulingParameters,
  now: DateTime<Utc>,
) -> Result<Vec<ReplayedCard>, ReplayError> {
  let mut ordered: Vec<&ReplayEvent> = events.iter().collect();
  ordered.sort_by_key(|e| e.reviewed_at);

  let mut cards: BTreeMap<i64, (StoredSchedule, usize)> = BTreeMap::new();
  for event in ordered {
    let previous = cards.get(&event.card_id).map(|(s, _)| &s.state);
    let outcome = apply_review(previous, event.grade, params, event.reviewed_at).map_err(|source| {
      ReplayError {
        card_id: event.card_id,
        source,
      }
    })?;

    let schedule = StoredSchedule {
      card_id: event.card_id,
      state: outcome.state,
      due_at: outcome.due_at,
    };
    let reviews = cards.get(&event.card_id).map_or(0, |(_, n)| *n) + 1;
    cards.insert(event.card_id, (schedule, reviews));
  }

  tracing::debug!(cards = cards.len(), events = events.len(), "replay finished");

  Ok(
    cards
      .into_values()
      .map(|(schedule, reviews)| ReplayedCard {
        preview: preview_all(Some(&schedule.state), params, now),
        is_due: schedule.is_due(now),
        schedule,
        reviews,
      })
      .collect(),
  )
}
