//! Ungraded self-test session (forgot / remembered).
//!
//! Never touches scheduling state or due times. Forgotten cards come back
//! first until they are remembered; everything else is walked once in order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::SessionError;
use crate::domain::{Card, QuickReviewResult, ReviewEvent};

#[derive(Debug, Clone, Copy)]
pub struct QuickReviewOptions {
  /// Emit a review event for every answer
  pub record_events: bool,
}

impl Default for QuickReviewOptions {
  fn default() -> Self {
    Self { record_events: true }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickReviewOutcome {
  pub card_id: i64,
  pub result: QuickReviewResult,
  pub review_event: Option<ReviewEvent>,
  pub is_completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuickSessionStats {
  pub total: usize,
  pub completed: usize,
  pub forgot: usize,
  pub remaining: usize,
}

pub struct QuickReviewSession {
  cards: Vec<Card>,
  cursor: usize,
  completed: HashSet<i64>,
  forgot: HashSet<i64>,
  options: QuickReviewOptions,
}

impl QuickReviewSession {
  pub fn new(cards: Vec<Card>, options: QuickReviewOptions) -> Self {
    tracing::debug!(total = cards.len(), "quick review session started");
    Self {
      cards,
      cursor: 0,
      completed: HashSet::new(),
      forgot: HashSet::new(),
      options,
    }
  }

  fn current_index(&self) -> Option<usize> {
    // Forgotten cards first, wherever they are in the list
    let forgotten = self
      .cards
      .iter()
      .position(|c| self.forgot.contains(&c.id) && !self.completed.contains(&c.id));
    if forgotten.is_some() {
      return forgotten;
    }

    (self.cursor..self.cards.len()).find(|&i| !self.completed.contains(&self.cards[i].id))
  }

  pub fn get_current_card(&self) -> Option<&Card> {
    self.current_index().map(|i| &self.cards[i])
  }

  pub fn is_complete(&self) -> bool {
    self.current_index().is_none()
  }

  /// Record an answer for the current card. No due date is computed.
  pub fn submit_review(
    &self,
    result: QuickReviewResult,
    now: DateTime<Utc>,
    time_ms: Option<i64>,
  ) -> Result<QuickReviewOutcome, SessionError> {
    let card = self.get_current_card().ok_or(SessionError::NoCurrentCard)?;

    let review_event = self
      .options
      .record_events
      .then(|| ReviewEvent::quick(card.id, result, time_ms, now));

    Ok(QuickReviewOutcome {
      card_id: card.id,
      result,
      review_event,
      is_completed: result == QuickReviewResult::Remembered,
    })
  }

  /// Apply an answer to the current card and move on
  pub fn move_to_next(&mut self, result: QuickReviewResult) -> Result<(), SessionError> {
    let idx = self.current_index().ok_or(SessionError::NoCurrentCard)?;
    let card_id = self.cards[idx].id;

    match result {
      QuickReviewResult::Forgot => {
        self.forgot.insert(card_id);
      }
      QuickReviewResult::Remembered => {
        self.forgot.remove(&card_id);
        self.completed.insert(card_id);
      }
    }
    self.advance_past(idx);

    tracing::debug!(card_id, result = result.as_str(), "quick review answered");
    Ok(())
  }

  /// Drop the current card without an answer. Returns its id, or `None` if
  /// the session is already complete.
  pub fn skip_current(&mut self) -> Option<i64> {
    let idx = self.current_index()?;
    let card_id = self.cards[idx].id;

    self.forgot.remove(&card_id);
    self.completed.insert(card_id);
    self.advance_past(idx);
    Some(card_id)
  }

  /// Move the cursor past `idx`. A resurfaced forgotten card sits behind the
  /// cursor and must not drag it forward over unseen cards.
  fn advance_past(&mut self, idx: usize) {
    if idx >= self.cursor {
      self.cursor = idx + 1;
    }
  }

  pub fn stats(&self) -> QuickSessionStats {
    let total = self.cards.len();
    let completed = self
      .cards
      .iter()
      .filter(|c| self.completed.contains(&c.id))
      .count();
    let forgot = self
      .cards
      .iter()
      .filter(|c| self.forgot.contains(&c.id) && !self.completed.contains(&c.id))
      .count();

    QuickSessionStats {
      total,
      completed,
      forgot,
      remaining: total - completed,
    }
  }
}
