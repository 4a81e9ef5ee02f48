//! Compact duration expressions ("10m", "4h", "1d", "1h30m") and the day/ms
//! conversions all interval math goes through.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

const DAYS_PER_MONTH: f64 = 30.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Duration parse errors. Always fatal to the caller: a bad spec means the
/// parameters record is corrupt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DurationError {
  #[error("empty duration")]
  Empty,
  #[error("invalid duration segment '{segment}' in '{input}'")]
  InvalidSegment { input: String, segment: String },
  #[error("duration must be a finite non-negative day count, got {input}")]
  Negative { input: String },
}

impl DurationError {
  pub fn user_message(&self) -> &'static str {
    match self {
      DurationError::Empty => "Duration is empty",
      DurationError::InvalidSegment { .. } => "Duration is malformed",
      DurationError::Negative { .. } => "Duration must not be negative",
    }
  }
}

/// A duration as written in a parameters record: either a day count or a
/// compact string. A bare number always means days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
  Days(f64),
  Text(String),
}

impl DurationSpec {
  pub fn to_ms(&self) -> Result<i64, DurationError> {
    parse(self)
  }

  pub fn to_days(&self) -> Result<f64, DurationError> {
    self.to_ms().map(ms_to_days)
  }
}

impl From<&str> for DurationSpec {
  fn from(s: &str) -> Self {
    DurationSpec::Text(s.to_string())
  }
}

impl From<f64> for DurationSpec {
  fn from(days: f64) -> Self {
    DurationSpec::Days(days)
  }
}

impl fmt::Display for DurationSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DurationSpec::Days(days) => write!(f, "{}d", days),
      DurationSpec::Text(s) => write!(f, "{}", s),
    }
  }
}

/// Parse a duration spec into milliseconds
pub fn parse(spec: &DurationSpec) -> Result<i64, DurationError> {
  match spec {
    DurationSpec::Days(days) => {
      if !days.is_finite() || *days < 0.0 {
        return Err(DurationError::Negative {
          input: days.to_string(),
        });
      }
      Ok(days_to_ms(*days))
    }
    DurationSpec::Text(s) => parse_str(s),
  }
}

/// Parse the string form: one or more `<number><unit>` segments, unit in
/// m/h/d (any case), summed. A bare integer string means days.
pub fn parse_str(input: &str) -> Result<i64, DurationError> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(DurationError::Empty);
  }

  if trimmed.bytes().all(|b| b.is_ascii_digit()) {
    let days: f64 = trimmed.parse().map_err(|_| invalid(input, trimmed))?;
    return Ok(days_to_ms(days));
  }

  let bytes = trimmed.as_bytes();
  let mut pos = 0;
  let mut total_ms = 0.0;

  while pos < bytes.len() {
    let start = pos;

    if bytes[pos] == b'+' || bytes[pos] == b'-' {
      pos += 1;
    }
    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
      pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
      pos += 1;
      while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
      }
    }

    let number = &trimmed[start..pos];
    if pos == digits_start || number.ends_with('.') || pos >= bytes.len() {
      return Err(invalid(input, segment_at(trimmed, start)));
    }

    let unit_ms = match bytes[pos].to_ascii_lowercase() {
      b'm' => MS_PER_MINUTE,
      b'h' => MS_PER_HOUR,
      b'd' => MS_PER_DAY,
      _ => return Err(invalid(input, segment_at(trimmed, start))),
    };
    pos += 1;

    let amount: f64 = number
      .parse()
      .map_err(|_| invalid(input, &trimmed[start..pos]))?;
    total_ms += amount * unit_ms as f64;
  }

  Ok(total_ms.round() as i64)
}

fn invalid(input: &str, segment: &str) -> DurationError {
  DurationError::InvalidSegment {
    input: input.to_string(),
    segment: segment.to_string(),
  }
}

/// The offending token starting at `start`: up to and including the next
/// alphabetic character, or the rest of the input.
fn segment_at(s: &str, start: usize) -> &str {
  let rest = &s[start..];
  match rest.char_indices().find(|(_, c)| c.is_ascii_alphabetic()) {
    Some((i, c)) => &rest[..i + c.len_utf8()],
    None => rest,
  }
}

pub fn days_to_ms(days: f64) -> i64 {
  (days * MS_PER_DAY as f64).round() as i64
}

pub fn ms_to_days(ms: i64) -> f64 {
  ms as f64 / MS_PER_DAY as f64
}

/// Human-readable bucketed form used for interval hints:
/// `<1m`, `Nm`, `Nh`, `Nd`, `Nmo`, `Ny`.
pub fn format_duration(ms: i64) -> String {
  if ms < MS_PER_MINUTE {
    return "<1m".to_string();
  }

  let days = ms_to_days(ms);
  if days < 1.0 {
    let minutes = (ms as f64 / MS_PER_MINUTE as f64).round() as i64;
    if minutes < 60 {
      return format!("{}m", minutes);
    }
    // Rounding up to 24h shows as a day instead
    let hours = (ms as f64 / MS_PER_HOUR as f64).round() as i64;
    if hours < 24 {
      return format!("{}h", hours);
    }
  }

  let whole_days = days.ceil();
  if whole_days < DAYS_PER_MONTH {
    format!("{}d", whole_days as i64)
  } else if days < DAYS_PER_YEAR {
    format!("{}mo", (days / DAYS_PER_MONTH).floor().max(1.0) as i64)
  } else {
    format!("{}y", (days / DAYS_PER_YEAR).floor() as i64)
  }
}
