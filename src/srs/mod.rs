pub mod duration;
pub mod params;
pub mod preview;
pub mod sm2;

pub use duration::{DurationError, DurationSpec, days_to_ms, format_duration, ms_to_days};
pub use params::{EaseAdjustments, SchedulingParameters};
pub use preview::{GradePreview, preview_all};
pub use sm2::{ReviewOutcome, ScheduleError, apply_review};
