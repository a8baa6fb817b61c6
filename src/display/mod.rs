//! Display sinks.
//!
//! A sink exposes three slots: the counter text, a three-state indicator
//! (usually rendered as a color), and a transient pulse toggle.

mod logging;
mod recording;

pub use logging::LogDisplay;
pub use recording::{DisplayEvent, DisplayState, RecordingDisplay, DEFAULT_EVENT_CAPACITY};

use std::fmt;

/// Visual state selected from the sign of the counter value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Indicator {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Indicator {
    pub fn for_value(value: i64) -> Self {
        match value {
            v if v > 0 => Indicator::Positive,
            v if v < 0 => Indicator::Negative,
            _ => Indicator::Neutral,
        }
    }

    /// CSS color for this indicator.
    pub fn color(self) -> &'static str {
        match self {
            Indicator::Positive => "#10b981",
            Indicator::Negative => "#ef4444",
            Indicator::Neutral => "#667eea",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Indicator::Positive => "positive",
            Indicator::Negative => "negative",
            Indicator::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The visual surface a counter renders into.
///
/// Methods take `&self` because the pulse clear may run later from a
/// scheduler task holding its own handle to the sink.
pub trait DisplaySink: Send + Sync {
    fn set_text(&self, text: &str);

    fn set_indicator(&self, indicator: Indicator);

    /// Turn the pulse on or off. Turning off an inactive pulse is a no-op.
    fn set_pulse(&self, active: bool);
}
