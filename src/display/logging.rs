use super::{DisplaySink, Indicator};
use tracing::{debug, info};

/// Headless sink that reports every display change as a `tracing` event.
#[derive(Clone, Debug)]
pub struct LogDisplay {
    name: String,
}

impl LogDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new("counter")
    }
}

impl DisplaySink for LogDisplay {
    fn set_text(&self, text: &str) {
        info!(widget = %self.name, text, "display text");
    }

    fn set_indicator(&self, indicator: Indicator) {
        info!(widget = %self.name, indicator = %indicator, color = indicator.color(), "display indicator");
    }

    fn set_pulse(&self, active: bool) {
        debug!(widget = %self.name, active, "display pulse");
    }
}
