use super::{DisplaySink, Indicator};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Events kept by [`RecordingDisplay::new`] before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Current contents of a [`RecordingDisplay`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub text: String,
    pub indicator: Indicator,
    pub pulsing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    Text(String),
    Indicator(Indicator),
    Pulse(bool),
}

#[derive(Debug)]
struct Recorded {
    state: DisplayState,
    events: VecDeque<DisplayEvent>,
    capacity: usize,
}

impl Recorded {
    fn record(&mut self, event: DisplayEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// In-memory display that keeps its current state and a bounded log of the
/// most recent calls made to it.
///
/// Clones share the same record. Long-running hosts can drain the log with
/// [`RecordingDisplay::take_events`]; once full, the oldest events are
/// dropped.
#[derive(Clone, Debug)]
pub struct RecordingDisplay {
    inner: Arc<Mutex<Recorded>>,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` events. Zero disables the log; the current
    /// state is still tracked.
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Recorded {
                state: DisplayState::default(),
                events: VecDeque::new(),
                capacity,
            })),
        }
    }

    pub fn state(&self) -> DisplayState {
        self.lock().state.clone()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.lock().events.iter().cloned().collect()
    }

    /// Remove and return the logged events, oldest first.
    pub fn take_events(&self) -> Vec<DisplayEvent> {
        self.lock().events.drain(..).collect()
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplaySink for RecordingDisplay {
    fn set_text(&self, text: &str) {
        let mut rec = self.lock();
        rec.state.text = text.to_string();
        rec.record(DisplayEvent::Text(text.to_string()));
    }

    fn set_indicator(&self, indicator: Indicator) {
        let mut rec = self.lock();
        rec.state.indicator = indicator;
        rec.record(DisplayEvent::Indicator(indicator));
    }

    fn set_pulse(&self, active: bool) {
        let mut rec = self.lock();
        rec.state.pulsing = active;
        rec.record(DisplayEvent::Pulse(active));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_state_and_events() {
        let display = RecordingDisplay::new();
        let view = display.clone();

        display.set_text("3");
        display.set_indicator(Indicator::Positive);
        display.set_pulse(true);

        assert_eq!(
            view.state(),
            DisplayState {
                text: "3".to_string(),
                indicator: Indicator::Positive,
                pulsing: true,
            }
        );
        assert_eq!(view.events().len(), 3);

        view.clear_events();
        display.set_pulse(false);
        display.set_pulse(false);
        assert!(!view.state().pulsing);
        assert_eq!(
            view.events(),
            vec![DisplayEvent::Pulse(false), DisplayEvent::Pulse(false)]
        );
    }

    #[test]
    fn log_is_bounded_and_drainable() {
        let display = RecordingDisplay::with_event_capacity(2);

        display.set_text("1");
        display.set_indicator(Indicator::Positive);
        display.set_pulse(true);

        assert_eq!(
            display.take_events(),
            vec![
                DisplayEvent::Indicator(Indicator::Positive),
                DisplayEvent::Pulse(true),
            ]
        );
        assert!(display.events().is_empty());
        assert_eq!(display.state().text, "1");

        let silent = RecordingDisplay::with_event_capacity(0);
        silent.set_text("9");
        assert!(silent.events().is_empty());
        assert_eq!(silent.state().text, "9");
    }
}
