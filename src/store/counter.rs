use super::{Store, SubscriptionId};
use crate::config::{CounterConfig, PulsePolicy};
use crate::display::{DisplaySink, Indicator};
use crate::error::Result;
use crate::input::{Command, Keymap};
use crate::runtime::{Scheduler, TaskId};
use crate::storage::KeyValueStorage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parse a persisted counter record.
///
/// Only a base-10 integer (surrounding whitespace allowed) is accepted;
/// anything else is treated as no saved value.
pub fn parse_persisted(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// The counter widget core.
///
/// Owns the counter value, mirrors it to key-value storage on every change,
/// and renders it into a display sink. Each instance is independent; nothing
/// is process-global, so several counters can share one storage under
/// different keys.
///
/// # Examples
///
/// ```
/// use tally::{CounterConfig, CounterStore, Indicator, ManualScheduler, MemoryStorage, RecordingDisplay};
///
/// let storage = MemoryStorage::with_item("counterValue", "5");
/// let display = RecordingDisplay::new();
/// let mut counter = CounterStore::open(
///     CounterConfig::default(),
///     storage.clone(),
///     display.clone(),
///     ManualScheduler::new(),
/// )
/// .unwrap();
///
/// assert_eq!(counter.value(), 5);
/// counter.decrement().unwrap();
/// assert_eq!(display.state().text, "4");
/// assert_eq!(display.state().indicator, Indicator::Positive);
/// ```
pub struct CounterStore {
    config: CounterConfig,
    value: Store<i64>,
    storage: Arc<dyn KeyValueStorage>,
    display: Arc<dyn DisplaySink>,
    scheduler: Arc<dyn Scheduler>,
    keymap: Keymap,
    last_pulse: Option<TaskId>,
}

impl CounterStore {
    /// Build a counter, load the persisted value, and render it.
    ///
    /// The initial render sets text and indicator only: it neither writes
    /// storage nor pulses.
    pub fn open<S, D, Sch>(
        config: CounterConfig,
        storage: S,
        display: D,
        scheduler: Sch,
    ) -> Result<Self>
    where
        S: KeyValueStorage + 'static,
        D: DisplaySink + 'static,
        Sch: Scheduler + 'static,
    {
        let mut counter = Self {
            config,
            value: Store::new(0),
            storage: Arc::new(storage),
            display: Arc::new(display),
            scheduler: Arc::new(scheduler),
            keymap: Keymap::default(),
            last_pulse: None,
        };
        counter.load()?;
        counter.render(counter.value());
        Ok(counter)
    }

    /// Replace the default key bindings.
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn value(&self) -> i64 {
        self.value.get()
    }

    pub fn indicator(&self) -> Indicator {
        Indicator::for_value(self.value())
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Id of the pulse clear still waiting to run, if any. `None` once the
    /// most recently scheduled clear has fired or been cancelled.
    pub fn pending_pulse(&self) -> Option<TaskId> {
        self.last_pulse.filter(|id| self.scheduler.is_pending(*id))
    }

    pub fn increment(&mut self) -> Result<i64> {
        let next = self.value().saturating_add(1);
        self.commit(next)
    }

    pub fn decrement(&mut self) -> Result<i64> {
        let next = self.value().saturating_sub(1);
        self.commit(next)
    }

    pub fn reset(&mut self) -> Result<i64> {
        self.commit(0)
    }

    pub fn dispatch(&mut self, command: Command) -> Result<i64> {
        match command {
            Command::Increment => self.increment(),
            Command::Decrement => self.decrement(),
            Command::Reset => self.reset(),
        }
    }

    /// Handle a key press. Returns `Ok(None)` for unbound keys.
    pub fn handle_key(&mut self, key: &str) -> Result<Option<i64>> {
        match self.keymap.resolve(key) {
            Some(command) => self.dispatch(command).map(Some),
            None => Ok(None),
        }
    }

    /// Handle a button activation by control id. Returns `Ok(None)` for
    /// unknown ids.
    pub fn handle_control(&mut self, id: &str) -> Result<Option<i64>> {
        match Command::from_control(id) {
            Some(command) => self.dispatch(command).map(Some),
            None => Ok(None),
        }
    }

    /// Re-render and re-persist the current value, and pulse.
    pub fn refresh_display(&mut self) -> Result<()> {
        let value = self.value();
        self.persist(value)?;
        self.render(value);
        self.pulse();
        Ok(())
    }

    /// Observe value changes. Callbacks run synchronously after each
    /// committed mutation.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&i64) + Send + Sync + 'static,
    {
        self.value.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.value.unsubscribe(id)
    }

    fn load(&mut self) -> Result<()> {
        let key = &self.config.storage_key;
        let loaded = match self.storage.get_item(key)? {
            Some(raw) => match parse_persisted(&raw) {
                Some(value) => {
                    info!(key = %key, value, "loaded counter value");
                    Some(value)
                }
                None => {
                    warn!(key = %key, raw = %raw, "ignoring unparseable counter value");
                    None
                }
            },
            None => {
                info!(key = %key, "no saved counter value");
                None
            }
        };

        if let Some(value) = loaded {
            self.value.set(value);
        }
        Ok(())
    }

    // Storage is written before the value is committed, so a failed write
    // leaves memory, storage and display unchanged.
    fn commit(&mut self, next: i64) -> Result<i64> {
        self.persist(next)?;
        let previous = self.value();
        self.value.set(next);
        debug!(previous, value = next, "counter changed");
        self.render(next);
        self.pulse();
        Ok(next)
    }

    fn persist(&self, value: i64) -> Result<()> {
        self.storage
            .set_item(&self.config.storage_key, &value.to_string())
    }

    fn render(&self, value: i64) {
        self.display.set_text(&value.to_string());
        self.display.set_indicator(Indicator::for_value(value));
    }

    fn pulse(&mut self) {
        if self.config.pulse_policy == PulsePolicy::Restart {
            if let Some(previous) = self.last_pulse.take() {
                if self.scheduler.cancel(previous) {
                    debug!(task = %previous, "replaced pending pulse clear");
                }
            }
        }

        self.display.set_pulse(true);
        let display = Arc::clone(&self.display);
        let id = self.scheduler.schedule(
            self.config.pulse_duration(),
            Box::new(move || display.set_pulse(false)),
        );
        self.last_pulse = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayEvent, RecordingDisplay};
    use crate::error::CounterError;
    use crate::runtime::ManualScheduler;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct Fixture {
        counter: CounterStore,
        storage: MemoryStorage,
        display: RecordingDisplay,
        scheduler: ManualScheduler,
    }

    fn fixture_with(storage: MemoryStorage, config: CounterConfig) -> Fixture {
        let display = RecordingDisplay::new();
        let scheduler = ManualScheduler::new();
        let counter =
            CounterStore::open(config, storage.clone(), display.clone(), scheduler.clone())
                .unwrap();
        Fixture {
            counter,
            storage,
            display,
            scheduler,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStorage::new(), CounterConfig::default())
    }

    fn stored(storage: &MemoryStorage) -> Option<String> {
        storage.get_item("counterValue").unwrap()
    }

    #[test]
    fn parse_rules() {
        assert_eq!(parse_persisted("5"), Some(5));
        assert_eq!(parse_persisted("-12"), Some(-12));
        assert_eq!(parse_persisted(" 7\n"), Some(7));
        assert_eq!(parse_persisted("abc"), None);
        assert_eq!(parse_persisted("5abc"), None);
        assert_eq!(parse_persisted("1.5"), None);
        assert_eq!(parse_persisted(""), None);
    }

    #[test]
    fn load_saved_value() {
        let f = fixture_with(
            MemoryStorage::with_item("counterValue", "5"),
            CounterConfig::default(),
        );
        assert_eq!(f.counter.value(), 5);
        assert_eq!(f.display.state().text, "5");
        assert_eq!(f.display.state().indicator, Indicator::Positive);
    }

    #[test]
    fn load_garbage_falls_back_to_zero() {
        let f = fixture_with(
            MemoryStorage::with_item("counterValue", "abc"),
            CounterConfig::default(),
        );
        assert_eq!(f.counter.value(), 0);
        assert_eq!(f.display.state().text, "0");
        // Loading never rewrites the record.
        assert_eq!(stored(&f.storage).as_deref(), Some("abc"));
    }

    #[test]
    fn open_does_not_persist_or_pulse() {
        let f = fixture();
        assert_eq!(f.counter.value(), 0);
        assert_eq!(stored(&f.storage), None);
        assert_eq!(f.scheduler.pending(), 0);
        assert_eq!(
            f.display.events(),
            vec![
                DisplayEvent::Text("0".to_string()),
                DisplayEvent::Indicator(Indicator::Neutral),
            ]
        );
    }

    #[test]
    fn mutation_renders_persists_and_pulses() {
        let mut f = fixture();
        f.display.clear_events();

        assert_eq!(f.counter.increment().unwrap(), 1);

        assert_eq!(stored(&f.storage).as_deref(), Some("1"));
        assert_eq!(
            f.display.events(),
            vec![
                DisplayEvent::Text("1".to_string()),
                DisplayEvent::Indicator(Indicator::Positive),
                DisplayEvent::Pulse(true),
            ]
        );
        assert!(f.display.state().pulsing);

        f.scheduler.advance(Duration::from_millis(300));
        assert!(!f.display.state().pulsing);
    }

    #[test]
    fn pending_pulse_tracks_clear() {
        let mut f = fixture();
        assert_eq!(f.counter.pending_pulse(), None);

        f.counter.increment().unwrap();
        let id = f.counter.pending_pulse().unwrap();
        assert!(f.scheduler.is_pending(id));

        f.scheduler.advance(Duration::from_millis(299));
        assert_eq!(f.counter.pending_pulse(), Some(id));

        f.scheduler.advance(Duration::from_millis(1));
        assert_eq!(f.counter.pending_pulse(), None);

        f.counter.reset().unwrap();
        let next = f.counter.pending_pulse().unwrap();
        assert!(f.scheduler.cancel(next));
        assert_eq!(f.counter.pending_pulse(), None);
    }

    #[test]
    fn independent_pulses_clear_on_first_deadline() {
        let mut f = fixture();
        f.counter.increment().unwrap();
        f.scheduler.advance(Duration::from_millis(200));
        f.counter.increment().unwrap();

        assert_eq!(f.scheduler.pending(), 2);
        f.scheduler.advance(Duration::from_millis(100));
        assert!(!f.display.state().pulsing);
        assert_eq!(f.scheduler.pending(), 1);

        // The second clear is a harmless repeat.
        f.scheduler.advance(Duration::from_millis(200));
        assert!(!f.display.state().pulsing);
    }

    #[test]
    fn restart_policy_extends_pulse() {
        let config = CounterConfig {
            pulse_policy: PulsePolicy::Restart,
            ..CounterConfig::default()
        };
        let mut f = fixture_with(MemoryStorage::new(), config);

        f.counter.increment().unwrap();
        let first = f.counter.pending_pulse().unwrap();
        f.scheduler.advance(Duration::from_millis(200));
        f.counter.decrement().unwrap();

        let second = f.counter.pending_pulse().unwrap();
        assert_ne!(second, first);
        assert!(!f.scheduler.is_pending(first));
        assert_eq!(f.scheduler.pending(), 1);

        f.scheduler.advance(Duration::from_millis(100));
        assert!(f.display.state().pulsing);

        f.scheduler.advance(Duration::from_millis(200));
        assert!(!f.display.state().pulsing);
    }

    #[test]
    fn keys_and_controls() {
        let mut f = fixture();
        assert_eq!(f.counter.handle_key("ArrowUp").unwrap(), Some(1));
        assert_eq!(f.counter.handle_key("+").unwrap(), Some(2));
        assert_eq!(f.counter.handle_key("-").unwrap(), Some(1));
        assert_eq!(f.counter.handle_key("ArrowDown").unwrap(), Some(0));
        assert_eq!(f.counter.handle_control("decrease").unwrap(), Some(-1));
        assert_eq!(f.counter.handle_key("R").unwrap(), Some(0));
        assert_eq!(f.counter.handle_control("increase").unwrap(), Some(1));
        assert_eq!(f.counter.handle_key("r").unwrap(), Some(0));
        assert_eq!(f.counter.handle_control("reset").unwrap(), Some(0));

        assert_eq!(f.counter.handle_key("Enter").unwrap(), None);
        assert_eq!(f.counter.handle_control("counter").unwrap(), None);
        assert_eq!(f.counter.value(), 0);
    }

    #[test]
    fn custom_keymap() {
        let mut keymap = Keymap::empty();
        keymap.bind("k", Command::Increment);
        let mut counter = CounterStore::open(
            CounterConfig::default(),
            MemoryStorage::new(),
            RecordingDisplay::new(),
            ManualScheduler::new(),
        )
        .unwrap()
        .with_keymap(keymap);

        assert_eq!(counter.handle_key("ArrowUp").unwrap(), None);
        assert_eq!(counter.handle_key("k").unwrap(), Some(1));

        counter.keymap_mut().bind("j", Command::Decrement);
        assert_eq!(counter.handle_key("j").unwrap(), Some(0));
    }

    #[test]
    fn saturates_at_bounds() {
        let mut f = fixture_with(
            MemoryStorage::with_item("counterValue", i64::MAX.to_string()),
            CounterConfig::default(),
        );
        assert_eq!(f.counter.increment().unwrap(), i64::MAX);
        assert_eq!(stored(&f.storage), Some(i64::MAX.to_string()));
    }

    #[test]
    fn custom_storage_key() {
        let config = CounterConfig {
            storage_key: "clicks".to_string(),
            ..CounterConfig::default()
        };
        let mut f = fixture_with(MemoryStorage::new(), config);
        f.counter.decrement().unwrap();

        assert_eq!(f.storage.get_item("clicks").unwrap().as_deref(), Some("-1"));
        assert_eq!(stored(&f.storage), None);
    }

    #[test]
    fn refresh_display_repersists_current_value() {
        let mut f = fixture_with(
            MemoryStorage::with_item("counterValue", "3"),
            CounterConfig::default(),
        );
        f.counter.refresh_display().unwrap();
        assert_eq!(stored(&f.storage).as_deref(), Some("3"));
        assert!(f.display.state().pulsing);
    }

    struct FailingStorage {
        fail: Arc<AtomicBool>,
        inner: MemoryStorage,
    }

    impl KeyValueStorage for FailingStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(CounterError::Storage("quota exceeded".to_string()));
            }
            self.inner.set_item(key, value)
        }
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let fail = Arc::new(AtomicBool::new(false));
        let inner = MemoryStorage::new();
        let display = RecordingDisplay::new();
        let mut counter = CounterStore::open(
            CounterConfig::default(),
            FailingStorage {
                fail: fail.clone(),
                inner: inner.clone(),
            },
            display.clone(),
            ManualScheduler::new(),
        )
        .unwrap();

        counter.increment().unwrap();
        fail.store(true, Ordering::SeqCst);

        let err = counter.increment().unwrap_err();
        assert!(matches!(err, CounterError::Storage(_)));
        assert_eq!(counter.value(), 1);
        assert_eq!(inner.get_item("counterValue").unwrap().as_deref(), Some("1"));
        assert_eq!(display.state().text, "1");
    }

    #[test]
    fn subscribers_see_committed_values() {
        let mut f = fixture();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let id = f
            .counter
            .subscribe(move |v| seen_clone.lock().unwrap().push(*v));

        f.counter.increment().unwrap();
        f.counter.reset().unwrap();
        assert!(f.counter.unsubscribe(id));
        f.counter.decrement().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
    }
}
