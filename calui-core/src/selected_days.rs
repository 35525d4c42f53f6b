//! The ordered list of days the calendar currently has selected.

use crate::day::CalendarDay;
use crate::store::{Store, Subscription};

/// Shared selection. Starts unset (`None`) until the first write; every write
/// replaces the whole sequence. Clones share the same cell.
#[derive(Clone, Default)]
pub struct SelectedDaysState {
    store: Store<Option<Vec<CalendarDay>>>,
}

impl SelectedDaysState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Vec<CalendarDay>> {
        self.store.get()
    }

    pub fn set(&self, days: Vec<CalendarDay>) {
        tracing::debug!(count = days.len(), "selected days set");
        self.store.set(Some(days));
    }

    pub fn clear(&self) {
        self.set(Vec::new());
    }

    pub fn update(&self, f: impl FnOnce(Option<Vec<CalendarDay>>) -> Vec<CalendarDay>) {
        self.store.update(|current| Some(f(current)));
    }

    /// The callback receives `None` on replay if nothing was written yet.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&[CalendarDay]>) + Send + Sync + 'static,
    {
        self.store.subscribe(move |days| callback(days.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_starts_unset() {
        assert_eq!(SelectedDaysState::new().get(), None);
    }

    #[test]
    fn test_set_empty_notifies_once() {
        let state = SelectedDaysState::new();
        let seen: Arc<Mutex<Vec<Option<Vec<CalendarDay>>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = state.subscribe(move |days| sink.lock().unwrap().push(days.map(|d| d.to_vec())));

        state.set(vec![]);

        assert_eq!(state.get(), Some(vec![]));
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(vec![])]);
    }

    #[test]
    fn test_set_replaces_whole_sequence_in_order() {
        let state = SelectedDaysState::new();
        let first = vec![CalendarDay::new(2025, 3, 1), CalendarDay::new(2025, 3, 2)];
        let second = vec![CalendarDay::new(2025, 3, 9), CalendarDay::new(2025, 3, 4).with_id("a")];

        state.set(first);
        state.set(second.clone());

        assert_eq!(state.get(), Some(second));
    }

    #[test]
    fn test_update_appends() {
        let state = SelectedDaysState::new();

        state.update(|days| {
            let mut days = days.unwrap_or_default();
            days.push(CalendarDay::new(2025, 1, 1));
            days
        });

        assert_eq!(state.get().map(|d| d.len()), Some(1));
    }
}
