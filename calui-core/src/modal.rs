//! Modal visibility state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalUiError;
use crate::store::{Store, Subscription};

/// Which modal body to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalType {
    Event,
    Task,
    Appointment,
}

impl ModalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModalType::Event => "event",
            ModalType::Task => "task",
            ModalType::Appointment => "appointment",
        }
    }
}

impl fmt::Display for ModalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalType {
    type Err = CalUiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(ModalType::Event),
            "task" => Ok(ModalType::Task),
            "appointment" => Ok(ModalType::Appointment),
            other => Err(CalUiError::UnknownModalType(other.to_string())),
        }
    }
}

/// Whether a modal is visible, and which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modal {
    pub show: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ModalType>,
}

impl Default for Modal {
    /// Hidden, with the event form preselected
    fn default() -> Self {
        Modal {
            show: false,
            kind: Some(ModalType::Event),
        }
    }
}

/// Shared modal state. Clones share the same cell.
#[derive(Clone, Default)]
pub struct ModalState {
    store: Store<Modal>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Modal {
        self.store.get()
    }

    pub fn set(&self, modal: Modal) {
        tracing::debug!(show = modal.show, kind = ?modal.kind, "modal state set");
        self.store.set(modal);
    }

    pub fn update(&self, f: impl FnOnce(Modal) -> Modal) {
        self.store.update(f);
    }

    /// Show the modal for `kind`.
    pub fn open(&self, kind: ModalType) {
        self.set(Modal {
            show: true,
            kind: Some(kind),
        });
    }

    /// Hide the modal, keeping the last kind selected.
    pub fn close(&self) {
        self.update(|modal| Modal {
            show: false,
            ..modal
        });
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Modal) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_default_is_hidden_event() {
        let state = ModalState::new();

        assert_eq!(
            state.get(),
            Modal {
                show: false,
                kind: Some(ModalType::Event)
            }
        );
    }

    #[test]
    fn test_set_then_get() {
        let state = ModalState::new();
        let task = Modal {
            show: true,
            kind: Some(ModalType::Task),
        };

        state.set(task);

        assert_eq!(state.get(), task);
    }

    #[test]
    fn test_open_and_close_keep_kind() {
        let state = ModalState::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = state.subscribe(move |m| sink.lock().unwrap().push(*m));

        state.open(ModalType::Appointment);
        state.close();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[2],
            Modal {
                show: false,
                kind: Some(ModalType::Appointment)
            }
        );
    }

    #[test]
    fn test_wire_shape() {
        let modal: Modal = serde_json::from_str(r#"{"show": true, "type": "appointment"}"#).unwrap();
        assert_eq!(modal.kind, Some(ModalType::Appointment));

        let untyped: Modal = serde_json::from_str(r#"{"show": false}"#).unwrap();
        assert_eq!(untyped.kind, None);

        assert_eq!(
            serde_json::to_string(&Modal::default()).unwrap(),
            r#"{"show":false,"type":"event"}"#
        );
    }

    #[test]
    fn test_parse_modal_type() {
        assert_eq!("task".parse::<ModalType>().unwrap(), ModalType::Task);
        assert!(matches!(
            "meeting".parse::<ModalType>(),
            Err(CalUiError::UnknownModalType(s)) if s == "meeting"
        ));
    }
}
