//! Application-wide UI state.

use crate::modal::ModalState;
use crate::selected_days::SelectedDaysState;

/// The shared state cells, created once by the application's composition
/// root and handed to whichever components need them.
///
/// Cloning is cheap and every clone refers to the same cells.
#[derive(Clone, Default)]
pub struct UiState {
    pub selected_days: SelectedDaysState,
    pub modal: ModalState,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }
}
