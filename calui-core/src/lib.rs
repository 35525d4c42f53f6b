//! Core types for calui.
//!
//! This crate provides the state shared between calendar UI components:
//! - `store`: observable value cells with synchronous subscriber notification
//! - `selected_days` and `modal`: the two shared cells, bundled in `UiState`
//! - `throttle`: a rate limiter for callbacks such as re-renders

pub mod config;
pub mod day;
pub mod error;
pub mod modal;
pub mod selected_days;
pub mod store;
pub mod throttle;
pub mod ui_state;

pub use day::CalendarDay;
pub use error::{CalUiError, CalUiResult};
pub use modal::{Modal, ModalState, ModalType};
pub use selected_days::SelectedDaysState;
pub use store::{Store, Subscription};
pub use throttle::{Canceller, Throttle, throttle};
pub use ui_state::UiState;
