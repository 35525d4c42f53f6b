//! Terminal rendering for calui state.
//!
//! Extension traits that add colored output to calui-core types using owo_colors.
//! Colors are only applied when stdout supports them, so piped output stays plain.

use calui_core::{CalendarDay, Modal, UiState};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Point-in-time copy of both state cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub selected_days: Option<Vec<CalendarDay>>,
    pub modal: Modal,
}

impl Snapshot {
    pub fn capture(state: &UiState) -> Self {
        Snapshot {
            selected_days: state.selected_days.get(),
            modal: state.modal.get(),
        }
    }
}

impl Render for CalendarDay {
    fn render(&self) -> String {
        let mut text = format!("{}-{:02}-{:02}", self.year, self.month, self.date);

        if let Some(end) = &self.end_date {
            text = format!("{text} → {}-{:02}-{:02}", end.year, end.month, end.date);
        }

        let text = if self.is_today {
            text.if_supports_color(Stdout, |t| t.bold()).to_string()
        } else if !self.is_current_month {
            text.if_supports_color(Stdout, |t| t.dimmed()).to_string()
        } else {
            text
        };

        match &self.id {
            Some(id) => {
                let id = format!("({id})");
                format!("{text} {}", id.if_supports_color(Stdout, |t| t.dimmed()))
            }
            None => text,
        }
    }
}

impl Render for Modal {
    fn render(&self) -> String {
        let kind = self.kind.map(|k| k.to_string()).unwrap_or_else(|| "-".into());

        if self.show {
            format!("{} {}", "▣ modal".if_supports_color(Stdout, |t| t.green()), kind)
        } else {
            format!(
                "{} {}",
                "□ modal".if_supports_color(Stdout, |t| t.dimmed()),
                kind.if_supports_color(Stdout, |t| t.dimmed())
            )
        }
    }
}

fn dim(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.dimmed()).to_string()
}

impl Render for Snapshot {
    fn render(&self) -> String {
        let mut lines = vec![self.modal.render()];

        match &self.selected_days {
            None => lines.push(dim("no selection")),
            Some(days) if days.is_empty() => lines.push(dim("0 days selected")),
            Some(days) => {
                lines.push(format!("{} days selected", days.len()));
                lines.extend(days.iter().map(|d| format!("   {}", d.render())));
            }
        }

        lines.join("\n")
    }
}
