//! Drive the shared UI state from JSON-lines commands.
//!
//! Each line on stdin is one command, e.g. `{"op":"open","type":"task"}`.
//! Every state change schedules a render of the full state; renders go
//! through a throttle, so bursts of commands collapse into at most one
//! render per interval, always ending on the latest state.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use calui_core::{CalendarDay, Modal, ModalType, Throttle, UiState};
use owo_colors::OwoColorize;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::render::{Render, Snapshot};

#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Command {
    /// Replace the selection
    Select { days: Vec<CalendarDay> },
    /// Select nothing
    Clear,
    Open {
        #[serde(rename = "type")]
        kind: ModalType,
    },
    Close,
    /// Write the modal state as given
    Modal {
        show: bool,
        #[serde(rename = "type", default)]
        kind: Option<ModalType>,
    },
}

impl Command {
    fn apply(self, state: &UiState) {
        match self {
            Command::Select { days } => {
                for day in days.iter().filter(|d| !d.has_ordered_span()) {
                    tracing::warn!(?day, "selected day ends before it starts");
                }
                state.selected_days.set(days);
            }
            Command::Clear => state.selected_days.clear(),
            Command::Open { kind } => state.modal.open(kind),
            Command::Close => state.modal.close(),
            Command::Modal { show, kind } => state.modal.set(Modal { show, kind }),
        }
    }
}

pub async fn run(throttle_ms: u64, pretty: bool) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let limit = Duration::from_millis(throttle_ms);

    let applied = drive(stdin, std::io::stdout(), limit, pretty).await?;
    tracing::info!(applied, "input closed");

    Ok(())
}

/// Apply every command from `input` to a fresh `UiState`, writing throttled
/// snapshots to `out`. Returns the number of commands applied.
async fn drive<R, W>(input: R, out: W, limit: Duration, pretty: bool) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send + 'static,
{
    let state = UiState::new();
    let out = Arc::new(Mutex::new(out));

    let render = {
        let out = Arc::clone(&out);
        Throttle::new(limit, move |snapshot: Snapshot| {
            let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = emit(&mut *out, &snapshot, pretty) {
                tracing::warn!(error = %e, "failed to write snapshot");
            }
        })
    };

    let days_sub = {
        let render = render.clone();
        let snapshot_state = state.clone();
        state
            .selected_days
            .subscribe(move |_| render.invoke(Snapshot::capture(&snapshot_state)))
    };
    let modal_sub = {
        let render = render.clone();
        let snapshot_state = state.clone();
        state
            .modal
            .subscribe(move |_| render.invoke(Snapshot::capture(&snapshot_state)))
    };

    let mut input = input;
    let mut buf = Vec::new();
    let mut applied = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!(bytes = buf.len(), "skipping line that is not valid UTF-8");
            eprintln!("{} line is not valid UTF-8", "invalid command:".red());
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Command>(line) {
            Ok(command) => {
                tracing::debug!(?command, "applying command");
                command.apply(&state);
                applied += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping invalid command");
                eprintln!("{} {e}: {line}", "invalid command:".red());
            }
        }
    }

    // Give a deferred render one full window to flush
    if render.has_pending() {
        tokio::time::sleep(limit + Duration::from_millis(1)).await;
    }

    days_sub.unsubscribe();
    modal_sub.unsubscribe();
    render.cancel();

    Ok(applied)
}

fn emit(out: &mut impl Write, snapshot: &Snapshot, pretty: bool) -> std::io::Result<()> {
    if pretty {
        writeln!(out, "{}\n", snapshot.render())?;
    } else {
        serde_json::to_writer(&mut *out, snapshot)?;
        writeln!(out)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn json_lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_parse_commands() {
        let open: Command = serde_json::from_str(r#"{"op":"open","type":"appointment"}"#).unwrap();
        assert_eq!(
            open,
            Command::Open {
                kind: ModalType::Appointment
            }
        );

        let modal: Command = serde_json::from_str(r#"{"op":"modal","show":true}"#).unwrap();
        assert_eq!(
            modal,
            Command::Modal {
                show: true,
                kind: None
            }
        );

        let select: Command = serde_json::from_str(
            r#"{"op":"select","days":[{"date":4,"isCurrentMonth":true,"isToday":true,"month":5,"year":2025}]}"#,
        )
        .unwrap();
        assert!(matches!(select, Command::Select { days } if days.len() == 1 && days[0].is_today));

        assert!(serde_json::from_str::<Command>(r#"{"op":"open","type":"meeting"}"#).is_err());
    }

    #[test]
    fn test_apply_commands() {
        let state = UiState::new();

        Command::Open { kind: ModalType::Task }.apply(&state);
        Command::Close.apply(&state);
        Command::Select {
            days: vec![CalendarDay::new(2025, 1, 2)],
        }
        .apply(&state);

        assert_eq!(
            state.modal.get(),
            Modal {
                show: false,
                kind: Some(ModalType::Task)
            }
        );
        assert_eq!(state.selected_days.get().map(|d| d.len()), Some(1));

        Command::Clear.apply(&state);
        assert_eq!(state.selected_days.get(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_burst_collapses_to_latest_state() {
        tokio::time::pause();
        let input: &[u8] = b"{\"op\":\"open\",\"type\":\"event\"}\n\
            not json\n\
            \n\
            {\"op\":\"clear\"}\n\
            {\"op\":\"open\",\"type\":\"task\"}\n";
        let out = SharedBuf::default();

        let applied = drive(input, out.clone(), Duration::from_millis(100), false)
            .await
            .unwrap();

        assert_eq!(applied, 3);

        // Initial state renders immediately, the burst renders once at the end
        let lines = out.json_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["selectedDays"], serde_json::Value::Null);
        assert_eq!(lines[0]["modal"]["show"], false);
        assert_eq!(lines[1]["selectedDays"], serde_json::json!([]));
        assert_eq!(lines[1]["modal"], serde_json::json!({"show": true, "type": "task"}));
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_skipped() {
        tokio::time::pause();
        let input: &[u8] = b"\xff\xfe\n{\"op\":\"open\",\"type\":\"appointment\"}\n";
        let out = SharedBuf::default();

        let applied = drive(input, out.clone(), Duration::from_millis(10), false)
            .await
            .unwrap();

        assert_eq!(applied, 1);
        let lines = out.json_lines();
        assert_eq!(
            lines.last().unwrap()["modal"],
            serde_json::json!({"show": true, "type": "appointment"})
        );
    }
}
