//! Calendar day descriptors shared between the calendar grid and its forms.

use serde::{Deserialize, Serialize};

/// One day as displayed by the calendar.
///
/// Field names follow the camelCase wire shape (`isCurrentMonth`, `endDate`).
/// No calendar arithmetic happens here; the producer decides what `month`
/// and `date` mean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// Day of month
    pub date: u32,
    /// Whether the day belongs to the month being displayed
    pub is_current_month: bool,
    pub is_today: bool,
    pub month: u32,
    pub year: i32,
    /// Present when the day is associated with a stored item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// End of a multi-day span starting at this day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Box<CalendarDay>>,
}

impl CalendarDay {
    pub fn new(year: i32, month: u32, date: u32) -> Self {
        CalendarDay {
            date,
            is_current_month: true,
            is_today: false,
            month,
            year,
            id: None,
            end_date: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_end_date(mut self, end: CalendarDay) -> Self {
        self.end_date = Some(Box::new(end));
        self
    }

    /// `(year, month, date)`, ordered chronologically as long as the producer
    /// uses one month numbering consistently.
    pub fn position(&self) -> (i32, u32, u32) {
        (self.year, self.month, self.date)
    }

    /// True unless `end_date` is set and falls before this day.
    ///
    /// The type does not enforce ordering; producers can use this to check
    /// their spans before writing them to shared state.
    pub fn has_ordered_span(&self) -> bool {
        match &self.end_date {
            Some(end) => end.position() >= self.position() && end.has_ordered_span(),
            None => true,
        }
    }

    pub fn is_span(&self) -> bool {
        self.end_date.is_some()
    }
}
