use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highlight color used for attended days on the calendar.
pub const ATTENDANCE_COLOR: &str = "#DA0037";

/// Calendar marking descriptor stored for an attended day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub selected: bool,
    pub marked: bool,
    pub selected_color: String,
}

impl Default for AttendanceMark {
    fn default() -> Self {
        Self {
            selected: true,
            marked: true,
            selected_color: ATTENDANCE_COLOR.to_string(),
        }
    }
}

/// Attended days keyed by ISO date (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceRecord {
    days: BTreeMap<NaiveDate, AttendanceMark>,
}

impl AttendanceRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_marked(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&AttendanceMark> {
        self.days.get(&date)
    }

    /// Record attendance for `date`.
    ///
    /// Returns `false` and leaves the record untouched if the date is already present.
    pub fn mark(&mut self, date: NaiveDate) -> bool {
        if self.days.contains_key(&date) {
            return false;
        }
        self.days.insert(date, AttendanceMark::default());
        true
    }

    /// Drop the entry for `date`; used to undo a mark whose write failed.
    pub fn unmark(&mut self, date: NaiveDate) -> Option<AttendanceMark> {
        self.days.remove(&date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Marked dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }
}
