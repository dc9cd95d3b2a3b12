//! Encode/decode schemas for each persisted key.

use gameplan_core::model::{AttendanceRecord, Streak, TaskBoard};
use thiserror::Error;

pub const TASKS_KEY: &str = "tasks";
pub const ATTENDANCE_KEY: &str = "attendanceDates";
pub const STREAK_KEY: &str = "streak";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("duplicate task id {id} in {category}")]
    DuplicateTask { category: String, id: u64 },

    #[error("invalid streak value: {0:?}")]
    InvalidStreak(String),
}

/// A value with a fixed storage key and a validated text encoding.
pub trait StoredValue: Sized + Default {
    const KEY: &'static str;

    /// # Errors
    ///
    /// Returns `CodecError` if the value cannot be encoded.
    fn encode(&self) -> Result<String, CodecError>;

    /// # Errors
    ///
    /// Returns `CodecError` if `raw` does not match the key's schema.
    fn decode(raw: &str) -> Result<Self, CodecError>;

    /// Decode `raw`, treating absence and schema violations as the default value.
    fn decode_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::decode(raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key = Self::KEY, error = %err, "discarding malformed stored value");
                Self::default()
            }
        }
    }
}

impl StoredValue for TaskBoard {
    const KEY: &'static str = TASKS_KEY;

    fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    fn decode(raw: &str) -> Result<Self, CodecError> {
        let board: TaskBoard = serde_json::from_str(raw)?;
        if let Some((category, id)) = board.duplicate_id() {
            return Err(CodecError::DuplicateTask {
                category: category.to_string(),
                id: id.value(),
            });
        }
        Ok(board)
    }
}

impl StoredValue for AttendanceRecord {
    const KEY: &'static str = ATTENDANCE_KEY;

    fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    fn decode(raw: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl StoredValue for Streak {
    const KEY: &'static str = STREAK_KEY;

    fn encode(&self) -> Result<String, CodecError> {
        Ok(self.days().to_string())
    }

    fn decode(raw: &str) -> Result<Self, CodecError> {
        raw.trim()
            .parse::<u32>()
            .map(Streak::new)
            .map_err(|_| CodecError::InvalidStreak(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameplan_core::model::{TaskCategory, TaskId};

    #[test]
    fn decodes_task_board_written_by_the_app() {
        let raw = r#"{"Exercise":[{"id":1,"name":"Run","completed":false}],"Practice":[{"id":2,"name":"Drill","completed":true}]}"#;
        let board = TaskBoard::decode(raw).unwrap();
        assert!(
            board
                .task(TaskCategory::Practice, TaskId::new(2))
                .unwrap()
                .completed
        );
    }

    #[test]
    fn rejects_duplicate_task_ids() {
        let raw = r#"{"Exercise":[{"id":1,"name":"a"},{"id":1,"name":"b"}]}"#;
        assert!(matches!(
            TaskBoard::decode(raw),
            Err(CodecError::DuplicateTask { id: 1, .. })
        ));
        assert_eq!(TaskBoard::decode_or_default(Some(raw)), TaskBoard::default());
    }

    #[test]
    fn task_with_wrong_types_is_malformed() {
        let raw = r#"{"Exercise":[{"id":"one","name":"a"}]}"#;
        assert!(TaskBoard::decode(raw).is_err());
    }

    #[test]
    fn streak_is_a_decimal_string() {
        assert_eq!(Streak::new(12).encode().unwrap(), "12");
        assert_eq!(Streak::decode(" 7 ").unwrap(), Streak::new(7));
        assert!(Streak::decode("seven").is_err());
        assert_eq!(Streak::decode_or_default(None), Streak::default());
    }

    #[test]
    fn attendance_with_bad_descriptor_falls_back() {
        let raw = r#"{"2024-05-01":{"selected":"yes"}}"#;
        assert!(AttendanceRecord::decode_or_default(Some(raw)).is_empty());
    }
}
