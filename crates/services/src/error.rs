//! Shared error types for the services crate.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use gameplan_core::geo::GeoError;
use gameplan_core::model::{ProfileFormError, Streak, TrainerId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::location::LocationError;
use crate::notice::Notice;

/// Collaborator call made by the dashboard tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadProgress,
    SaveTasks,
    SaveAttendance,
    SaveStreak,
    FetchTrainer,
    LocationPermission,
    CurrentPosition,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::LoadProgress => "loading progress",
            Operation::SaveTasks => "saving tasks",
            Operation::SaveAttendance => "saving attendance",
            Operation::SaveStreak => "saving streak",
            Operation::FetchTrainer => "fetching trainer",
            Operation::LocationPermission => "requesting location permission",
            Operation::CurrentPosition => "reading current position",
        };
        f.write_str(label)
    }
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::LoadProgress => "Failed to load dashboard data.",
            Operation::SaveTasks => "Failed to save tasks.",
            Operation::SaveAttendance => "Failed to save attendance.",
            Operation::SaveStreak => "Failed to save progress.",
            Operation::FetchTrainer => "Failed to load trainer details.",
            Operation::LocationPermission | Operation::CurrentPosition => {
                "Unable to determine your location."
            }
        }
    }
}

/// Errors emitted by the dashboard tracker.
///
/// Only `MissingIdentity` ends the session; every other variant leaves state
/// unchanged and the action may simply be retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("student identity is missing")]
    MissingIdentity,
    #[error("not inside the target location")]
    NotInTargetLocation,
    #[error("attendance already marked for {0}")]
    AlreadyMarked(NaiveDate),
    #[error("not every task is completed")]
    IncompleteTasks,
    #[error("streak {0} cannot be advanced further")]
    StreakOverflow(Streak),
    #[error("location permission denied")]
    PermissionDenied,
    #[error("trainer {0} not found")]
    TrainerNotFound(TrainerId),
    #[error("{operation} failed: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: StorageError,
    },
    #[error("{operation} failed: {source}")]
    Location {
        operation: Operation,
        #[source]
        source: LocationError,
    },
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },
    #[error("{operation} was cancelled")]
    Cancelled { operation: Operation },
}

impl TrackerError {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackerError::MissingIdentity)
    }

    /// The alert shown to the user for this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            TrackerError::MissingIdentity => {
                Notice::error("Student data is missing. Please log in again.")
            }
            TrackerError::NotInTargetLocation => {
                Notice::error("You must be in the target location to mark attendance.")
            }
            TrackerError::AlreadyMarked(_) => {
                Notice::new("Attendance", "Attendance has already been marked today.")
            }
            TrackerError::IncompleteTasks => {
                Notice::new("Incomplete Tasks", "Complete all tasks to save progress.")
            }
            TrackerError::StreakOverflow(_) => Notice::error("Failed to save progress."),
            TrackerError::PermissionDenied => Notice::new(
                "Permission Denied",
                "Location permissions are required to mark attendance.",
            ),
            TrackerError::TrainerNotFound(_) => Notice::error("Trainer data not found."),
            TrackerError::Storage { operation, .. }
            | TrackerError::Location { operation, .. }
            | TrackerError::Timeout { operation, .. }
            | TrackerError::Cancelled { operation } => {
                Notice::error(operation.failure_message())
            }
        }
    }
}

/// Attach the failing operation to a collaborator error.
pub(crate) trait IntoTrackerError {
    fn into_tracker(self, operation: Operation) -> TrackerError;
}

impl IntoTrackerError for StorageError {
    fn into_tracker(self, operation: Operation) -> TrackerError {
        TrackerError::Storage {
            operation,
            source: self,
        }
    }
}

impl IntoTrackerError for LocationError {
    fn into_tracker(self, operation: Operation) -> TrackerError {
        TrackerError::Location {
            operation,
            source: self,
        }
    }
}

/// Errors emitted by the HTTP document store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteStoreError {
    #[error("document request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("invalid document path: {0}")]
    InvalidPath(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<RemoteStoreError> for StorageError {
    fn from(err: RemoteStoreError) -> Self {
        match err {
            RemoteStoreError::InvalidPath(path) => StorageError::Serialization(path),
            other => StorageError::Connection(other.to_string()),
        }
    }
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Form(#[from] ProfileFormError),
}

impl ProfileServiceError {
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            ProfileServiceError::Form(_) => Notice::error("All fields are required."),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {key}: {raw:?}")]
    InvalidValue { key: &'static str, raw: String },
    #[error("target location needs latitude, longitude and radius together")]
    IncompleteTarget,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
