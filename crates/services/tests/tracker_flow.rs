use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use gameplan_core::geo::{Coordinates, Geofence};
use gameplan_core::model::{
    AttendanceRecord, Streak, StudentId, StudentProfile, Task, TaskBoard, TaskCategory, TaskId,
    TrainerId,
};
use gameplan_core::time::fixed_clock;
use services::tracker::TRAINERS_COLLECTION;
use services::{
    DashboardTracker, FixedLocationProvider, LocationProvider, NavParams, NavRequest, Operation,
    RecordingNavigator, RecordingNotifier, Screen, TrackerConfig, TrackerDeps, TrackerError,
};
use storage::repository::{InMemoryRepository, KeyValueStore, ProgressStore, StorageError};
use tokio_util::sync::CancellationToken;

/// Key-value store whose writes can be switched to fail.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: InMemoryRepository,
    fail_writes: Arc<AtomicBool>,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.set(key, value).await
    }
}

/// Key-value store that never answers.
struct HangingStore;

#[async_trait]
impl KeyValueStore for HangingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        std::future::pending().await
    }
}

struct Harness {
    store: FlakyStore,
    documents: InMemoryRepository,
    location: Arc<FixedLocationProvider>,
    navigator: Arc<RecordingNavigator>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        Self::with_location(FixedLocationProvider::granted(gym()))
    }

    fn with_location(location: FixedLocationProvider) -> Self {
        Self {
            store: FlakyStore::default(),
            documents: InMemoryRepository::new(),
            location: Arc::new(location),
            navigator: Arc::new(RecordingNavigator::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn progress(&self) -> ProgressStore {
        ProgressStore::new(Arc::new(self.store.clone()))
    }

    fn deps_with(&self, kv: Arc<dyn KeyValueStore>) -> TrackerDeps {
        let location: Arc<dyn LocationProvider> = self.location.clone();
        TrackerDeps {
            clock: fixed_clock(),
            progress: ProgressStore::new(kv),
            documents: Arc::new(self.documents.clone()),
            location,
            navigator: self.navigator.clone(),
            notifier: self.notifier.clone(),
            config: TrackerConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    fn deps(&self) -> TrackerDeps {
        self.deps_with(Arc::new(self.store.clone()))
    }

    async fn ready(&self, student: StudentProfile) -> DashboardTracker {
        DashboardTracker::initialize(self.deps(), Some(student))
            .await
            .unwrap()
    }
}

fn gym() -> Coordinates {
    Coordinates::new(40.7128, -74.0060).unwrap()
}

fn gym_fence() -> Geofence {
    Geofence::new(gym(), 100.0).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn student(trainer: &str) -> StudentProfile {
    StudentProfile::new(StudentId::new("s-1"), "Ana", TrainerId::new(trainer))
}

fn board() -> TaskBoard {
    TaskBoard::new()
        .with_tasks(
            TaskCategory::Exercise,
            vec![
                Task::new(TaskId::new(1), "Push-ups"),
                Task::new(TaskId::new(2), "Squats"),
            ],
        )
        .with_tasks(
            TaskCategory::Practice,
            vec![Task::new(TaskId::new(1), "Dribbling")],
        )
}

#[tokio::test]
async fn missing_identity_goes_back_to_login() {
    let h = Harness::new();

    let err = DashboardTracker::initialize(h.deps(), None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, TrackerError::MissingIdentity));
    assert!(err.is_fatal());
    assert_eq!(h.navigator.last(), Some(NavRequest::Replace(Screen::Login)));
    assert_eq!(
        h.notifier.messages(),
        ["Student data is missing. Please log in again."]
    );
}

#[tokio::test]
async fn blank_student_id_counts_as_missing() {
    let h = Harness::new();
    let anonymous = StudentProfile::new(StudentId::new("  "), "Ana", TrainerId::new("t-1"));

    let result = DashboardTracker::initialize(h.deps(), Some(anonymous)).await;
    assert!(matches!(result, Err(TrackerError::MissingIdentity)));
    assert_eq!(h.navigator.requests(), vec![NavRequest::Replace(Screen::Login)]);
}

#[tokio::test]
async fn ready_state_reflects_persisted_progress_and_trainer() {
    let h = Harness::new();
    let progress = h.progress();
    progress.save(&board()).await.unwrap();
    let mut attendance = AttendanceRecord::new();
    attendance.mark(today());
    progress.save(&attendance).await.unwrap();
    progress.save(&Streak::new(4)).await.unwrap();
    h.documents
        .put_document(
            TRAINERS_COLLECTION,
            "t-1",
            json!({ "trainerID": "t-1", "name": "Coach Kim", "sport": "Football" }),
        )
        .unwrap();

    let tracker = h.ready(student("t-1")).await;

    assert_eq!(tracker.tasks(), &board());
    assert_eq!(tracker.streak(), Streak::new(4));
    assert!(tracker.is_attendance_marked());
    assert_eq!(tracker.trainer().unwrap().name, "Coach Kim");
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn malformed_values_fall_back_to_defaults() {
    let h = Harness::new();
    h.store.set("tasks", "{not json").await.unwrap();
    h.store.set("attendanceDates", "[]").await.unwrap();
    h.store.set("streak", "-3").await.unwrap();

    let tracker = h.ready(student("")).await;

    assert_eq!(tracker.tasks().total(), 0);
    assert!(tracker.attendance().is_empty());
    assert_eq!(tracker.streak().days(), 0);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn unknown_trainer_is_reported_but_not_fatal() {
    let h = Harness::new();

    let tracker = h.ready(student("ghost")).await;

    assert!(tracker.trainer().is_none());
    assert_eq!(h.notifier.messages(), ["Trainer data not found."]);
}

#[tokio::test]
async fn trainer_with_null_name_shows_placeholder() {
    let h = Harness::new();
    h.documents
        .put_document(
            TRAINERS_COLLECTION,
            "t-1",
            json!({ "trainerID": "t-1", "name": null }),
        )
        .unwrap();

    let tracker = h.ready(student("t-1")).await;

    assert!(h.notifier.notices().is_empty());
    let trainer = tracker.snapshot().trainer.unwrap();
    assert_eq!(trainer.name, "N/A");
    assert_eq!(trainer.id, "t-1");
}

#[tokio::test]
async fn empty_trainer_id_skips_lookup() {
    let h = Harness::new();

    let tracker = h.ready(student("")).await;

    assert!(tracker.trainer().is_none());
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn toggle_persists_and_double_toggle_restores() {
    let h = Harness::new();
    h.progress().save(&board()).await.unwrap();
    let mut tracker = h.ready(student("")).await;

    let flipped = tracker
        .toggle_task(TaskCategory::Exercise, TaskId::new(2))
        .await
        .unwrap();
    assert_eq!(flipped, Some(true));
    let stored: TaskBoard = h.progress().load().await.unwrap();
    assert!(stored.task(TaskCategory::Exercise, TaskId::new(2)).unwrap().completed);

    tracker
        .toggle_task(TaskCategory::Exercise, TaskId::new(2))
        .await
        .unwrap();
    assert_eq!(tracker.tasks(), &board());
    let stored: TaskBoard = h.progress().load().await.unwrap();
    assert_eq!(stored, board());
}

#[tokio::test]
async fn unknown_task_is_ignored() {
    let h = Harness::new();
    h.progress().save(&board()).await.unwrap();
    let mut tracker = h.ready(student("")).await;

    let outcome = tracker
        .toggle_task(TaskCategory::Practice, TaskId::new(99))
        .await
        .unwrap();

    assert_eq!(outcome, None);
    assert_eq!(tracker.tasks(), &board());
}

#[tokio::test]
async fn failed_task_write_undoes_the_toggle() {
    let h = Harness::new();
    h.progress().save(&board()).await.unwrap();
    let mut tracker = h.ready(student("")).await;
    h.store.fail_writes.store(true, Ordering::SeqCst);

    let err = tracker
        .toggle_task(TaskCategory::Exercise, TaskId::new(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Storage {
            operation: Operation::SaveTasks,
            ..
        }
    ));
    assert!(!err.is_fatal());
    assert_eq!(tracker.tasks(), &board());
    assert_eq!(h.notifier.messages(), ["Failed to save tasks."]);
}

#[tokio::test]
async fn save_progress_requires_every_task() {
    let h = Harness::new();
    h.progress().save(&board()).await.unwrap();
    let mut tracker = h.ready(student("")).await;

    let err = tracker.save_progress().await.unwrap_err();
    assert!(matches!(err, TrackerError::IncompleteTasks));
    assert_eq!(tracker.streak().days(), 0);
    assert_eq!(h.notifier.messages(), ["Complete all tasks to save progress."]);
    assert!(!tracker.snapshot().save_enabled);

    for (category, id) in [
        (TaskCategory::Exercise, 1),
        (TaskCategory::Exercise, 2),
        (TaskCategory::Practice, 1),
    ] {
        tracker.toggle_task(category, TaskId::new(id)).await.unwrap();
    }
    h.notifier.drain();

    let streak = tracker.save_progress().await.unwrap();
    assert_eq!(streak.days(), 1);
    assert_eq!(h.store.get("streak").await.unwrap().as_deref(), Some("1"));
    assert_eq!(h.notifier.messages(), ["Progress saved successfully!"]);
    // Task flags survive the save.
    assert!(tracker.tasks().all_completed());
}

#[tokio::test]
async fn empty_board_saves_progress_vacuously() {
    let h = Harness::new();
    h.progress().save(&Streak::new(9)).await.unwrap();
    let mut tracker = h.ready(student("")).await;

    assert_eq!(tracker.save_progress().await.unwrap(), Streak::new(10));
}

#[tokio::test]
async fn full_streak_counter_is_refused_without_writing() {
    let h = Harness::new();
    h.store.set("streak", "4294967295").await.unwrap();
    let mut tracker = h.ready(student("")).await;
    assert_eq!(tracker.streak(), Streak::new(u32::MAX));

    let err = tracker.save_progress().await.unwrap_err();

    assert!(matches!(err, TrackerError::StreakOverflow(_)));
    assert!(!err.is_fatal());
    assert_eq!(tracker.streak(), Streak::new(u32::MAX));
    assert_eq!(
        h.store.get("streak").await.unwrap().as_deref(),
        Some("4294967295")
    );
    assert_eq!(h.notifier.messages(), ["Failed to save progress."]);
}

#[tokio::test]
async fn failed_streak_write_keeps_old_streak() {
    let h = Harness::new();
    h.progress().save(&Streak::new(2)).await.unwrap();
    let mut tracker = h.ready(student("")).await;
    h.store.fail_writes.store(true, Ordering::SeqCst);

    tracker.save_progress().await.unwrap_err();

    assert_eq!(tracker.streak(), Streak::new(2));
    assert_eq!(h.notifier.messages(), ["Failed to save progress."]);
}

#[tokio::test]
async fn attendance_is_marked_at_most_once_and_only_on_site() {
    let far = Coordinates::new(40.7306, -73.9352).unwrap();
    let h = Harness::with_location(FixedLocationProvider::granted(far));
    let mut tracker = h.ready(student("")).await;

    let err = tracker.mark_attendance().await.unwrap_err();
    assert!(matches!(err, TrackerError::NotInTargetLocation));

    let check = tracker.evaluate_location(gym_fence()).await.unwrap();
    assert!(!check.inside);
    assert!(check.distance_meters > 100.0);
    assert!(tracker.mark_attendance().await.is_err());

    h.location.set_position(gym());
    let check = tracker.evaluate_location(gym_fence()).await.unwrap();
    assert!(check.inside);
    assert_eq!(check.distance_meters, 0.0);

    assert_eq!(tracker.mark_attendance().await.unwrap(), today());
    let stored: AttendanceRecord = h.progress().load().await.unwrap();
    assert!(stored.is_marked(today()));

    let err = tracker.mark_attendance().await.unwrap_err();
    assert!(matches!(err, TrackerError::AlreadyMarked(day) if day == today()));
    assert_eq!(tracker.attendance().len(), 1);
    assert_eq!(
        h.notifier.messages(),
        [
            "You must be in the target location to mark attendance.",
            "You must be in the target location to mark attendance.",
            "Attendance marked successfully!",
            "Attendance has already been marked today.",
        ]
    );
}

#[tokio::test]
async fn previously_marked_day_is_rejected_after_restart() {
    let h = Harness::new();
    let mut attendance = AttendanceRecord::new();
    attendance.mark(today());
    h.progress().save(&attendance).await.unwrap();

    let mut tracker = h.ready(student("")).await;
    tracker.evaluate_location(gym_fence()).await.unwrap();

    assert!(matches!(
        tracker.mark_attendance().await,
        Err(TrackerError::AlreadyMarked(_))
    ));
    assert_eq!(tracker.snapshot().attendance_button.label, "Attendance Marked");
}

#[tokio::test]
async fn failed_attendance_write_is_rolled_back() {
    let h = Harness::new();
    let mut tracker = h.ready(student("")).await;
    tracker.evaluate_location(gym_fence()).await.unwrap();
    h.store.fail_writes.store(true, Ordering::SeqCst);

    let err = tracker.mark_attendance().await.unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Storage {
            operation: Operation::SaveAttendance,
            ..
        }
    ));
    assert!(!tracker.is_attendance_marked());
    assert!(tracker.attendance().is_empty());

    h.store.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(tracker.mark_attendance().await.unwrap(), today());
}

#[tokio::test]
async fn denied_permission_leaves_location_flag_unset() {
    let h = Harness::with_location(FixedLocationProvider::denied());
    let mut tracker = h.ready(student("")).await;

    let err = tracker.evaluate_location(gym_fence()).await.unwrap_err();

    assert!(matches!(err, TrackerError::PermissionDenied));
    assert!(!tracker.is_in_target_location());
    assert_eq!(
        h.notifier.messages(),
        ["Location permissions are required to mark attendance."]
    );
}

#[tokio::test]
async fn missing_fix_keeps_previous_location_flag() {
    let h = Harness::new();
    let mut tracker = h.ready(student("")).await;
    tracker.evaluate_location(gym_fence()).await.unwrap();
    assert!(tracker.is_in_target_location());

    let h2 = Harness::with_location(FixedLocationProvider::without_fix());
    let mut blind = h2.ready(student("")).await;
    let err = blind.evaluate_location(gym_fence()).await.unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Location {
            operation: Operation::CurrentPosition,
            ..
        }
    ));
    assert!(!blind.is_in_target_location());
    assert_eq!(h2.notifier.messages(), ["Unable to determine your location."]);
}

#[tokio::test]
async fn configured_geofence_is_optional() {
    let h = Harness::new();
    let mut tracker = h.ready(student("")).await;
    assert_eq!(tracker.evaluate_configured_location().await.unwrap(), None);

    let mut deps = h.deps();
    deps.config.geofence = Some(gym_fence());
    let mut tracker = DashboardTracker::initialize(deps, Some(student("")))
        .await
        .unwrap();
    let check = tracker.evaluate_configured_location().await.unwrap().unwrap();
    assert!(check.inside);
}

#[tokio::test(start_paused = true)]
async fn hung_storage_times_out_into_defaults() {
    let h = Harness::new();

    let deps = h.deps_with(Arc::new(HangingStore));
    let mut tracker = DashboardTracker::initialize(deps, Some(student("")))
        .await
        .unwrap();

    assert_eq!(tracker.tasks().total(), 0);
    assert_eq!(h.notifier.messages(), ["Failed to load dashboard data."]);

    let err = tracker.save_progress().await.unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Timeout {
            operation: Operation::SaveStreak,
            ..
        }
    ));
    assert_eq!(tracker.streak().days(), 0);
}

#[tokio::test]
async fn cancelled_session_abandons_calls() {
    let h = Harness::new();
    h.progress().save(&board()).await.unwrap();
    let mut tracker = h.ready(student("")).await;

    tracker.cancellation_token().cancel();
    let err = tracker
        .toggle_task(TaskCategory::Exercise, TaskId::new(1))
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Cancelled { .. }));
    assert_eq!(tracker.tasks(), &board());
}

#[tokio::test]
async fn snapshot_describes_the_dashboard() {
    let h = Harness::new();
    h.progress().save(&board()).await.unwrap();
    h.progress().save(&Streak::new(3)).await.unwrap();
    h.documents
        .put_document(TRAINERS_COLLECTION, "t-1", json!({ "name": "Coach Kim" }))
        .unwrap();
    let mut tracker = h.ready(student("t-1")).await;
    tracker.evaluate_location(gym_fence()).await.unwrap();

    let view = tracker.snapshot();

    assert_eq!(view.student_name, "Ana");
    assert_eq!(view.student_id, "s-1");
    assert_eq!(view.initial, "A");
    let trainer = view.trainer.unwrap();
    assert_eq!(trainer.name, "Coach Kim");
    assert_eq!(trainer.id, "N/A");
    assert_eq!(view.streak_label, "🔥 Streak: 3 days");
    assert_eq!(view.attendance_button.label, "Mark Attendance");
    assert!(view.attendance_button.enabled);
    assert_eq!(view.categories.len(), 2);
    assert_eq!(view.categories[0].category, TaskCategory::Exercise);
    assert_eq!(view.categories[0].tasks[1].name, "Squats");
    assert!(view.marked_dates.is_empty());
}

#[tokio::test]
async fn profile_button_opens_student_profile() {
    let h = Harness::new();
    let tracker = h.ready(student("t-1")).await;
    h.notifier.drain();

    tracker.go_to_profile();

    assert_eq!(
        h.navigator.last(),
        Some(NavRequest::Navigate(
            Screen::StudentProfile,
            NavParams::Student(student("t-1"))
        ))
    );
}
