#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod location;
pub mod navigation;
pub mod notice;
pub mod profile_service;
pub mod profile_store;
pub mod remote_store;
pub mod splash;
pub mod tracker;

pub use gameplan_core::Clock;

pub use app_services::AppServices;
pub use config::{RemoteStoreConfig, TrackerConfig};
pub use error::{
    AppServicesError, ConfigError, Operation, ProfileServiceError, RemoteStoreError, TrackerError,
};
pub use location::{FixedLocationProvider, LocationError, LocationProvider, PermissionStatus};
pub use navigation::{NavParams, NavRequest, Navigator, RecordingNavigator, Screen};
pub use notice::{Notice, Notifier, RecordingNotifier};
pub use profile_service::ProfileService;
pub use profile_store::{ProfileStore, StudentStore, TrainerStore};
pub use remote_store::HttpDocumentStore;
pub use splash::{SPLASH_DELAY, SplashTimer};
pub use tracker::{DashboardTracker, DashboardView, LocationCheck, TrackerDeps};
