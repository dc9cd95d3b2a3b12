use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

use gameplan_core::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocationError {
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Device geolocation.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for foreground location access.
    ///
    /// # Errors
    ///
    /// Returns `LocationError` if the platform cannot answer.
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError>;

    /// Current position of the device.
    ///
    /// # Errors
    ///
    /// Returns `LocationError::Unavailable` if no fix can be obtained.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Provider answering with a configured permission and position.
#[derive(Debug)]
pub struct FixedLocationProvider {
    permission: PermissionStatus,
    position: Mutex<Option<Coordinates>>,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn granted(position: Coordinates) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            position: Mutex::new(Some(position)),
        }
    }

    #[must_use]
    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            position: Mutex::new(None),
        }
    }

    /// Permission granted but no fix available.
    #[must_use]
    pub fn without_fix() -> Self {
        Self {
            permission: PermissionStatus::Granted,
            position: Mutex::new(None),
        }
    }

    /// Move the device.
    pub fn set_position(&self, position: Coordinates) {
        if let Ok(mut guard) = self.position.lock() {
            *guard = Some(position);
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(self.permission)
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let guard = self
            .position
            .lock()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        guard.ok_or_else(|| LocationError::Unavailable("no fix".into()))
    }
}
