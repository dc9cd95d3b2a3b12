use std::env;
use std::time::Duration;

use gameplan_core::geo::{Coordinates, Geofence};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-call time budgets and the attendance target for a dashboard session.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    pub storage_timeout: Duration,
    pub remote_timeout: Duration,
    pub location_timeout: Duration,
    pub geofence: Option<Geofence>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            geofence: None,
        }
    }
}

impl TrackerConfig {
    /// Read overrides from `GAMEPLAN_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable values or a partially specified target.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable values or a partially specified target.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let storage_timeout = millis(&lookup, "GAMEPLAN_STORAGE_TIMEOUT_MS")?
            .unwrap_or(defaults.storage_timeout);
        let remote_timeout = millis(&lookup, "GAMEPLAN_REMOTE_TIMEOUT_MS")?
            .unwrap_or(defaults.remote_timeout);
        let location_timeout = millis(&lookup, "GAMEPLAN_LOCATION_TIMEOUT_MS")?
            .unwrap_or(defaults.location_timeout);

        let lat = number(&lookup, "GAMEPLAN_TARGET_LAT")?;
        let lon = number(&lookup, "GAMEPLAN_TARGET_LON")?;
        let radius = number(&lookup, "GAMEPLAN_TARGET_RADIUS_M")?;
        let geofence = match (lat, lon, radius) {
            (None, None, None) => None,
            (Some(lat), Some(lon), Some(radius)) => {
                let center = Coordinates::new(lat, lon)?;
                Some(Geofence::new(center, radius)?)
            }
            _ => return Err(ConfigError::IncompleteTarget),
        };

        Ok(Self {
            storage_timeout,
            remote_timeout,
            location_timeout,
            geofence,
        })
    }
}

/// Where trainer documents are fetched from over HTTP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
}

impl RemoteStoreConfig {
    /// Returns `Ok(None)` when `GAMEPLAN_DOCS_BASE_URL` is unset or blank.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(raw) = non_blank(&lookup, "GAMEPLAN_DOCS_BASE_URL") else {
            return Ok(None);
        };
        let base_url = Url::parse(&raw).map_err(|_| ConfigError::InvalidBaseUrl(raw.clone()))?;
        let api_key = non_blank(&lookup, "GAMEPLAN_DOCS_API_KEY");
        Ok(Some(Self { base_url, api_key }))
    }
}

fn non_blank(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    non_blank(lookup, key)
        .map(|raw| {
            raw.parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidValue { key, raw })
        })
        .transpose()
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<f64>, ConfigError> {
    non_blank(lookup, key)
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue { key, raw })
        })
        .transpose()
}
