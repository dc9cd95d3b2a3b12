use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::navigation::{Navigator, Screen};

/// How long the splash screen stays up before moving on to login.
pub const SPLASH_DELAY: Duration = Duration::from_secs(3);

/// Delayed `replace(Login)` owned by the splash screen.
///
/// Cancelling, or dropping the handle before the delay elapses, means the
/// transition never happens.
pub struct SplashTimer {
    cancel: CancellationToken,
    handle: Option<JoinHandle<bool>>,
}

impl SplashTimer {
    /// Schedule the transition. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(navigator: Arc<dyn Navigator>, delay: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tracing::debug!(?delay, "splash screen started");

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => false,
                () = tokio::time::sleep(delay) => {
                    tracing::debug!("splash finished; navigating to login");
                    navigator.replace(Screen::Login);
                    true
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the timer to settle. Returns true if the transition fired.
    pub async fn finished(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for SplashTimer {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}
