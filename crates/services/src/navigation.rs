//! Screen transitions requested by services. Rendering them is the host's job.

use std::fmt;
use std::sync::Mutex;

use gameplan_core::model::StudentProfile;

/// Routes registered in the app's navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Loading,
    Login,
    Register,
    ForgotPassword,
    TrainerSignUp,
    StudentSignUp,
    TrainerDashboard,
    StudentDashboard,
    StudentProfile,
    TrainerProfile,
    Settings,
    StudentSettings,
    StudentPage,
}

impl Screen {
    /// Route name as registered with the navigator.
    #[must_use]
    pub fn route_name(self) -> &'static str {
        match self {
            Screen::Loading => "Loading",
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::ForgotPassword => "ForgotPassword",
            Screen::TrainerSignUp => "TrainerSignUp",
            Screen::StudentSignUp => "StudentSignUp",
            Screen::TrainerDashboard => "TrainerDashboard",
            Screen::StudentDashboard => "StudentDashboard",
            Screen::StudentProfile => "StudentProfile",
            Screen::TrainerProfile => "TrainerProfile",
            Screen::Settings => "SettingsScreen",
            Screen::StudentSettings => "StudentSettings",
            Screen::StudentPage => "StudentPage",
        }
    }

    /// The stack's first screen.
    #[must_use]
    pub fn initial() -> Self {
        Screen::Loading
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

/// Parameters passed along with a `navigate` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavParams {
    None,
    Student(StudentProfile),
}

/// A single transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    Replace(Screen),
    Navigate(Screen, NavParams),
    GoBack,
}

/// Sink for transition requests.
pub trait Navigator: Send + Sync {
    /// Swap the current screen without keeping it in history.
    fn replace(&self, screen: Screen);

    /// Push `screen` with `params`.
    fn navigate(&self, screen: Screen, params: NavParams);

    fn go_back(&self);
}

/// Navigator that only remembers what was requested.
///
/// Used by tests and by headless hosts that render nothing.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    requests: Mutex<Vec<NavRequest>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests in order.
    #[must_use]
    pub fn requests(&self) -> Vec<NavRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn last(&self) -> Option<NavRequest> {
        self.requests().pop()
    }

    fn push(&self, request: NavRequest) {
        tracing::debug!(?request, "navigation requested");
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request);
        }
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, screen: Screen) {
        self.push(NavRequest::Replace(screen));
    }

    fn navigate(&self, screen: Screen, params: NavParams) {
        self.push(NavRequest::Navigate(screen, params));
    }

    fn go_back(&self) {
        self.push(NavRequest::GoBack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_route_keeps_registered_name() {
        assert_eq!(Screen::Settings.route_name(), "SettingsScreen");
        assert_eq!(Screen::initial(), Screen::Loading);
    }

    #[test]
    fn records_requests_in_order() {
        let nav = RecordingNavigator::new();
        nav.replace(Screen::Login);
        nav.go_back();
        assert_eq!(
            nav.requests(),
            vec![NavRequest::Replace(Screen::Login), NavRequest::GoBack]
        );
        assert_eq!(nav.last(), Some(NavRequest::GoBack));
    }
}
