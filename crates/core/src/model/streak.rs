use serde::{Deserialize, Serialize};
use std::fmt;

/// Count of successful full-completion saves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Streak(u32);

impl Streak {
    #[must_use]
    pub fn new(days: u32) -> Self {
        Self(days)
    }

    #[must_use]
    pub fn days(self) -> u32 {
        self.0
    }

    /// The streak after one more successful save, or `None` once the counter is full.
    #[must_use]
    pub fn incremented(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
