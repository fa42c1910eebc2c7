use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::model::record::Stored;

/// The activity log never holds more than this many entries.
pub const MAX_ACTIVITY: usize = 10;

/// One line of the recent-activity log, stored newest first under
/// `"recentActivity"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub message: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl Activity {
    pub fn new(message: impl Into<String>, timestamp: i64) -> Self {
        Activity {
            message: message.into(),
            timestamp,
        }
    }

    /// The timestamp in local time, if it is representable.
    pub fn local_time(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }
}

impl Stored for Activity {
    const KEY: &'static str = "recentActivity";
}
