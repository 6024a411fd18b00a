use serde::{Deserialize, Serialize};

pub const DEFAULT_EVENT_NAME: &str = "Race Results";
pub const DEFAULT_ORGANIZER: &str = "Unknown";
pub const DEFAULT_TIMING_PROVIDER: &str = "MyRace";

/// Display metadata for the event a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInfo {
    pub name: String,
    pub organizer: String,
    pub timing_provider: String,
    pub date: Option<String>,
    pub source_url: Option<String>,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_EVENT_NAME.to_string(),
            organizer: DEFAULT_ORGANIZER.to_string(),
            timing_provider: DEFAULT_TIMING_PROVIDER.to_string(),
            date: None,
            source_url: None,
        }
    }
}
