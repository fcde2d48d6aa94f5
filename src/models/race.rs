use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw schedule row as returned by the upstream schedule provider.
/// Every field may be absent or null; both mean "no value".
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "RoundNumber")]
    pub round_number: Option<u32>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "EventName")]
    pub event_name: Option<String>,
    #[serde(rename = "OfficialEventName")]
    pub official_event_name: Option<String>,
    #[serde(rename = "EventDate")]
    pub event_date: Option<String>,
    #[serde(rename = "EventFormat")]
    pub event_format: Option<String>,
    #[serde(rename = "Session1Date")]
    pub session1_date: Option<String>,
    #[serde(rename = "Session2Date")]
    pub session2_date: Option<String>,
    #[serde(rename = "Session3Date")]
    pub session3_date: Option<String>,
    #[serde(rename = "Session4Date")]
    pub session4_date: Option<String>,
    #[serde(rename = "Session5Date")]
    pub session5_date: Option<String>,
}

impl RawEvent {
    /// Raw date string for schedule slot 1..=5, None for anything else.
    pub fn session_date(&self, slot: usize) -> Option<&str> {
        match slot {
            1 => self.session1_date.as_deref(),
            2 => self.session2_date.as_deref(),
            3 => self.session3_date.as_deref(),
            4 => self.session4_date.as_deref(),
            5 => self.session5_date.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    Completed,
    Current,
    Future,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub round: Option<u32>,
    pub country: String,
    pub location: String,
    pub name: String,
    pub official_name: String,
    /// RFC 3339 timestamp of the deciding session, UTC.
    pub date: Option<String>,
    pub status: RaceStatus,
    pub is_sprint: bool,
    pub format: String,
    pub sessions: HashMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub races: Vec<Race>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
