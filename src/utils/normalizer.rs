use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::models::error::CalendarError;
use crate::models::race::{Calendar, Race, RaceStatus, RawEvent};

/// Session-name tables keyed by weekend format. Slots 1, 4 and 5 are shared;
/// sprint weekends repurpose slots 2 and 3.
const CONVENTIONAL_SESSIONS: [(&str, usize); 5] = [
    ("practice1", 1),
    ("practice2", 2),
    ("practice3", 3),
    ("qualifying", 4),
    ("race", 5),
];

const SPRINT_SESSIONS: [(&str, usize); 5] = [
    ("practice1", 1),
    ("sprint_qualifying", 2),
    ("sprint", 3),
    ("qualifying", 4),
    ("race", 5),
];

/// Turn the provider's raw rows into a sorted, UTC-normalized calendar.
pub fn normalize(raw_events: &[Value], year: i32) -> Calendar {
    normalize_at(raw_events, year, Utc::now())
}

fn normalize_at(raw_events: &[Value], year: i32, now: DateTime<Utc>) -> Calendar {
    let mut races = Vec::with_capacity(raw_events.len());
    for row in raw_events {
        match normalize_event(row, now) {
            Ok(race) => races.push(race),
            Err(err) => warn!("skipping schedule row: {err}"),
        }
    }

    // Stable sort keeps source order on equal rounds; missing rounds go last.
    races.sort_by_key(|race| race.round.unwrap_or(u32::MAX));

    Calendar {
        year,
        last_updated: Some(now.to_rfc3339()),
        races,
        error: None,
    }
}

fn normalize_event(row: &Value, now: DateTime<Utc>) -> Result<Race, CalendarError> {
    let event: RawEvent = serde_json::from_value(row.clone())
        .map_err(|e| CalendarError::MalformedRecord(e.to_string()))?;

    let format = event.event_format.clone().unwrap_or_default();
    let is_sprint = format.to_lowercase().contains("sprint");
    if is_sprint {
        info!(
            "sprint weekend detected: {} ({format})",
            event.event_name.as_deref().unwrap_or("unnamed event")
        );
    }

    // The race itself is the last scheduled session; fall back to the
    // event-level date when the session slots are empty.
    let date = event
        .session5_date
        .as_deref()
        .or(event.session4_date.as_deref())
        .or(event.event_date.as_deref())
        .and_then(parse_timestamp_utc);

    let status = match date {
        None => RaceStatus::Future,
        Some(d) if d < now => RaceStatus::Completed,
        Some(d) if d.date_naive() == now.date_naive() => RaceStatus::Current,
        Some(_) => RaceStatus::Future,
    };

    let table = if is_sprint {
        &SPRINT_SESSIONS
    } else {
        &CONVENTIONAL_SESSIONS
    };
    let mut sessions = HashMap::with_capacity(table.len());
    for (name, slot) in table {
        let stamp = event
            .session_date(*slot)
            .and_then(parse_timestamp_utc)
            .map(|d| d.to_rfc3339());
        sessions.insert((*name).to_string(), stamp);
    }

    Ok(Race {
        round: event.round_number,
        country: event.country.unwrap_or_default(),
        location: event.location.unwrap_or_default(),
        name: event.event_name.unwrap_or_default(),
        official_name: event.official_event_name.unwrap_or_default(),
        date: date.map(|d| d.to_rfc3339()),
        status,
        is_sprint,
        format,
        sessions,
        demo_mode: None,
    })
}

/// Parse a provider or cached timestamp. Timestamps without an offset are
/// assumed to already be UTC; aware ones are converted.
pub fn parse_timestamp_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Some(aware.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
