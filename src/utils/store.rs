use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::models::error::CalendarError;
use crate::models::race::{Calendar, Race, RaceStatus};
use crate::utils::normalizer::{self, parse_timestamp_utc};
use crate::utils::provider::ScheduleProvider;

/// Read-through store for normalized calendars, one JSON document per year.
///
/// Concurrent refreshes of the same year are last-writer-wins: every write
/// replaces the whole document, so a lost race leaves a stale but valid file.
pub struct CalendarStore {
    data_dir: PathBuf,
    provider: Box<dyn ScheduleProvider>,
}

impl CalendarStore {
    pub fn new(data_dir: impl Into<PathBuf>, provider: Box<dyn ScheduleProvider>) -> Self {
        let data_dir = data_dir.into();
        if let Err(err) = fs::create_dir_all(&data_dir) {
            warn!(
                "could not create data directory {}: {err}",
                data_dir.display()
            );
        }
        CalendarStore { data_dir, provider }
    }

    fn calendar_file(&self, year: i32) -> PathBuf {
        self.data_dir.join(format!("f1_calendar_{year}.json"))
    }

    /// Fetch the calendar for a year, preferring the cached document.
    ///
    /// Attempts, in order: cached document (unless forced), fresh fetch plus
    /// persist, stale cached document, empty calendar carrying the fetch
    /// error. Always returns a well-formed calendar.
    pub async fn get_calendar(&self, year: i32, force_refresh: bool) -> Calendar {
        let file = self.calendar_file(year);

        if !force_refresh {
            match self.load_cached(&file) {
                Ok(calendar) => {
                    info!("loaded cached calendar data for {year}");
                    return calendar;
                }
                Err(CalendarError::NotFound(_)) => {}
                Err(err) => warn!("{err}"),
            }
        }

        match self.provider.fetch_schedule(year).await {
            Ok(rows) => {
                let calendar = normalizer::normalize(&rows, year);
                self.persist(&file, &calendar);
                calendar
            }
            Err(err) => {
                error!("error fetching calendar for {year}: {err}");
                match self.load_cached(&file) {
                    Ok(stale) => {
                        info!("using older cached calendar data as fallback");
                        stale
                    }
                    Err(_) => Calendar {
                        year,
                        last_updated: None,
                        races: Vec::new(),
                        error: Some(err.to_string()),
                    },
                }
            }
        }
    }

    /// Earliest race still marked `future` or `current`.
    ///
    /// A completed season degrades to a demo copy of its first race; only a
    /// season with no races at all is a `NotFound`.
    pub async fn next_race(&self, year: i32) -> Result<Race, CalendarError> {
        let calendar = self.get_calendar(year, false).await;
        if calendar.races.is_empty() {
            return Err(CalendarError::NotFound("No upcoming races found".into()));
        }

        let mut next: Option<(DateTime<Utc>, &Race)> = None;
        for race in calendar
            .races
            .iter()
            .filter(|race| matches!(race.status, RaceStatus::Future | RaceStatus::Current))
        {
            let date = match race.date.as_deref() {
                Some(raw) => match parse_timestamp_utc(raw) {
                    Some(parsed) => parsed,
                    None => {
                        warn!("excluding {} from next-race candidates: unparseable date {raw}", race.name);
                        continue;
                    }
                },
                // Undated candidates sort after every dated one.
                None => DateTime::<Utc>::MAX_UTC,
            };
            match &next {
                Some((best, _)) if *best <= date => {}
                _ => next = Some((date, race)),
            }
        }

        if let Some((_, race)) = next {
            return Ok(race.clone());
        }

        info!("no upcoming races in {year}; returning demo race");
        let mut demo = calendar.races[0].clone();
        demo.status = RaceStatus::Future;
        demo.demo_mode = Some(true);
        Ok(demo)
    }

    /// First race whose round number matches.
    pub async fn race_by_round(&self, round: u32, year: i32) -> Result<Race, CalendarError> {
        let calendar = self.get_calendar(year, false).await;
        calendar
            .races
            .iter()
            .find(|race| race.round == Some(round))
            .cloned()
            .ok_or_else(|| {
                CalendarError::NotFound(format!("No race found with round number {round}"))
            })
    }

    fn load_cached(&self, file: &Path) -> Result<Calendar, CalendarError> {
        if !file.exists() {
            return Err(CalendarError::NotFound(format!(
                "no cached calendar at {}",
                file.display()
            )));
        }
        let body = fs::read_to_string(file).map_err(|e| {
            CalendarError::CacheCorrupt(format!("{}: {e}", file.display()))
        })?;
        serde_json::from_str(&body)
            .map_err(|e| CalendarError::CacheCorrupt(format!("{}: {e}", file.display())))
    }

    fn persist(&self, file: &Path, calendar: &Calendar) {
        match serde_json::to_string_pretty(calendar) {
            Ok(body) => match fs::write(file, body) {
                Ok(()) => info!("saved calendar data to {}", file.display()),
                Err(err) => warn!("error saving calendar data to {}: {err}", file.display()),
            },
            Err(err) => warn!("error serializing calendar data: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FakeProvider {
        rows: Result<Vec<Value>, String>,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ScheduleProvider for FakeProvider {
        async fn fetch_schedule(&self, _year: i32) -> Result<Vec<Value>, CalendarError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.rows
                .clone()
                .map_err(CalendarError::ProviderUnavailable)
        }
    }

    fn store_with(
        dir: &TempDir,
        rows: Result<Vec<Value>, String>,
    ) -> (CalendarStore, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let provider = FakeProvider {
            rows,
            fetches: Arc::clone(&fetches),
        };
        (
            CalendarStore::new(dir.path(), Box::new(provider)),
            fetches,
        )
    }

    fn fixture_rows() -> Vec<Value> {
        vec![
            json!({
                "RoundNumber": 1,
                "Country": "Australia",
                "Location": "Melbourne",
                "EventName": "Australian Grand Prix",
                "EventFormat": "conventional",
                "Session5Date": "2024-03-24T05:00:00",
            }),
            json!({
                "RoundNumber": 2,
                "Country": "China",
                "Location": "Shanghai",
                "EventName": "Chinese Grand Prix",
                "EventFormat": "sprint_qualifying",
                "Session5Date": "2099-01-01T07:00:00",
            }),
        ]
    }

    fn write_calendar(dir: &TempDir, year: i32, body: &Value) {
        let path = dir.path().join(format!("f1_calendar_{year}.json"));
        fs::write(path, serde_json::to_string_pretty(body).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn fetches_normalizes_and_persists_on_miss() {
        let dir = TempDir::new().unwrap();
        let (store, fetches) = store_with(&dir, Ok(fixture_rows()));

        let calendar = store.get_calendar(2025, false).await;

        assert_eq!(calendar.year, 2025);
        assert_eq!(calendar.races.len(), 2);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("f1_calendar_2025.json").exists());
    }

    #[tokio::test]
    async fn second_call_hits_cache_not_provider() {
        let dir = TempDir::new().unwrap();
        let (store, fetches) = store_with(&dir, Ok(fixture_rows()));

        let first = store.get_calendar(2025, false).await;
        let second = store.get_calendar(2025, false).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn force_refresh_always_refetches() {
        let dir = TempDir::new().unwrap();
        let (store, fetches) = store_with(&dir, Ok(fixture_rows()));

        store.get_calendar(2025, false).await;
        store.get_calendar(2025, true).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cached_document_is_returned_verbatim() {
        let dir = TempDir::new().unwrap();
        // Status deliberately disagrees with the date: a pass-through must
        // not re-derive it.
        write_calendar(
            &dir,
            2025,
            &json!({
                "year": 2025,
                "last_updated": "2025-01-01T00:00:00+00:00",
                "races": [{
                    "round": 1,
                    "country": "Australia",
                    "location": "Melbourne",
                    "name": "Australian Grand Prix",
                    "official_name": "",
                    "date": "2000-01-01T00:00:00+00:00",
                    "status": "future",
                    "is_sprint": false,
                    "format": "conventional",
                    "sessions": {"race": null},
                }],
            }),
        );
        let (store, fetches) = store_with(&dir, Ok(fixture_rows()));

        let calendar = store.get_calendar(2025, false).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 0);
        assert_eq!(calendar.last_updated.as_deref(), Some("2025-01-01T00:00:00+00:00"));
        assert_eq!(calendar.races[0].status, RaceStatus::Future);
    }

    #[tokio::test]
    async fn corrupt_cache_falls_through_to_fetch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f1_calendar_2025.json"), "{not json").unwrap();
        let (store, fetches) = store_with(&dir, Ok(fixture_rows()));

        let calendar = store.get_calendar(2025, false).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(calendar.races.len(), 2);

        // The overwritten document parses again.
        let saved = fs::read_to_string(dir.path().join("f1_calendar_2025.json")).unwrap();
        let parsed: Calendar = serde_json::from_str(&saved).unwrap();
        assert_eq!(parsed.races.len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_without_cache_returns_error_payload() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store_with(&dir, Err("connection refused".into()));

        let calendar = store.get_calendar(2025, false).await;

        assert_eq!(calendar.year, 2025);
        assert!(calendar.races.is_empty());
        let error = calendar.error.unwrap();
        assert!(error.contains("connection refused"));
    }

    #[tokio::test]
    async fn provider_failure_with_stale_cache_returns_stale() {
        let dir = TempDir::new().unwrap();
        {
            let (store, _) = store_with(&dir, Ok(fixture_rows()));
            store.get_calendar(2025, false).await;
        }

        let (store, fetches) = store_with(&dir, Err("rate limited".into()));
        let calendar = store.get_calendar(2025, true).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(calendar.races.len(), 2);
        assert_eq!(calendar.error, None);
    }

    #[tokio::test]
    async fn next_race_picks_earliest_upcoming() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store_with(&dir, Ok(fixture_rows()));

        let race = store.next_race(2025).await.unwrap();

        assert_eq!(race.name, "Chinese Grand Prix");
        assert_eq!(race.status, RaceStatus::Future);
        assert_eq!(race.demo_mode, None);
    }

    #[tokio::test]
    async fn next_race_ties_keep_list_order() {
        let dir = TempDir::new().unwrap();
        let rows = vec![
            json!({"RoundNumber": 1, "EventName": "First GP", "Session5Date": "2099-01-01T07:00:00"}),
            json!({"RoundNumber": 2, "EventName": "Second GP", "Session5Date": "2099-01-01T07:00:00"}),
        ];
        let (store, _) = store_with(&dir, Ok(rows));

        let race = store.next_race(2025).await.unwrap();
        assert_eq!(race.name, "First GP");
    }

    #[tokio::test]
    async fn next_race_skips_unparseable_dates() {
        let dir = TempDir::new().unwrap();
        write_calendar(
            &dir,
            2025,
            &json!({
                "year": 2025,
                "races": [
                    {
                        "round": 1, "country": "", "location": "",
                        "name": "Broken GP", "official_name": "",
                        "date": "sometime soon", "status": "future",
                        "is_sprint": false, "format": "", "sessions": {},
                    },
                    {
                        "round": 2, "country": "", "location": "",
                        "name": "Valid GP", "official_name": "",
                        "date": "2099-06-01T13:00:00", "status": "future",
                        "is_sprint": false, "format": "", "sessions": {},
                    },
                ],
            }),
        );
        let (store, _) = store_with(&dir, Err("unused".into()));

        let race = store.next_race(2025).await.unwrap();
        assert_eq!(race.name, "Valid GP");
    }

    #[tokio::test]
    async fn completed_season_degrades_to_demo_race() {
        let dir = TempDir::new().unwrap();
        let rows = vec![
            json!({"RoundNumber": 2, "EventName": "Second GP", "Session5Date": "2024-04-07T07:00:00"}),
            json!({"RoundNumber": 1, "EventName": "First GP", "Session5Date": "2024-03-24T05:00:00"}),
        ];
        let (store, _) = store_with(&dir, Ok(rows));

        let race = store.next_race(2024).await.unwrap();

        assert_eq!(race.name, "First GP");
        assert_eq!(race.status, RaceStatus::Future);
        assert_eq!(race.demo_mode, Some(true));
    }

    #[tokio::test]
    async fn empty_season_has_no_next_race_and_no_rounds() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store_with(&dir, Ok(Vec::new()));

        let next = store.next_race(2025).await;
        assert!(matches!(next, Err(CalendarError::NotFound(_))));

        let by_round = store.race_by_round(1, 2025).await;
        assert!(matches!(by_round, Err(CalendarError::NotFound(_))));
    }

    #[tokio::test]
    async fn race_by_round_finds_first_match() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store_with(&dir, Ok(fixture_rows()));

        let race = store.race_by_round(2, 2025).await.unwrap();
        assert_eq!(race.name, "Chinese Grand Prix");
        assert!(race.is_sprint);

        let missing = store.race_by_round(99, 2025).await;
        assert!(matches!(missing, Err(CalendarError::NotFound(_))));
    }
}
