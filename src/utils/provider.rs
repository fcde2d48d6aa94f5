use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::models::error::CalendarError;

/// Upstream source of raw schedule rows for a season.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn fetch_schedule(&self, year: i32) -> Result<Vec<Value>, CalendarError>;
}

pub struct HttpScheduleProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScheduleProvider {
    pub fn new(base_url: &str) -> Self {
        HttpScheduleProvider {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ScheduleProvider for HttpScheduleProvider {
    async fn fetch_schedule(&self, year: i32) -> Result<Vec<Value>, CalendarError> {
        let url = format!("{}/schedule_{}.json", self.base_url, year);
        info!("fetching schedule from {url}");

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CalendarError::ProviderUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            return Err(CalendarError::ProviderUnavailable(format!(
                "schedule request for {year} returned {}",
                res.status()
            )));
        }

        let body = res
            .text()
            .await
            .map_err(|e| CalendarError::ProviderUnavailable(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            CalendarError::ProviderUnavailable(format!("unexpected schedule payload: {e}"))
        })
    }
}
