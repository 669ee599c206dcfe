//! OTP HTTP client.
//!
//! Fetches stoptimes and stop names for GTT stops. Uses a semaphore to bound
//! concurrent sub-requests within the per-cycle batch; stop names are cached
//! (they are stable, unlike arrival boards).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache as MokaCache;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::domain::StopId;
use crate::provider::{ArrivalProvider, Snapshot, StopBoard, StopFetch};

use super::convert::departures_from_patterns;
use super::error::OtpError;
use super::types::{PatternTimesDto, StopDto};

/// Default maximum concurrent sub-requests per batch.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Configuration for the OTP client.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Base URL of the OTP index API.
    pub base_url: String,
    /// Agency prefix for stop ids (GTT stops are `gtt:<id>`).
    pub agency: String,
    /// Maximum concurrent requests.
    pub max_concurrent: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// TTL for the stop-name cache in seconds.
    pub name_ttl_secs: u64,
}

impl OtpConfig {
    /// Create a config with the given base URL and defaults elsewhere.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agency: "gtt".to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 15,
            name_ttl_secs: 24 * 60 * 60,
        }
    }

    /// Set the agency prefix.
    pub fn with_agency(mut self, agency: impl Into<String>) -> Self {
        self.agency = agency.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// OTP arrival data client.
pub struct OtpClient {
    http: reqwest::Client,
    base_url: String,
    agency: String,
    semaphore: Arc<Semaphore>,
    names: MokaCache<StopId, String>,
}

impl OtpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OtpConfig) -> Result<Self, OtpError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let names = MokaCache::builder()
            .time_to_live(Duration::from_secs(config.name_ttl_secs))
            .max_capacity(10_000)
            .build();

        Ok(Self {
            http,
            base_url: config.base_url,
            agency: config.agency,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            names,
        })
    }

    fn stop_url(&self, stop: &StopId) -> String {
        format!("{}/stops/{}:{}", self.base_url, self.agency, stop)
    }

    /// Fetch the human-readable name for a stop.
    async fn fetch_stop_name(&self, stop: &StopId) -> Result<Option<String>, OtpError> {
        let response = self.http.get(self.stop_url(stop)).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OtpError::StopUnknown);
        }
        if !status.is_success() {
            return Err(OtpError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        let dto: StopDto = response.json().await.map_err(|e| OtpError::Json {
            message: e.to_string(),
        })?;
        Ok(dto.name)
    }

    /// Fetch upcoming arrival patterns for a stop.
    async fn fetch_stoptimes(&self, stop: &StopId) -> Result<Vec<PatternTimesDto>, OtpError> {
        let url = format!("{}/stoptimes", self.stop_url(stop));
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OtpError::StopUnknown);
        }
        if !status.is_success() {
            return Err(OtpError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        response.json().await.map_err(|e| OtpError::Json {
            message: e.to_string(),
        })
    }

    /// Resolve a stop's display name, consulting the cache first.
    ///
    /// Name lookup failures are soft: the board still renders with the raw
    /// stop id.
    async fn resolve_name(&self, stop: &StopId) -> Option<String> {
        if let Some(name) = self.names.get(stop).await {
            return Some(name);
        }
        match self.fetch_stop_name(stop).await {
            Ok(Some(name)) => {
                self.names.insert(stop.clone(), name.clone()).await;
                Some(name)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(stop = %stop, error = %e, "stop name lookup failed");
                None
            }
        }
    }

    /// Fetch one stop's board, mapping errors to per-stop outcomes.
    async fn fetch_one(&self, stop: &StopId, now_ts: i64) -> StopFetch {
        let permit = self.semaphore.acquire().await;
        if permit.is_err() {
            return StopFetch::Failed;
        }

        match self.fetch_stoptimes(stop).await {
            Ok(patterns) => {
                let departures = departures_from_patterns(&patterns, now_ts);
                let name = self.resolve_name(stop).await;
                StopFetch::Board(StopBoard { name, departures })
            }
            Err(OtpError::StopUnknown) => StopFetch::Unknown,
            Err(e) => {
                warn!(stop = %stop, error = %e, "stoptimes fetch failed");
                StopFetch::Failed
            }
        }
    }
}

impl ArrivalProvider for OtpClient {
    async fn fetch_stops(&self, stops: &HashSet<StopId>) -> Snapshot {
        let now_ts = Utc::now().timestamp();
        let fetches = stops.iter().map(|stop| async move {
            let fetch = self.fetch_one(stop, now_ts).await;
            (stop.clone(), fetch)
        });
        futures::future::join_all(fetches).await.into_iter().collect()
    }
}
