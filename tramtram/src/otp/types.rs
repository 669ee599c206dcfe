//! Wire types for the OTP index API.
//!
//! Only the fields the engine consumes are modeled; everything else in the
//! responses is ignored.

use serde::Deserialize;

/// `GET /stops/{agency}:{id}` response (subset).
#[derive(Debug, Clone, Deserialize)]
pub struct StopDto {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of the `GET /stops/{agency}:{id}/stoptimes` response:
/// a pattern (route + direction) with its upcoming times.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternTimesDto {
    pub pattern: PatternRefDto,
    #[serde(default)]
    pub times: Vec<StopTimeDto>,
}

/// Pattern reference inside a stoptimes entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternRefDto {
    #[serde(default)]
    pub id: String,
}

/// A single scheduled/realtime arrival within a pattern.
///
/// Arrival instants are `service_day + (realtime_arrival | scheduled_arrival)`
/// unix seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTimeDto {
    #[serde(default)]
    pub service_day: i64,
    #[serde(default)]
    pub scheduled_arrival: i64,
    #[serde(default)]
    pub realtime_arrival: Option<i64>,
    #[serde(default)]
    pub realtime: bool,
    #[serde(default)]
    pub headsign: Option<String>,
}
