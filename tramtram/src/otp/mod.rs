//! OpenTripPlanner arrival data provider.
//!
//! HTTP client for the Muoversi a Torino OTP index API: per-stop stoptimes
//! and stop-name lookups, converted to engine-facing departure data.

mod client;
mod convert;
mod error;
mod types;

pub use client::{OtpClient, OtpConfig};
pub use convert::{departures_from_patterns, route_from_pattern};
pub use error::OtpError;
pub use types::{PatternRefDto, PatternTimesDto, StopDto, StopTimeDto};
