//! Conversion from OTP wire types to engine-facing departures.

use crate::provider::Departure;

use super::types::PatternTimesDto;

/// Directional suffixes OTP appends to GTT route ids, longest first.
const DIRECTION_SUFFIXES: [&str; 5] = ["CDU", "CSU", "SU", "U", "E"];

/// Extract the bare route number from an OTP pattern id.
///
/// Pattern ids look like `gtt:42U` or `gtt:16CDU`: an agency prefix, the
/// route number, and a directional suffix.
pub fn route_from_pattern(pattern_id: &str) -> String {
    let Some((_, route_part)) = pattern_id.split_once(':') else {
        return String::new();
    };
    for suffix in DIRECTION_SUFFIXES {
        // Suffixes are ASCII, so matching byte-for-byte case-insensitively
        // stays on char boundaries even when the route id itself is not ASCII.
        if route_part.len() > suffix.len() {
            let cut = route_part.len() - suffix.len();
            if route_part.is_char_boundary(cut)
                && route_part[cut..].eq_ignore_ascii_case(suffix)
            {
                return route_part[..cut].to_string();
            }
        }
    }
    route_part.to_string()
}

/// Flatten stoptimes patterns into upcoming departures, ascending by minutes.
///
/// Arrivals at or before `now_ts` are dropped; the realtime instant is
/// preferred over the scheduled one when present.
pub fn departures_from_patterns(patterns: &[PatternTimesDto], now_ts: i64) -> Vec<Departure> {
    let mut out: Vec<Departure> = Vec::new();
    for entry in patterns {
        let line = route_from_pattern(&entry.pattern.id);
        if line.is_empty() {
            continue;
        }
        for t in &entry.times {
            let arrival_ts = t.service_day + t.realtime_arrival.unwrap_or(t.scheduled_arrival);
            if arrival_ts <= now_ts {
                continue;
            }
            out.push(Departure {
                line: line.clone(),
                headsign: t.headsign.clone().unwrap_or_else(|| "?".to_string()),
                minutes: (arrival_ts - now_ts) / 60,
                realtime: t.realtime,
            });
        }
    }
    out.sort_by_key(|d| d.minutes);
    out
}
