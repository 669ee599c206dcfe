//! View rendering.
//!
//! Pure functions from (configuration, fetched arrival data) to display
//! text. No I/O, no side effects: the same inputs always produce the same
//! text, which is what makes no-op edit skipping safe.
//!
//! Output is Telegram Markdown V1; names coming from the provider are
//! escaped. Missing data degrades per stop: a transient failure renders a
//! "no data" placeholder, an unknown stop identifier a distinct
//! "unknown stop" placeholder, and the rest of the view stays live.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::domain::{StopId, StopQuery, Trip};
use crate::provider::{Departure, Snapshot, StopFetch};

/// Arrivals shown per line.
pub const MAX_ARRIVALS: usize = 3;

/// Escape Markdown V1 special characters in user/API-provided text.
fn escape(text: &str) -> String {
    text.replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace('`', "\\`")
}

/// Format a single arrival: green dot for realtime, plain for scheduled.
fn fmt_arrival(d: &Departure) -> String {
    let base = if d.minutes == 0 {
        "now!".to_string()
    } else {
        format!("{}'", d.minutes)
    };
    if d.realtime { format!("🟢{base}") } else { base }
}

fn fmt_times(arrivals: &[&Departure]) -> String {
    arrivals
        .iter()
        .map(|d| fmt_arrival(d))
        .collect::<Vec<_>>()
        .join("   ")
}

/// The soonest departures of one line at a stop, ascending, at most
/// `MAX_ARRIVALS`.
fn arrivals_for_line<'a>(departures: &'a [Departure], line: &str) -> Vec<&'a Departure> {
    let mut matching: Vec<&Departure> = departures
        .iter()
        .filter(|d| d.line.eq_ignore_ascii_case(line))
        .collect();
    matching.sort_by_key(|d| d.minutes);
    matching.truncate(MAX_ARRIVALS);
    matching
}

/// Display label for a fetched stop: resolved name, else the raw id.
fn stop_label(snapshot: &Snapshot, stop: &StopId) -> String {
    match snapshot.get(stop) {
        Some(StopFetch::Board(board)) => match &board.name {
            Some(name) => escape(name),
            None => stop.to_string(),
        },
        _ => stop.to_string(),
    }
}

/// Build the dashboard card for one trip (one outbound message).
pub fn render_dashboard(trip: &Trip, snapshot: &Snapshot, now: DateTime<FixedOffset>) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(format!("🚋  *{}*", escape(&trip.name)));
    parts.push(format!("⏱  {}", now.format("%H:%M:%S")));

    for combo in &trip.combos {
        parts.push(String::new());
        parts.push(format!("━━━  _{}_  ━━━", escape(&combo.name)));
        parts.push(String::new());
        for leg in &combo.legs {
            parts.push(format!("  🚌  *{}*", escape(&leg.line)));
            match snapshot.get(&leg.boarding) {
                Some(StopFetch::Board(board)) => {
                    let arrivals = arrivals_for_line(&board.departures, &leg.line);
                    // Destination label: the line's reported headsign when it
                    // has upcoming departures, else the alighting stop's name
                    // when another view's fetch resolved it, else its raw id.
                    let dest = arrivals
                        .first()
                        .map(|d| escape(&d.headsign))
                        .unwrap_or_else(|| stop_label(snapshot, &leg.alighting));
                    parts.push(format!(
                        "        {}  ➜  {}",
                        stop_label(snapshot, &leg.boarding),
                        dest
                    ));
                    if arrivals.is_empty() {
                        parts.push("        ⏳  _no upcoming arrivals_".to_string());
                    } else {
                        parts.push(format!("        ⏳  *{}*", fmt_times(&arrivals)));
                    }
                }
                Some(StopFetch::Unknown) => {
                    parts.push(format!(
                        "        {}  ➜  {}",
                        leg.boarding,
                        stop_label(snapshot, &leg.alighting)
                    ));
                    parts.push("        ⚠️  _unknown stop_".to_string());
                }
                Some(StopFetch::Failed) | None => {
                    parts.push(format!(
                        "        {}  ➜  {}",
                        leg.boarding,
                        stop_label(snapshot, &leg.alighting)
                    ));
                    parts.push("        ⚠️  _no data_".to_string());
                }
            }
        }
    }

    parts.join("\n")
}

/// Build the live-stop card: every line observed at the stop, grouped by
/// line, each with its own next departures.
pub fn render_stop_query(
    query: &StopQuery,
    snapshot: &Snapshot,
    now: DateTime<FixedOffset>,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(format!(
        "🚏  *{}*  (`{}`)",
        stop_label(snapshot, &query.stop),
        query.stop
    ));
    parts.push(format!("⏱  {}", now.format("%H:%M:%S")));
    parts.push(format!(
        "⏳  _expires in {} min_",
        query.expires_in_minutes(now.timestamp())
    ));
    parts.push(String::new());

    match snapshot.get(&query.stop) {
        Some(StopFetch::Board(board)) if !board.departures.is_empty() => {
            let mut by_line: BTreeMap<&str, Vec<&Departure>> = BTreeMap::new();
            for d in &board.departures {
                by_line.entry(d.line.as_str()).or_default().push(d);
            }
            for (line, mut arrivals) in by_line {
                arrivals.sort_by_key(|d| d.minutes);
                arrivals.truncate(MAX_ARRIVALS);
                let dest = escape(&arrivals[0].headsign);
                parts.push(format!("  🚌  *{}*  ➜  {}", escape(line), dest));
                parts.push(format!("        ⏳  *{}*", fmt_times(&arrivals)));
                parts.push(String::new());
            }
        }
        Some(StopFetch::Board(_)) => {
            parts.push("_No arrivals_".to_string());
        }
        Some(StopFetch::Unknown) => {
            parts.push("⚠️  _unknown stop_".to_string());
        }
        Some(StopFetch::Failed) | None => {
            parts.push("⚠️  _no data_".to_string());
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Combo, Leg, time::to_rome};
    use crate::provider::StopBoard;
    use chrono::Utc;

    fn stop(s: &str) -> StopId {
        StopId::new(s).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        to_rome(
            chrono::DateTime::parse_from_rfc3339("2025-07-15T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn departure(line: &str, headsign: &str, minutes: i64, realtime: bool) -> Departure {
        Departure {
            line: line.to_string(),
            headsign: headsign.to_string(),
            minutes,
            realtime,
        }
    }

    fn home_office_trip() -> Trip {
        Trip::new(
            "Home → Office",
            vec![
                Combo::new(
                    "Direct 42",
                    vec![Leg::new("42", stop("1132"), stop("40")).unwrap()],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn dashboard_shows_soonest_three_ascending_with_realtime_markers() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: Some("Adriano".to_string()),
                departures: vec![
                    departure("42", "PORTA NUOVA", 3, true),
                    departure("42", "PORTA NUOVA", 15, true),
                    departure("42", "PORTA NUOVA", 30, false),
                ],
            }),
        );

        let text = render_dashboard(&home_office_trip(), &snapshot, now());
        assert!(text.contains("🟢3'   🟢15'   30'"), "got: {text}");
        assert!(text.contains("PORTA NUOVA"));
        assert!(text.contains("Adriano"));
    }

    #[test]
    fn dashboard_caps_at_three_arrivals() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: None,
                departures: vec![
                    departure("42", "PORTA NUOVA", 30, false),
                    departure("42", "PORTA NUOVA", 3, true),
                    departure("42", "PORTA NUOVA", 45, false),
                    departure("42", "PORTA NUOVA", 15, true),
                ],
            }),
        );

        let text = render_dashboard(&home_office_trip(), &snapshot, now());
        assert!(text.contains("🟢3'   🟢15'   30'"));
        assert!(!text.contains("45'"));
    }

    #[test]
    fn dashboard_filters_by_line() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: None,
                departures: vec![
                    departure("4", "FALCHERA", 1, true),
                    departure("42", "PORTA NUOVA", 7, true),
                ],
            }),
        );

        let text = render_dashboard(&home_office_trip(), &snapshot, now());
        assert!(text.contains("🟢7'"));
        assert!(!text.contains("🟢1'"));
        assert!(!text.contains("FALCHERA"));
    }

    #[test]
    fn partial_fetch_degrades_per_leg() {
        let trip = Trip::new(
            "Home → Office",
            vec![
                Combo::new(
                    "Two legs",
                    vec![
                        Leg::new("42", stop("1132"), stop("40")).unwrap(),
                        Leg::new("13", stop("270"), stop("40")).unwrap(),
                    ],
                )
                .unwrap(),
            ],
        )
        .unwrap();

        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: None,
                departures: vec![departure("42", "PORTA NUOVA", 5, true)],
            }),
        );
        snapshot.insert(stop("270"), StopFetch::Failed);

        let text = render_dashboard(&trip, &snapshot, now());
        assert!(text.contains("🟢5'"), "live leg still renders: {text}");
        assert!(text.contains("no data"), "failed leg degrades: {text}");
    }

    #[test]
    fn unknown_stop_is_distinct_from_no_data() {
        let trip = home_office_trip();
        let mut snapshot = Snapshot::new();
        snapshot.insert(stop("1132"), StopFetch::Unknown);

        let text = render_dashboard(&trip, &snapshot, now());
        assert!(text.contains("unknown stop"));
        assert!(!text.contains("no data"));
    }

    #[test]
    fn no_upcoming_arrivals_placeholder() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: None,
                departures: vec![departure("4", "FALCHERA", 2, true)],
            }),
        );

        let text = render_dashboard(&home_office_trip(), &snapshot, now());
        assert!(text.contains("no upcoming arrivals"));
    }

    #[test]
    fn destination_falls_back_to_resolved_alighting_name() {
        let mut snapshot = Snapshot::new();
        // No upcoming departures for line 42 at the boarding stop.
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: Some("Adriano".to_string()),
                departures: vec![],
            }),
        );
        // The alighting stop happens to be in the snapshot (someone else's
        // boarding stop), so its name is available for the label.
        snapshot.insert(
            stop("40"),
            StopFetch::Board(StopBoard {
                name: Some("Porta Nuova".to_string()),
                departures: vec![],
            }),
        );

        let text = render_dashboard(&home_office_trip(), &snapshot, now());
        assert!(text.contains("➜  Porta Nuova"), "got: {text}");
    }

    #[test]
    fn destination_falls_back_to_raw_id_when_name_unresolved() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: None,
                departures: vec![],
            }),
        );

        let text = render_dashboard(&home_office_trip(), &snapshot, now());
        assert!(text.contains("➜  40"), "got: {text}");
    }

    #[test]
    fn stop_query_groups_by_line() {
        let query = StopQuery::open(stop("1132"), now().timestamp(), 15);
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: Some("Adriano".to_string()),
                departures: vec![
                    departure("42", "PORTA NUOVA", 3, true),
                    departure("4", "FALCHERA", 6, false),
                    departure("42", "PORTA NUOVA", 12, true),
                ],
            }),
        );

        let text = render_stop_query(&query, &snapshot, now());
        assert!(text.contains("Adriano"));
        assert!(text.contains("expires in 15 min"));
        assert!(text.contains("FALCHERA"));
        assert!(text.contains("PORTA NUOVA"));
        assert!(text.contains("🟢3'   🟢12'"));
        // Line 4 sorts before line 42.
        let pos4 = text.find("*4*").unwrap();
        let pos42 = text.find("*42*").unwrap();
        assert!(pos4 < pos42);
    }

    #[test]
    fn stop_query_failed_fetch_placeholder() {
        let query = StopQuery::open(stop("999"), now().timestamp(), 15);
        let mut snapshot = Snapshot::new();
        snapshot.insert(stop("999"), StopFetch::Failed);

        let text = render_stop_query(&query, &snapshot, now());
        assert!(text.contains("no data"));
    }

    #[test]
    fn stop_query_unknown_stop_placeholder() {
        let query = StopQuery::open(stop("999"), now().timestamp(), 15);
        let mut snapshot = Snapshot::new();
        snapshot.insert(stop("999"), StopFetch::Unknown);

        let text = render_stop_query(&query, &snapshot, now());
        assert!(text.contains("unknown stop"));
    }

    #[test]
    fn zero_minutes_renders_now() {
        let d = departure("42", "PORTA NUOVA", 0, true);
        assert_eq!(fmt_arrival(&d), "🟢now!");
        let d = departure("42", "PORTA NUOVA", 0, false);
        assert_eq!(fmt_arrival(&d), "now!");
    }

    #[test]
    fn markdown_is_escaped() {
        let trip = Trip::new(
            "a*b_c",
            vec![
                Combo::new(
                    "c_d",
                    vec![Leg::new("42", stop("1"), stop("2")).unwrap()],
                )
                .unwrap(),
            ],
        )
        .unwrap();
        let text = render_dashboard(&trip, &Snapshot::new(), now());
        assert!(text.contains("a\\*b\\_c"));
        assert!(text.contains("c\\_d"));
    }

    #[test]
    fn render_is_deterministic() {
        let trip = home_office_trip();
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: Some("Adriano".to_string()),
                departures: vec![departure("42", "PORTA NUOVA", 3, true)],
            }),
        );
        let at = now();
        assert_eq!(
            render_dashboard(&trip, &snapshot, at),
            render_dashboard(&trip, &snapshot, at)
        );
    }
}
