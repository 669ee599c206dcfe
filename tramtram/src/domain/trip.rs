//! Trip configuration types.
//!
//! A `Trip` is a user-named origin-destination intent; it owns an ordered
//! sequence of `Combo`s, each of which owns an ordered, non-empty sequence
//! of `Leg`s. Display order is configuration order throughout.

use serde::{Deserialize, Serialize};

use super::{DomainError, StopId};

/// A single ride segment: line, boarding stop, alighting stop.
///
/// The alighting stop is used only to resolve a human-readable destination
/// label; live timing always comes from the boarding stop's board.
///
/// # Invariants
///
/// - The line identifier is non-empty.
/// - Boarding and alighting stops are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub line: String,
    pub boarding: StopId,
    pub alighting: StopId,
}

impl Leg {
    /// Construct a leg, validating its invariants.
    pub fn new(
        line: impl Into<String>,
        boarding: StopId,
        alighting: StopId,
    ) -> Result<Self, DomainError> {
        let line = line.into();
        if line.trim().is_empty() {
            return Err(DomainError::InvalidLeg("line must not be empty"));
        }
        if boarding == alighting {
            return Err(DomainError::InvalidLeg(
                "boarding and alighting stops must differ",
            ));
        }
        Ok(Leg {
            line: line.trim().to_string(),
            boarding,
            alighting,
        })
    }
}

/// One concrete way to realize a trip: an ordered, non-empty list of legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub name: String,
    pub legs: Vec<Leg>,
}

impl Combo {
    /// Construct a combo; it must have a name and at least one leg.
    pub fn new(name: impl Into<String>, legs: Vec<Leg>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        if legs.is_empty() {
            return Err(DomainError::EmptyCombo);
        }
        Ok(Combo {
            name: name.trim().to_string(),
            legs,
        })
    }
}

/// A user-named origin-destination intent, unique by name within a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub name: String,
    pub combos: Vec<Combo>,
}

impl Trip {
    /// Construct a trip; the name must be non-empty.
    pub fn new(name: impl Into<String>, combos: Vec<Combo>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        Ok(Trip {
            name: name.trim().to_string(),
            combos,
        })
    }

    /// Boarding stops of every leg, in configuration order (with repeats).
    pub fn boarding_stops(&self) -> impl Iterator<Item = &StopId> {
        self.combos
            .iter()
            .flat_map(|c| c.legs.iter())
            .map(|l| &l.boarding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(s: &str) -> StopId {
        StopId::new(s).unwrap()
    }

    #[test]
    fn leg_requires_distinct_stops() {
        let result = Leg::new("42", stop("1132"), stop("1132"));
        assert_eq!(
            result,
            Err(DomainError::InvalidLeg(
                "boarding and alighting stops must differ"
            ))
        );
    }

    #[test]
    fn leg_requires_line() {
        let result = Leg::new("  ", stop("1132"), stop("40"));
        assert!(matches!(result, Err(DomainError::InvalidLeg(_))));
    }

    #[test]
    fn combo_requires_legs() {
        assert_eq!(Combo::new("Direct 42", vec![]), Err(DomainError::EmptyCombo));
    }

    #[test]
    fn combo_requires_name() {
        let leg = Leg::new("42", stop("1132"), stop("40")).unwrap();
        assert_eq!(Combo::new("", vec![leg]), Err(DomainError::EmptyName));
    }

    #[test]
    fn trip_boarding_stops_in_config_order() {
        let combo1 = Combo::new(
            "Direct 42",
            vec![Leg::new("42", stop("1132"), stop("40")).unwrap()],
        )
        .unwrap();
        let combo2 = Combo::new(
            "Via center",
            vec![
                Leg::new("4", stop("472"), stop("270")).unwrap(),
                Leg::new("13", stop("270"), stop("40")).unwrap(),
            ],
        )
        .unwrap();
        let trip = Trip::new("Home → Office", vec![combo1, combo2]).unwrap();

        let stops: Vec<&str> = trip.boarding_stops().map(|s| s.as_str()).collect();
        assert_eq!(stops, vec!["1132", "472", "270"]);
    }

    #[test]
    fn trip_round_trips_through_json() {
        let trip = Trip::new(
            "Home → Office",
            vec![
                Combo::new(
                    "Direct 42",
                    vec![Leg::new("42", stop("1132"), stop("40")).unwrap()],
                )
                .unwrap(),
            ],
        )
        .unwrap();

        let json = serde_json::to_string(&trip).unwrap();
        let back: Trip = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trip);
    }
}
