//! Domain types for the live dashboard engine.
//!
//! Trip configuration, ephemeral stop queries, view identities, and the
//! Europe/Rome wall clock. Types enforce their invariants at construction
//! time; trip graphs deserialized from the persistent store are maintained
//! out of band and trusted here.

mod error;
mod query;
mod stop;
pub mod time;
mod trip;
mod view;

pub use error::DomainError;
pub use query::StopQuery;
pub use stop::StopId;
pub use trip::{Combo, Leg, Trip};
pub use view::ViewKey;
