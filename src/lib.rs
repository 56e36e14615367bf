//! pmstore - Policy monitoring event store
//!
//! Persists rootcheck/SCA style policy monitoring alerts into one SQLite
//! store per agent, collapsing repeated findings into a single record with
//! first/last seen dates and PCI-DSS/CIS tags lifted from the log text.

pub mod cli;
pub mod config;
pub mod error;
pub mod recorder;
pub mod storage;
pub mod tags;

pub use error::{ErrorKind, PmError, Result};
pub use recorder::{EventRecorder, Observation};
