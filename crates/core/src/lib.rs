//! Punchdesk Core Library
//!
//! Session bookkeeping for the Punchdesk time-clock kiosk: user registry,
//! attendance session ledger, toggle workflow, and report aggregation over
//! one shared SQLite store.

pub mod clock;
pub mod error;
pub mod invariants;
pub mod models;
pub mod report;
pub mod storage;

pub use clock::{Punch, TimeClock};
pub use error::{Error, Result};
pub use models::*;
pub use report::{format_duration, Aggregator, UserTotal};
pub use storage::{Database, SessionRepository, SessionStore, Storage, UserRepository, UserStore};
