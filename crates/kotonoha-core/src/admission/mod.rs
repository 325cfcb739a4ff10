//! Admission control
//!
//! Gatekeeps conversion requests by client identity: at most N admissions per
//! key inside any trailing window of W seconds. Denied checks consume nothing.

mod clock;
mod controller;
mod identity;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{AdmissionController, RateLimitDecision};
pub use identity::{ClientKey, UNKNOWN_CLIENT, derive_client_key};
pub use store::{InMemoryWindowStore, WindowOutcome, WindowPolicy, WindowStore};
