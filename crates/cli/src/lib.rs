//! Registration preview: replays a scripted edit session against a first-time
//! registration and reports what the edit screen would show.

pub mod scenario;

pub use scenario::{Operation, Rejection, Report, Scenario, run};
