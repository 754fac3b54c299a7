pub mod error;
pub mod types;

pub use error::{Result, WatchError};
pub use types::{CheckResult, FleetSummary, Outcome};
