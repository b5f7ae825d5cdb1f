//! Poll loop: fetch → validate → format → notify → sleep, forever.

mod cycle;
mod source;
mod state;

pub use cycle::{CycleError, CycleOutcome, PollLoop};
pub use source::{Clock, StatusSource, SystemClock};
pub use state::PollState;
