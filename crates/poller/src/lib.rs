pub mod scheduler;

pub use scheduler::{PollScheduler, PollState, PollerStatus};
