mod actor;
pub mod backend;
pub mod client;
pub mod envelope;
mod handle;
pub mod poll;

pub use backend::ScheduleBackend;
pub use client::HttpBackend;
pub use handle::ScheduleHandle;
pub use poll::{poll_until, PollOptions, PollOutcome, PollTask};
