pub mod fingerprint;
pub mod poll_job;
pub mod reader;
pub mod send_budget;

pub use poll_job::PollJob;
pub use reader::{FetchedFeed, FetchedFeedItem};
pub use send_budget::SendBudget;
