pub mod forward_config;
pub mod forward_session;
pub mod subscription;

pub use forward_config::ForwardConfig;
pub use forward_session::{ForwardSession, SessionSubscription};
pub use subscription::{Subscription, SubscriptionKind};
