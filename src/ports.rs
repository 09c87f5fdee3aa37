pub mod push;
pub mod store;
pub mod time;

pub use push::PushSender;
pub use store::{SnapshotStore, SubscriptionRegistry};
pub use time::TimeProvider;
