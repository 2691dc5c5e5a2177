pub mod account;
pub mod chart;
pub mod cli;
pub mod constants;
pub mod feed;
pub mod history;
pub mod identity;
pub mod insight;
pub mod logging;
pub mod model;
pub mod portfolio;
pub mod quote;
pub mod report;
pub mod session;
pub mod storage;
pub mod subscriptions;
mod sync;
pub mod tail;

pub use feed::{FeedConfig, FeedSubscription, PriceFeed};
pub use identity::{Identity, IdentityStore};
pub use quote::Quote;
pub use session::Session;
pub use subscriptions::SubscriptionStore;
