//! Application services - orchestrate ports to implement the use cases.

mod impacts;
pub mod notifications;
mod posts;
mod subscriptions;

pub use impacts::ImpactService;
pub use notifications::{NEW_POST_CHANNEL, NewPostAnnouncer, NewPostNotification, NotificationDispatcher};
pub use posts::PostService;
pub use subscriptions::SubscriptionService;
