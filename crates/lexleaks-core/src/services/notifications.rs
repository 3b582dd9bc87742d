//! New-content notifications.
//!
//! Publishing a post emits a [`NewPostNotification`] on
//! [`NEW_POST_CHANNEL`]. The [`NotificationDispatcher`] consumes those
//! messages and resolves which push subscriptions should receive them.
//! Transport to the browser push services lives outside this crate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{NotificationTopic, Post, PushSubscription};
use crate::error::DomainError;
use crate::ports::{PubSub, PushSubscriptionRepository};

pub const NEW_POST_CHANNEL: &str = "notifications.new_post";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPostNotification {
    pub post_id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
}

impl From<&Post> for NewPostNotification {
    fn from(post: &Post) -> Self {
        Self {
            post_id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
        }
    }
}

/// Publishes new-post events.
#[derive(Clone)]
pub struct NewPostAnnouncer {
    pubsub: Arc<dyn PubSub>,
}

impl NewPostAnnouncer {
    pub fn new(pubsub: Arc<dyn PubSub>) -> Self {
        Self { pubsub }
    }

    /// Announce a freshly published post. Failures are logged only: the post
    /// is already committed when this runs.
    pub async fn announce(&self, post: &Post) {
        let payload = match serde_json::to_string(&NewPostNotification::from(post)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(post_id = %post.id, error = %e, "Failed to encode notification");
                return;
            }
        };
        if let Err(e) = self.pubsub.publish(NEW_POST_CHANNEL, &payload).await {
            tracing::error!(post_id = %post.id, error = %e, "Failed to publish notification");
        }
    }
}

/// Resolves the audience of a notification.
pub struct NotificationDispatcher {
    subscriptions: Arc<dyn PushSubscriptionRepository>,
}

impl NotificationDispatcher {
    pub fn new(subscriptions: Arc<dyn PushSubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Decode a channel payload and return the subscriptions that should
    /// receive it.
    pub async fn recipients(&self, payload: &str) -> Result<Vec<PushSubscription>, DomainError> {
        let notification: NewPostNotification = serde_json::from_str(payload)
            .map_err(|e| DomainError::Internal(format!("malformed notification: {e}")))?;

        let targets = self
            .subscriptions
            .list_active_for(NotificationTopic::NewPosts)
            .await?;

        tracing::info!(
            post_id = %notification.post_id,
            slug = %notification.slug,
            recipients = targets.len(),
            "Dispatching new post notification"
        );
        Ok(targets)
    }
}
