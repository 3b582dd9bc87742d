use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;
use crate::DomainError;

/// Browser push subscription registered by a reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub notify_new_posts: bool,
    pub notify_updates: bool,
    pub notify_weekly_digest: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription payload handed over by the browser.
#[derive(Debug, Clone)]
pub struct NewPushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub user_agent: Option<String>,
}

impl NewPushSubscription {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.endpoint = require_text("endpoint", self.endpoint, None)?;
        self.p256dh = require_text("p256dh", self.p256dh, None)?;
        self.auth = require_text("auth", self.auth, None)?;
        Ok(self)
    }
}

/// Partial update of the notification toggles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub notify_new_posts: Option<bool>,
    pub notify_updates: Option<bool>,
    pub notify_weekly_digest: Option<bool>,
}

/// What a notification is about, matched against subscriber preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTopic {
    NewPosts,
    Updates,
    WeeklyDigest,
}

impl PushSubscription {
    /// New subscriptions are active and opted into new posts and updates.
    pub fn new(user_id: Option<Uuid>, input: NewPushSubscription, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            endpoint: input.endpoint,
            p256dh: input.p256dh,
            auth: input.auth,
            user_agent: input.user_agent,
            is_active: true,
            notify_new_posts: true,
            notify_updates: true,
            notify_weekly_digest: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-register an existing endpoint with fresh keys and reactivate it.
    pub fn refresh(&mut self, user_id: Option<Uuid>, input: NewPushSubscription, now: DateTime<Utc>) {
        self.p256dh = input.p256dh;
        self.auth = input.auth;
        self.user_agent = input.user_agent;
        if user_id.is_some() {
            self.user_id = user_id;
        }
        self.is_active = true;
        self.updated_at = now;
    }

    pub fn apply_preferences(&mut self, prefs: NotificationPreferences, now: DateTime<Utc>) {
        if let Some(v) = prefs.notify_new_posts {
            self.notify_new_posts = v;
        }
        if let Some(v) = prefs.notify_updates {
            self.notify_updates = v;
        }
        if let Some(v) = prefs.notify_weekly_digest {
            self.notify_weekly_digest = v;
        }
        self.updated_at = now;
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn wants(&self, topic: NotificationTopic) -> bool {
        self.is_active
            && match topic {
                NotificationTopic::NewPosts => self.notify_new_posts,
                NotificationTopic::Updates => self.notify_updates,
                NotificationTopic::WeeklyDigest => self.notify_weekly_digest,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser() -> NewPushSubscription {
        NewPushSubscription {
            endpoint: "https://push.example.com/abc".into(),
            p256dh: "key".into(),
            auth: "secret".into(),
            user_agent: Some("Firefox".into()),
        }
    }

    #[test]
    fn test_preferences_and_deactivation() {
        let now = Utc::now();
        let mut sub = PushSubscription::new(None, browser(), now);
        assert!(sub.wants(NotificationTopic::NewPosts));
        assert!(!sub.wants(NotificationTopic::WeeklyDigest));

        sub.apply_preferences(
            NotificationPreferences {
                notify_new_posts: Some(false),
                ..Default::default()
            },
            now,
        );
        assert!(!sub.wants(NotificationTopic::NewPosts));
        assert!(sub.wants(NotificationTopic::Updates));

        sub.deactivate(now);
        assert!(!sub.wants(NotificationTopic::Updates));
    }

    #[test]
    fn test_refresh_reactivates_and_keeps_owner() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let mut sub = PushSubscription::new(Some(owner), browser(), now);
        sub.deactivate(now);

        sub.refresh(None, browser(), now);
        assert!(sub.is_active);
        assert_eq!(sub.user_id, Some(owner));
    }

    #[test]
    fn test_validate_requires_keys() {
        let err = NewPushSubscription {
            auth: " ".into(),
            ..browser()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "auth", .. }));
    }
}
