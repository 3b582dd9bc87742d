//! Push subscription management.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Actor, NewPushSubscription, NotificationPreferences, PushSubscription};
use crate::error::{DomainError, RepoError};
use crate::ports::PushSubscriptionRepository;

pub struct SubscriptionService {
    subscriptions: Arc<dyn PushSubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(subscriptions: Arc<dyn PushSubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Register an endpoint, or refresh and reactivate it if already known.
    pub async fn subscribe(
        &self,
        actor: Option<&Actor>,
        input: NewPushSubscription,
    ) -> Result<PushSubscription, DomainError> {
        let input = input.validate()?;
        let user_id = actor.map(|a| a.user_id);
        let now = Utc::now();

        match self.subscriptions.find_by_endpoint(&input.endpoint).await? {
            Some(mut existing) => {
                existing.refresh(user_id, input, now);
                let saved = self.subscriptions.update(existing).await?;
                tracing::info!(subscription_id = %saved.id, "Push subscription refreshed");
                Ok(saved)
            }
            None => {
                let saved = self
                    .subscriptions
                    .insert(PushSubscription::new(user_id, input, now))
                    .await?;
                tracing::info!(subscription_id = %saved.id, "Push subscription created");
                Ok(saved)
            }
        }
    }

    /// Change notification toggles. Subscriptions bound to a user may only be
    /// changed by that user or an admin.
    pub async fn update_preferences(
        &self,
        actor: Option<&Actor>,
        id: Uuid,
        prefs: NotificationPreferences,
    ) -> Result<PushSubscription, DomainError> {
        let mut subscription = self
            .subscriptions
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("PushSubscription", id))?;

        if let Some(owner) = subscription.user_id {
            match actor {
                None => return Err(DomainError::Unauthenticated),
                Some(actor) if !actor.can_modify(owner) => return Err(DomainError::Forbidden),
                Some(_) => {}
            }
        }

        subscription.apply_preferences(prefs, Utc::now());
        match self.subscriptions.update(subscription).await {
            Ok(saved) => Ok(saved),
            Err(RepoError::NotFound) => Err(DomainError::not_found("PushSubscription", id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Stop delivering to an endpoint.
    pub async fn unsubscribe(&self, endpoint: &str) -> Result<(), DomainError> {
        let mut subscription = self
            .subscriptions
            .find_by_endpoint(endpoint)
            .await?
            .ok_or_else(|| DomainError::not_found("PushSubscription", endpoint))?;

        subscription.deactivate(Utc::now());
        self.subscriptions.update(subscription).await?;
        tracing::info!("Push subscription deactivated");
        Ok(())
    }
}
