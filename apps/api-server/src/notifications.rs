//! Background fan-out of new-post notifications.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lexleaks_core::ports::{PubSub, PubSubError, PubSubMessage};
use lexleaks_core::services::{NEW_POST_CHANNEL, NotificationDispatcher};

/// Subscribe the dispatcher to the new-post channel. Each message resolves
/// its recipients and hands them to delivery, which is logged only.
pub async fn start_dispatcher(
    pubsub: &dyn PubSub,
    dispatcher: Arc<NotificationDispatcher>,
) -> Result<(), PubSubError> {
    pubsub
        .subscribe(
            NEW_POST_CHANNEL,
            Box::new(move |msg: PubSubMessage| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                let dispatcher = dispatcher.clone();
                Box::pin(async move {
                    match dispatcher.recipients(&msg.payload).await {
                        Ok(targets) => {
                            for target in targets {
                                tracing::debug!(
                                    subscription_id = %target.id,
                                    endpoint = %target.endpoint,
                                    "Push delivery queued"
                                );
                            }
                        }
                        Err(e) => {
                            tracing::error!(channel = %msg.channel, error = %e, "Notification dispatch failed");
                        }
                    }
                })
            }),
        )
        .await
}
