//! In-memory pub/sub over tokio broadcast channels.
//!
//! Works within a single process only. Each subscription runs its handler
//! on a spawned task; a slow handler lags instead of blocking publishers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use lexleaks_core::ports::{MessageHandler, PubSub, PubSubError, PubSubMessage};

pub struct InMemoryPubSub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    buffer_size: usize,
}

impl InMemoryPubSub {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }
}

impl Default for InMemoryPubSub {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl PubSub for InMemoryPubSub {
    async fn publish(&self, channel: &str, message: &str) -> Result<(), PubSubError> {
        let channels = self.channels.read().await;

        match channels.get(channel) {
            Some(sender) => {
                // No live receivers is not an error.
                let receivers = sender.send(message.to_string()).unwrap_or(0);
                tracing::debug!(%channel, receivers, "Message published");
            }
            None => tracing::debug!(%channel, "No subscribers for channel"),
        }

        Ok(())
    }

    async fn subscribe(&self, channel: &str, handler: MessageHandler) -> Result<(), PubSubError> {
        let mut channels = self.channels.write().await;

        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);

        let mut receiver = sender.subscribe();
        let channel_name = channel.to_string();

        tokio::spawn(async move {
            tracing::info!(channel = %channel_name, "Subscribed to channel");

            loop {
                match receiver.recv().await {
                    Ok(payload) => {
                        let msg = PubSubMessage {
                            channel: channel_name.clone(),
                            payload,
                        };
                        handler(msg).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            channel = %channel_name,
                            lagged = count,
                            "Subscriber lagged behind"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(channel = %channel_name, "Channel closed");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError> {
        let mut channels = self.channels.write().await;
        channels.remove(channel);
        tracing::info!(%channel, "Unsubscribed from channel");
        Ok(())
    }
}
