//! Application state - shared across all handlers.

use std::sync::Arc;

use lexleaks_core::domain::{Actor, User};
use lexleaks_core::ports::{
    ImpactRepository, PasswordService, PostRepository, PubSub, PushSubscriptionRepository,
    UserRepository,
};
use lexleaks_core::services::{
    ImpactService, NewPostAnnouncer, NotificationDispatcher, PostService, SubscriptionService,
};
use lexleaks_infra::{InMemoryPubSub, InMemoryStore};

#[cfg(feature = "postgres")]
use lexleaks_infra::database::{
    DatabaseConnections, PostgresImpactRepository, PostgresPostRepository,
    PostgresPushSubscriptionRepository, PostgresUserRepository,
};

use crate::config::{AdminBootstrap, AppConfig};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppError;

/// Repository handles for one storage backend.
struct Repositories {
    backend: &'static str,
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    impacts: Arc<dyn ImpactRepository>,
    subscriptions: Arc<dyn PushSubscriptionRepository>,
}

impl Repositories {
    fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            backend: "memory",
            users: Arc::new(store.users()),
            posts: Arc::new(store.posts()),
            impacts: Arc::new(store.impacts()),
            subscriptions: Arc::new(store.subscriptions()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        let db = &connections.main;
        Self {
            backend: "postgres",
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            impacts: Arc::new(PostgresImpactRepository::new(db.clone())),
            subscriptions: Arc::new(PostgresPushSubscriptionRepository::new(db.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub backend: &'static str,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<PostService>,
    pub impacts: Arc<ImpactService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub pubsub: Arc<dyn PubSub>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Falls back to the in-memory store when no database is configured or
    /// the database is unreachable. A failed migration aborts startup.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        #[cfg(feature = "postgres")]
        let repos = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    if config.run_migrations {
                        run_migrations(&connections).await?;
                    }
                    Repositories::postgres(&connections)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                    Repositories::in_memory(&InMemoryStore::new())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                Repositories::in_memory(&InMemoryStore::new())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            if config.database.is_some() {
                tracing::warn!("Built without postgres support, ignoring DATABASE_URL");
            }
            Repositories::in_memory(&InMemoryStore::new())
        };

        let state = Self::from_repositories(repos, Arc::new(InMemoryPubSub::default()));
        tracing::info!(backend = state.backend, "Application state initialized");
        Ok(state)
    }

    /// State over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::from_repositories(
            Repositories::in_memory(&InMemoryStore::new()),
            Arc::new(InMemoryPubSub::default()),
        )
    }

    fn from_repositories(repos: Repositories, pubsub: Arc<dyn PubSub>) -> Self {
        let announcer = NewPostAnnouncer::new(pubsub.clone());
        Self {
            backend: repos.backend,
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.users.clone(),
                announcer,
            )),
            impacts: Arc::new(ImpactService::new(repos.impacts, repos.posts)),
            subscriptions: Arc::new(SubscriptionService::new(repos.subscriptions.clone())),
            dispatcher: Arc::new(NotificationDispatcher::new(repos.subscriptions)),
            users: repos.users,
            pubsub,
        }
    }

    /// Resolve the acting user behind a token. A token whose user no longer
    /// exists is treated as unauthenticated.
    pub async fn actor(&self, identity: &Identity) -> Result<Actor, AppError> {
        let user = self
            .users
            .find_by_id(identity.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %identity.user_id, "Token subject no longer exists");
                AppError::Unauthorized
            })?;
        Ok(Actor::from(&user))
    }

    /// Resolve an optional identity.
    pub async fn optional_actor(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Option<Actor>, AppError> {
        match identity {
            Some(identity) => self.actor(identity).await.map(Some),
            None => Ok(None),
        }
    }

    /// Make sure the configured administrator exists and holds admin rights.
    pub async fn ensure_admin(
        &self,
        admin: &AdminBootstrap,
        passwords: &dyn PasswordService,
    ) -> Result<(), AppError> {
        match self.users.find_by_username(&admin.username).await? {
            Some(user) if user.is_admin => {
                tracing::debug!(username = %admin.username, "Admin account present");
            }
            Some(mut user) => {
                user.is_admin = true;
                user.updated_at = chrono::Utc::now();
                self.users.update(user).await?;
                tracing::info!(username = %admin.username, "Promoted existing user to admin");
            }
            None => {
                User::validate_registration(&admin.username, &admin.password)?;
                let mut user = User::new(admin.username.clone(), None, passwords.hash(&admin.password)?);
                user.is_admin = true;
                self.users.insert(user).await?;
                tracing::info!(username = %admin.username, "Admin account created");
            }
        }
        Ok(())
    }
}

#[cfg(feature = "postgres")]
async fn run_migrations(connections: &DatabaseConnections) -> std::io::Result<()> {
    use migration::{Migrator, MigratorTrait};

    Migrator::up(&connections.main, None).await.map_err(|e| {
        tracing::error!(error = %e, "Database migration failed");
        std::io::Error::other(e)
    })?;
    tracing::info!("Database migrations applied");
    Ok(())
}
