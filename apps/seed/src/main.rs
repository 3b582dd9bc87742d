//! Demo data loader.
//!
//! Connects to `DATABASE_URL`, applies pending migrations, makes sure the
//! `ADMIN_USERNAME` account exists with admin rights, then loads the demo
//! posts and impacts.

mod demo;
mod seeder;

use std::env;
use std::sync::Arc;

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lexleaks_core::services::{ImpactService, NewPostAnnouncer, PostService};
use lexleaks_infra::database::{
    PostgresImpactRepository, PostgresPostRepository, PostgresUserRepository,
};
use lexleaks_infra::{Argon2PasswordService, DatabaseConfig, DatabaseConnections, InMemoryPubSub};

use seeder::{Credentials, SeedError, Seeder};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Seeding failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), SeedError> {
    let url = env::var("DATABASE_URL").map_err(|_| SeedError::MissingDatabase)?;
    let credentials = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
        (Ok(username), Ok(password)) => Credentials { username, password },
        _ => return Err(SeedError::MissingAuthor),
    };

    let connections = DatabaseConnections::init(&DatabaseConfig::new(url)).await?;
    Migrator::up(&connections.main, None).await?;
    let db = &connections.main;

    let users = Arc::new(PostgresUserRepository::new(db.clone()));
    let posts = Arc::new(PostgresPostRepository::new(db.clone()));
    let post_service = PostService::new(
        posts.clone(),
        users.clone(),
        NewPostAnnouncer::new(Arc::new(InMemoryPubSub::default())),
    );
    let impact_service = ImpactService::new(Arc::new(PostgresImpactRepository::new(db.clone())), posts);
    let seeder = Seeder::new(users, post_service, impact_service);

    let author = seeder
        .ensure_author(&credentials, &Argon2PasswordService::from_env())
        .await?;
    let report = seeder.run(&author, Utc::now()).await?;

    tracing::info!(
        posts_created = report.posts_created,
        posts_skipped = report.posts_skipped,
        impacts_created = report.impacts_created,
        "Demo content loaded"
    );
    Ok(())
}
