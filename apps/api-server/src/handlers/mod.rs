//! HTTP handlers and route configuration.

mod auth;
mod health;
mod impacts;
mod params;
mod posts;
mod push;


use std::sync::Arc;

use actix_web::web;
use lexleaks_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. `auth_limiter` throttles the auth scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_limiter: Arc<dyn RateLimiter>) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware::new(auth_limiter))
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Posts
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/published", web::get().to(posts::list_published))
                    .route("/search", web::get().to(posts::search_posts))
                    .route("/slug/{slug}", web::get().to(posts::get_post_by_slug))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            // Impacts
            .service(
                web::scope("/impacts")
                    .route("", web::get().to(impacts::list_impacts))
                    .route("", web::post().to(impacts::create_impact))
                    .route("/{id}", web::get().to(impacts::get_impact))
                    .route("/{id}", web::put().to(impacts::update_impact))
                    .route("/{id}", web::delete().to(impacts::delete_impact)),
            )
            // Push subscriptions
            .service(
                web::scope("/push")
                    .route("/subscribe", web::post().to(push::subscribe))
                    .route(
                        "/subscriptions/{id}",
                        web::put().to(push::update_preferences),
                    )
                    .route("/unsubscribe", web::post().to(push::unsubscribe)),
            ),
    );
}
