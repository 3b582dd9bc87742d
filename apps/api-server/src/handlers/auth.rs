//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use lexleaks_core::domain::User;
use lexleaks_core::ports::{PasswordService, TokenService};
use lexleaks_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
        created_at: user.created_at,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim().to_string();
    let email = req
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    User::validate_registration(&username, &req.password)?;

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already registered".to_string()));
    }

    let password_hash = password_service.hash(&req.password)?;
    let saved = state
        .users
        .insert(User::new(username, email, password_hash))
        .await?;

    tracing::info!(user_id = %saved.id, username = %saved.username, "User registered");
    Ok(HttpResponse::Created().json(user_response(&saved)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let Some(user) = state.users.find_by_username(req.username.trim()).await? else {
        tracing::debug!(username = %req.username, "Login for unknown user");
        return Err(AppError::Unauthorized);
    };

    if !password_service.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %user.username, "Login with wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = token_service.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Ok().json(AuthResponse::bearer(
        token,
        token_service.expiration_seconds().max(0) as u64,
    )))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
