//! Push subscription handlers.

use actix_web::{HttpResponse, web};
use lexleaks_core::domain::PushSubscription;
use lexleaks_shared::dto::{
    PushSubscriptionResponse, SubscribeRequest, UnsubscribeRequest, UpdatePreferencesRequest,
};
use uuid::Uuid;

use super::params;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn subscription_response(sub: PushSubscription) -> PushSubscriptionResponse {
    PushSubscriptionResponse {
        id: sub.id,
        endpoint: sub.endpoint,
        is_active: sub.is_active,
        notify_new_posts: sub.notify_new_posts,
        notify_updates: sub.notify_updates,
        notify_weekly_digest: sub.notify_weekly_digest,
        created_at: sub.created_at,
    }
}

/// POST /api/push/subscribe
pub async fn subscribe(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<SubscribeRequest>,
) -> AppResult<HttpResponse> {
    let actor = state.optional_actor(identity.0.as_ref()).await?;
    let input = params::new_subscription(body.into_inner());

    let sub = state.subscriptions.subscribe(actor.as_ref(), input).await?;
    Ok(HttpResponse::Ok().json(subscription_response(sub)))
}

/// PUT /api/push/subscriptions/{id}
pub async fn update_preferences(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    id: web::Path<Uuid>,
    body: web::Json<UpdatePreferencesRequest>,
) -> AppResult<HttpResponse> {
    let actor = state.optional_actor(identity.0.as_ref()).await?;
    let prefs = params::preferences(body.into_inner());

    let sub = state
        .subscriptions
        .update_preferences(actor.as_ref(), id.into_inner(), prefs)
        .await?;
    Ok(HttpResponse::Ok().json(subscription_response(sub)))
}

/// POST /api/push/unsubscribe
pub async fn unsubscribe(
    state: web::Data<AppState>,
    body: web::Json<UnsubscribeRequest>,
) -> AppResult<HttpResponse> {
    state.subscriptions.unsubscribe(&body.endpoint).await?;
    Ok(HttpResponse::NoContent().finish())
}
