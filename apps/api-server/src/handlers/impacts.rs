//! Impact handlers. Mutations are admin-only.

use actix_web::{HttpResponse, web};
use lexleaks_shared::dto::{CreateImpactRequest, ListImpactsParams, UpdateImpactRequest};
use uuid::Uuid;

use super::params;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/impacts
pub async fn list_impacts(
    state: web::Data<AppState>,
    query: web::Query<ListImpactsParams>,
) -> AppResult<HttpResponse> {
    let filter = params::impact_filter(&query)?;
    let page = params::page(query.skip, query.limit);

    let impacts = state.impacts.list(&filter, page).await?;
    Ok(HttpResponse::Ok().json(impacts))
}

/// POST /api/impacts
pub async fn create_impact(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateImpactRequest>,
) -> AppResult<HttpResponse> {
    let actor = state.actor(&identity).await?;
    let input = params::new_impact(body.into_inner())?;

    let impact = state.impacts.create(&actor, input).await?;
    Ok(HttpResponse::Created().json(impact))
}

/// GET /api/impacts/{id}
pub async fn get_impact(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let impact = state.impacts.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(impact))
}

/// PUT /api/impacts/{id}
pub async fn update_impact(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
    body: web::Json<UpdateImpactRequest>,
) -> AppResult<HttpResponse> {
    let actor = state.actor(&identity).await?;
    let changes = params::impact_changes(body.into_inner())?;

    let impact = state.impacts.update(&actor, id.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(impact))
}

/// DELETE /api/impacts/{id}
pub async fn delete_impact(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = state.actor(&identity).await?;
    state.impacts.delete(&actor, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
