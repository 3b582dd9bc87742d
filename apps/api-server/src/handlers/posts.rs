//! Post handlers: listing engine, lookups and the post lifecycle.

use actix_web::{HttpResponse, web};
use lexleaks_core::query::{PostFilter, PostQuery};
use lexleaks_shared::dto::{
    CreatePostRequest, ListPostsParams, PageParams, SearchPostsParams, UpdatePostRequest,
};
use uuid::Uuid;

use super::params;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsParams>,
) -> AppResult<HttpResponse> {
    let query = params::post_query(query.into_inner())?;
    let posts = state.posts.list(&query).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/published
pub async fn list_published(
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> AppResult<HttpResponse> {
    let query = PostQuery {
        filter: PostFilter::published(),
        page: params::page(query.skip, query.limit),
        ..Default::default()
    };
    let posts = state.posts.list(&query).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/search
pub async fn search_posts(
    state: web::Data<AppState>,
    query: web::Query<SearchPostsParams>,
) -> AppResult<HttpResponse> {
    let query = params::search_query(query.into_inner())?;
    let posts = state.posts.list(&query).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let actor = state.actor(&identity).await?;
    let input = params::new_post(body.into_inner())?;

    let post = state.posts.create(&actor, input).await?;
    let detail = state.posts.get(post.id).await?;
    Ok(HttpResponse::Created().json(detail))
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let detail = state.posts.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/posts/slug/{slug}
pub async fn get_post_by_slug(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let detail = state.posts.get_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let actor = state.actor(&identity).await?;
    let changes = params::post_changes(body.into_inner())?;

    let post = state.posts.update(&actor, id.into_inner(), changes).await?;
    let detail = state.posts.get(post.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = state.actor(&identity).await?;
    state.posts.delete(&actor, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
