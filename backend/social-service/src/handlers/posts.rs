/// Post handlers - HTTP endpoints for post operations
use super::PageQuery;
use crate::app::AppState;
use crate::domain::PostSummary;
use crate::error::ServiceResult;
use crate::middleware::CurrentUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub body: String,
}

/// POST /api/v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<PostRequest>,
) -> ServiceResult<HttpResponse> {
    let post = state
        .posts
        .create_post(user.id(), &req.title, &req.body)
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let post = state.posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostSummary::from(post)))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    req: web::Json<PostRequest>,
) -> ServiceResult<HttpResponse> {
    let post = state
        .posts
        .update_post(user.id(), path.into_inner(), &req.title, &req.body)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    state.posts.delete_post(user.id(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/search/{query}
pub async fn search(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ServiceResult<HttpResponse> {
    let posts = state
        .posts
        .search(user.id(), &path, query.page())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "posts": posts,
        "page": query.page(),
    })))
}
