/// Profile endpoints
use super::PageQuery;
use crate::app::AppState;
use crate::error::ServiceResult;
use crate::middleware::CurrentUser;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

/// GET /api/v1/profile/{username}
pub async fn show(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let profile = state.users.profile(user.id(), &path).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/profile/{username}/followers
pub async fn followers(
    state: web::Data<AppState>,
    _user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ServiceResult<HttpResponse> {
    let profile_user = state.users.resolve(&path).await?;
    let users = state.follows.followers(profile_user.id, query.page()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": users,
        "page": query.page(),
    })))
}

/// GET /api/v1/profile/{username}/following
pub async fn following(
    state: web::Data<AppState>,
    _user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ServiceResult<HttpResponse> {
    let profile_user = state.users.resolve(&path).await?;
    let users = state.follows.following(profile_user.id, query.page()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": users,
        "page": query.page(),
    })))
}

/// GET /api/v1/profile/{username}/posts
pub async fn posts(
    state: web::Data<AppState>,
    _user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ServiceResult<HttpResponse> {
    let profile_user = state.users.resolve(&path).await?;
    let posts = state.posts.user_posts(profile_user.id, query.page()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "posts": posts,
        "page": query.page(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar: String,
}

/// PUT /api/v1/avatar
pub async fn update_avatar(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<AvatarRequest>,
) -> ServiceResult<HttpResponse> {
    let path = state.users.update_avatar(user.id(), &req.avatar).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "avatar": path })))
}
