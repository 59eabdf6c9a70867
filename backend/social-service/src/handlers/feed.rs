/// Home feed endpoint
use crate::app::AppState;
use crate::domain::FeedMode;
use crate::error::ServiceResult;
use crate::middleware::CurrentUser;
use crate::services::DEFAULT_FEED_PAGE_SIZE;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub feed: FeedMode,
    pub page: Option<u32>,
}

/// GET /api/v1/feed?feed=all|following&page=
pub async fn get_feed(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<FeedQuery>,
) -> ServiceResult<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let posts = state
        .feed
        .feed(user.id(), query.feed, page, DEFAULT_FEED_PAGE_SIZE)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "feed": query.feed,
        "page": page,
        "posts": posts,
    })))
}
