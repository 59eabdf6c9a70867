/// Follow / unfollow endpoints
use crate::app::AppState;
use crate::error::ServiceResult;
use crate::middleware::CurrentUser;
use crate::services::FollowOutcome;
use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub success: bool,
    pub message: String,
}

impl FollowResponse {
    fn from_outcome(outcome: FollowOutcome, applied_message: String) -> Self {
        match outcome {
            FollowOutcome::Applied => Self {
                success: true,
                message: applied_message,
            },
            FollowOutcome::Rejected(reason) => Self {
                success: false,
                message: reason.message().to_string(),
            },
        }
    }
}

/// POST /api/v1/follow/{username}
pub async fn follow(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let target = state.users.resolve(&path).await?;
    let outcome = state.follows.follow(user.id(), target.id).await?;

    Ok(HttpResponse::Ok().json(FollowResponse::from_outcome(
        outcome,
        format!("You are now following {}.", target.username),
    )))
}

/// POST /api/v1/unfollow/{username}
pub async fn unfollow(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let target = state.users.resolve(&path).await?;
    let outcome = state.follows.unfollow(user.id(), target.id).await?;

    Ok(HttpResponse::Ok().json(FollowResponse::from_outcome(
        outcome,
        format!("You have unfollowed {}.", target.username),
    )))
}
