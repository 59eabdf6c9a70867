/// Chat endpoint
use crate::app::AppState;
use crate::error::ServiceResult;
use crate::middleware::CurrentUser;
use crate::services::chat::ChatInput;
use actix_web::{web, HttpResponse};

/// POST /api/v1/chat
pub async fn send_message(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<ChatInput>,
) -> ServiceResult<HttpResponse> {
    let sender = state.users.get(user.id()).await?;

    match state.chat.send(&sender, &req.message).await? {
        Some(message) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": message,
        }))),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}
