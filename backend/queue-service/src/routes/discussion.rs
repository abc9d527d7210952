use crate::{error::AppError, state::AppState};
use actix_middleware::Identity;
use actix_web::{get, web, HttpResponse};

/// GET /discussion
/// Whole tree from the root, as `{"queue": ...}`
#[get("/discussion")]
pub async fn get_discussion(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let discussion = state.discussion.get_whole_discussion().await?;
    Ok(HttpResponse::Ok().json(discussion))
}

/// GET /me
/// The caller as resolved by the identity layer
#[get("/me")]
pub async fn get_me(user: Identity) -> HttpResponse {
    HttpResponse::Ok().json(user)
}
