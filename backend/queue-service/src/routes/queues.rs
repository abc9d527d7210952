use crate::{
    error::AppError,
    models::{EntryId, EntryKind, QueueId},
    state::AppState,
};
use actix_middleware::Identity;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateChildRequest {
    pub topic: String,
    #[serde(rename = "moveViewers", alias = "move-users", default)]
    pub move_viewers: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeTopicRequest {
    #[serde(rename = "newTopic", alias = "new-topic")]
    pub new_topic: String,
}

async fn add_entry(
    state: &AppState,
    queue_id: QueueId,
    kind: EntryKind,
    user: &Identity,
) -> Result<HttpResponse, AppError> {
    let entry = state.discussion.add_entry(queue_id, kind, user).await?;
    Ok(HttpResponse::Ok().json(entry))
}

async fn remove_entry(
    state: &AppState,
    (queue_id, entry_id): (QueueId, EntryId),
    kind: EntryKind,
    user: &Identity,
) -> Result<HttpResponse, AppError> {
    state
        .discussion
        .remove_entry(queue_id, kind, entry_id, user)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// POST /queue/{queue}/point
#[post("/queue/{queue}/point")]
pub async fn add_point(
    state: web::Data<AppState>,
    queue_id: web::Path<QueueId>,
    user: Identity,
) -> Result<HttpResponse, AppError> {
    add_entry(&state, queue_id.into_inner(), EntryKind::Point, &user).await
}

/// POST /queue/{queue}/clarifier
#[post("/queue/{queue}/clarifier")]
pub async fn add_clarifier(
    state: web::Data<AppState>,
    queue_id: web::Path<QueueId>,
    user: Identity,
) -> Result<HttpResponse, AppError> {
    add_entry(&state, queue_id.into_inner(), EntryKind::Clarifier, &user).await
}

/// DELETE /queue/{queue}/point/{id}
#[delete("/queue/{queue}/point/{id}")]
pub async fn delete_point(
    state: web::Data<AppState>,
    path: web::Path<(QueueId, EntryId)>,
    user: Identity,
) -> Result<HttpResponse, AppError> {
    remove_entry(&state, path.into_inner(), EntryKind::Point, &user).await
}

/// DELETE /queue/{queue}/clarifier/{id}
#[delete("/queue/{queue}/clarifier/{id}")]
pub async fn delete_clarifier(
    state: web::Data<AppState>,
    path: web::Path<(QueueId, EntryId)>,
    user: Identity,
) -> Result<HttpResponse, AppError> {
    remove_entry(&state, path.into_inner(), EntryKind::Clarifier, &user).await
}

/// PATCH /queue/{queue}
#[patch("/queue/{queue}")]
pub async fn change_topic(
    state: web::Data<AppState>,
    queue_id: web::Path<QueueId>,
    user: Identity,
    body: web::Json<ChangeTopicRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .discussion
        .change_topic(queue_id.into_inner(), body.into_inner().new_topic, &user)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// GET /queue/{queue}
#[get("/queue/{queue}")]
pub async fn get_queue(
    state: web::Data<AppState>,
    queue_id: web::Path<QueueId>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.discussion.get_subtree(queue_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// POST /queue/{queue}/new-child
#[post("/queue/{queue}/new-child")]
pub async fn new_child_queue(
    state: web::Data<AppState>,
    parent_id: web::Path<QueueId>,
    user: Identity,
    body: web::Json<CreateChildRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateChildRequest {
        topic,
        move_viewers,
    } = body.into_inner();

    let snapshot = state
        .discussion
        .create_child_queue(parent_id.into_inner(), topic, move_viewers, &user)
        .await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// GET /queue/{queue}/path
#[get("/queue/{queue}/path")]
pub async fn get_queue_path(
    state: web::Data<AppState>,
    queue_id: web::Path<QueueId>,
) -> Result<HttpResponse, AppError> {
    let path = state.discussion.get_path(queue_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies_accept_client_spellings() {
        let body: CreateChildRequest =
            serde_json::from_str(r#"{"topic": "Side topic", "move-users": true}"#).unwrap();
        assert!(body.move_viewers);

        let body: CreateChildRequest = serde_json::from_str(r#"{"topic": "Side topic"}"#).unwrap();
        assert!(!body.move_viewers);

        let body: ChangeTopicRequest = serde_json::from_str(r#"{"new-topic": "Budget"}"#).unwrap();
        assert_eq!(body.new_topic, "Budget");

        let body: ChangeTopicRequest = serde_json::from_str(r#"{"newTopic": "Budget"}"#).unwrap();
        assert_eq!(body.new_topic, "Budget");
    }
}
