//! Axum routes for the message resource

use crate::error::ApiResult;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use message_api_handler::{MessageHandler, MessageResponse, ResponseBody, Status, MESSAGE_ROUTE};
use message_api_types::{MessageDraft, MessageId};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Build the application router around `handler`
pub fn router(handler: MessageHandler) -> Router {
    Router::new()
        .route(MESSAGE_ROUTE, get(list_messages).post(create_message))
        .route(
            &format!("{}/{{id}}", MESSAGE_ROUTE),
            get(get_message).put(update_message).delete(delete_message),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// Handler response on its way out
pub struct HttpReply(MessageResponse);

fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Ok => StatusCode::OK,
        Status::Created => StatusCode::CREATED,
        Status::NoContent => StatusCode::NO_CONTENT,
        Status::BadRequest => StatusCode::BAD_REQUEST,
        Status::NotFound => StatusCode::NOT_FOUND,
        Status::Conflict => StatusCode::CONFLICT,
    }
}

impl IntoResponse for HttpReply {
    fn into_response(self) -> Response {
        let MessageResponse {
            status,
            body,
            location,
        } = self.0;

        let mut response = match body {
            Some(ResponseBody::Message(message)) => Json(message).into_response(),
            Some(ResponseBody::Messages(messages)) => Json(messages).into_response(),
            None => ().into_response(),
        };
        *response.status_mut() = status_code(status);

        if let Some(location) = location.and_then(|l| HeaderValue::from_str(&l).ok()) {
            response.headers_mut().insert(header::LOCATION, location);
        }
        response
    }
}

/// Unreadable bodies are answered like any other validation failure
fn bad_body(rejection: JsonRejection) -> HttpReply {
    debug!("Rejecting request body: {}", rejection.body_text());
    HttpReply(MessageResponse::empty(Status::BadRequest))
}

/// GET /message
async fn list_messages(State(handler): State<MessageHandler>) -> ApiResult<HttpReply> {
    Ok(HttpReply(handler.list_all().await?))
}

/// GET /message/{id}
async fn get_message(
    State(handler): State<MessageHandler>,
    Path(id): Path<MessageId>,
) -> ApiResult<HttpReply> {
    Ok(HttpReply(handler.get_by_id(id).await?))
}

/// POST /message
async fn create_message(
    State(handler): State<MessageHandler>,
    body: Result<Json<MessageDraft>, JsonRejection>,
) -> ApiResult<HttpReply> {
    match body {
        Ok(Json(draft)) => Ok(HttpReply(handler.create(draft).await?)),
        Err(rejection) => Ok(bad_body(rejection)),
    }
}

/// PUT /message/{id}
async fn update_message(
    State(handler): State<MessageHandler>,
    Path(id): Path<MessageId>,
    body: Result<Json<MessageDraft>, JsonRejection>,
) -> ApiResult<HttpReply> {
    match body {
        Ok(Json(draft)) => Ok(HttpReply(handler.update(id, draft).await?)),
        Err(rejection) => Ok(bad_body(rejection)),
    }
}

/// DELETE /message/{id}
async fn delete_message(
    State(handler): State<MessageHandler>,
    Path(id): Path<MessageId>,
) -> ApiResult<HttpReply> {
    Ok(HttpReply(handler.delete(id).await?))
}
