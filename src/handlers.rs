use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::db::store;
use crate::models::message::Message;
use crate::services::helpers;

/// Structured status/body pair returned by every message handler.
/// Handlers never raise past their own boundary; failures are encoded here.
#[derive(Debug)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl HandlerResponse {
    fn text(status: StatusCode, text: &str) -> Self {
        Self {
            status,
            body: Value::String(text.to_string()),
        }
    }

    fn json(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        match self.body {
            Value::String(text) => (self.status, text).into_response(),
            body => (self.status, Json(body)).into_response(),
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesRequest {
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
}

/// Returns every stored message addressed to the asserted recipient.
/// The store performs no filtering of its own; ownership is enforced here
/// and nowhere else.
pub async fn list_messages(pool: &SqlitePool, req: ListMessagesRequest) -> HandlerResponse {
    let Some(user_email) = required(req.user_email) else {
        return HandlerResponse::text(
            StatusCode::BAD_REQUEST,
            "User email not provided in request",
        );
    };

    match store::get_table::<Message>(pool, store::MESSAGES_TABLE).await {
        Ok(entries) => {
            let messages: Vec<Message> = entries
                .into_iter()
                .map(|(_key, message)| message)
                .filter(|message| message.to == user_email)
                .collect();
            HandlerResponse::json(StatusCode::OK, json!(messages))
        }
        Err(e) => {
            tracing::error!("Failed to read message table: {}", e);
            HandlerResponse::text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read messages")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GetMessageRequest {
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
    pub id: Option<String>,
}

/// Fetches one message by id, but only for its addressed recipient.
/// A foreign caller gets 403, not 404: existence of an id is confirmed even
/// to a non-owner.
pub async fn get_message(pool: &SqlitePool, req: GetMessageRequest) -> HandlerResponse {
    let Some(user_email) = required(req.user_email) else {
        return HandlerResponse::text(
            StatusCode::BAD_REQUEST,
            "User email not provided in request",
        );
    };
    let Some(id) = required(req.id) else {
        return HandlerResponse::text(StatusCode::BAD_REQUEST, "Missing 'id' property in body!");
    };

    match store::get::<Message>(pool, store::MESSAGES_TABLE, &id).await {
        Ok(Some(message)) if message.to != user_email => HandlerResponse::text(
            StatusCode::FORBIDDEN,
            "You do not have permission to view this message",
        ),
        Ok(Some(message)) => HandlerResponse::json(StatusCode::OK, json!(message)),
        Ok(None) => HandlerResponse::text(StatusCode::NOT_FOUND, "Message not found"),
        Err(e) => {
            tracing::error!("Failed to read message {}: {}", id, e);
            HandlerResponse::text(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read message")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateMessageRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Creates a message under a fresh id with a server-assigned timestamp.
/// One single upsert; not idempotent — a retry after a transient failure
/// produces a second message under a new id.
pub async fn create_message(pool: &SqlitePool, req: CreateMessageRequest) -> HandlerResponse {
    let Some(to) = required(req.to) else {
        return HandlerResponse::text(StatusCode::BAD_REQUEST, "Missing 'to' property in body!");
    };
    let Some(subject) = required(req.subject) else {
        return HandlerResponse::text(
            StatusCode::BAD_REQUEST,
            "Missing 'subject' property in body!",
        );
    };
    let Some(body) = required(req.body) else {
        return HandlerResponse::text(StatusCode::BAD_REQUEST, "Missing 'body' property in body!");
    };

    let message = Message {
        id: store::new_guid(),
        from: required(req.from).unwrap_or_else(|| "Anonymous".to_string()),
        to,
        subject,
        body,
        images: req.images.unwrap_or_default(),
        date: helpers::now_iso(),
    };

    match store::write(pool, store::MESSAGES_TABLE, &message.id, &message).await {
        Ok(()) => HandlerResponse::json(
            StatusCode::OK,
            json!({ "message": "Message posted", "id": message.id }),
        ),
        Err(e) => {
            tracing::error!("Failed to post message: {}", e);
            HandlerResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to post message", "message": e.to_string() }),
            )
        }
    }
}
