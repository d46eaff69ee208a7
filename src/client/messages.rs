use serde_json::{Value, json};

use crate::client::config::Function;
use crate::client::error::ClientError;
use crate::client::storage::AttachmentUpload;
use crate::client::ApiClient;
use crate::models::message::Message;

/// A message being composed: the three required fields, an optional sender
/// label, and attachments still to be uploaded.
pub struct ComposeMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub from: Option<String>,
    pub attachments: Vec<AttachmentUpload>,
}

impl ApiClient {
    pub async fn list_messages(&self, user_email: &str) -> Result<Vec<Message>, ClientError> {
        let body = self
            .run_function(
                Function::ListMessages,
                Some(json!({ "userEmail": user_email })),
            )
            .await?
            .into_json()?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn get_message(&self, user_email: &str, id: &str) -> Result<Message, ClientError> {
        let body = self
            .run_function(
                Function::GetMessage,
                Some(json!({ "userEmail": user_email, "id": id })),
            )
            .await?
            .into_json()?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// The compose path: upload the attachment batch first, then one create
    /// call with the finalized key list. Keys of failed uploads are already
    /// dropped by then — a partial batch still produces a message. Returns
    /// the new message id.
    pub async fn send_message(&self, compose: ComposeMessage) -> Result<String, ClientError> {
        for (field, value) in [
            ("to", &compose.to),
            ("subject", &compose.subject),
            ("body", &compose.body),
        ] {
            if value.is_empty() {
                return Err(ClientError::Validation(field));
            }
        }

        let images = self
            .upload_attachments(&self.config.bucket, compose.attachments)
            .await;

        let from = compose
            .from
            .or_else(|| self.user_email().map(str::to_string));

        let body = self
            .run_function(
                Function::SendMessage,
                Some(json!({
                    "from": from,
                    "to": compose.to,
                    "subject": compose.subject,
                    "body": compose.body,
                    "images": images,
                })),
            )
            .await?
            .into_json()?;

        body.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Decode("create response has no id".into()))
    }
}
