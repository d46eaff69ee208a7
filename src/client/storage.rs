use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::{Method, multipart};

use crate::client::error::ClientError;
use crate::client::{ApiClient, Payload, RequestOptions, ResponseBody};

/// Namespace prefix for message attachment keys.
pub const ATTACHMENT_NAMESPACE: &str = "messages";

/// One binary attachment queued for upload.
pub struct AttachmentUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Key for a fresh attachment: `messages/<epoch-ms>-<random-suffix>-<name>`.
/// Computed before the owning message exists; uploads are not transactional
/// with message creation.
pub fn attachment_key(name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{}/{}-{}-{}", ATTACHMENT_NAMESPACE, timestamp, suffix, name)
}

// Minimal component escape for object keys embedded in a URL path segment.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '/' => out.push_str("%2F"),
            '%' => out.push_str("%25"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

impl ApiClient {
    /// Uploads one object under an explicit key, multipart-encoded, through
    /// the generic request primitive.
    pub async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ResponseBody, ClientError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text("key", key.to_string())
            .part("file", part);

        let options = RequestOptions {
            method: Method::PUT,
            payload: Some(Payload::Multipart(form)),
            ..RequestOptions::default()
        };
        self.request(&format!("/storage/buckets/{}/objects", bucket), options)
            .await
    }

    /// Uploads a batch sequentially, one at a time. A failed upload is logged
    /// and dropped; the rest of the batch still runs, and the returned keys
    /// keep the relative order of the uploads that succeeded.
    pub async fn upload_attachments(
        &self,
        bucket: &str,
        attachments: Vec<AttachmentUpload>,
    ) -> Vec<String> {
        let mut keys = Vec::new();
        for attachment in attachments {
            let key = attachment_key(&attachment.name);
            match self
                .upload_object(bucket, &key, &attachment.name, attachment.bytes)
                .await
            {
                Ok(_) => keys.push(key),
                Err(e) => {
                    tracing::warn!("Failed to upload attachment {}: {}", attachment.name, e);
                }
            }
        }
        keys
    }

    /// Deterministic retrieval URL for a stored object.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/buckets/{}/objects/{}",
            self.config.base_url,
            bucket,
            encode_key(key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_keys_are_namespaced_and_unique() {
        let a = attachment_key("cat.png");
        let b = attachment_key("cat.png");

        assert!(a.starts_with("messages/"));
        assert!(a.ends_with("-cat.png"));
        assert_ne!(a, b);

        // <timestamp>-<suffix>-<original name>
        let rest = a.strip_prefix("messages/").unwrap();
        let mut parts = rest.splitn(3, '-');
        assert!(parts.next().unwrap().parse::<i64>().is_ok());
        assert_eq!(parts.next().unwrap().len(), 7);
        assert_eq!(parts.next().unwrap(), "cat.png");
    }

    #[test]
    fn key_encoding_escapes_separators() {
        assert_eq!(
            encode_key("messages/1-a b%c.png"),
            "messages%2F1-a%20b%25c.png"
        );
    }
}
