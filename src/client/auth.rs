use serde_json::{Value, json};

use crate::client::error::ClientError;
use crate::client::session::UserIdentity;
use crate::client::{ApiClient, RequestOptions};

impl ApiClient {
    /// Starts a magic-link sign-in and returns the server's human-readable
    /// confirmation ("check your email"). No token changes hands here; the
    /// callback delivers those.
    pub async fn signin(&self, email: &str) -> Result<String, ClientError> {
        let payload = json!({
            "email": email,
            "redirectUrl": self.config.redirect_url,
            "applicationId": self.config.application_id,
        });

        match self.request("/auth/login", RequestOptions::post(payload)).await {
            Ok(body) => {
                let data = body.into_json()?;
                Ok(data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Check your email for a magic link to sign in!")
                    .to_string())
            }
            Err(ClientError::Request { message, .. }) => Err(ClientError::Auth(message)),
            Err(e) => Err(e),
        }
    }

    /// Resolves and caches the caller identity, once per session. On failure
    /// the session is cleared — the caller must re-authenticate; the call is
    /// never retried.
    pub async fn resolve_identity(&mut self) -> Result<UserIdentity, ClientError> {
        if let Some(identity) = &self.session.identity {
            return Ok(identity.clone());
        }

        match self.request("/identity/whoami", RequestOptions::default()).await {
            Ok(body) => {
                let raw = body.into_json()?;
                let email = raw
                    .pointer("/metadata/email")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ClientError::Auth("identity response has no email".into()))?;
                let identity = UserIdentity { email, raw };
                self.session.identity = Some(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                self.session.clear();
                Err(ClientError::Auth(format!("re-authentication required: {}", e)))
            }
        }
    }

    pub fn user_email(&self) -> Option<&str> {
        self.session
            .identity
            .as_ref()
            .map(|identity| identity.email.as_str())
    }

    /// Clears the session and its persisted tokens together. Subsequent
    /// requests go out with no Authorization credential.
    pub fn sign_out(&mut self) {
        self.session.clear();
    }
}
