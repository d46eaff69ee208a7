use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, multipart};
use serde_json::Value;

pub mod auth;
pub mod config;
pub mod error;
pub mod messages;
pub mod session;
pub mod storage;

use config::{ClientConfig, Function};
use error::ClientError;
use session::Session;

/// Body attached to an outgoing request. JSON covers handler invocation;
/// multipart covers attachment upload. Both go through the same primitive.
pub enum Payload {
    Json(Value),
    Multipart(multipart::Form),
}

pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub payload: Option<Payload>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            payload: None,
        }
    }
}

impl RequestOptions {
    pub fn post(payload: Value) -> Self {
        Self {
            method: Method::POST,
            payload: Some(Payload::Json(payload)),
            ..Self::default()
        }
    }
}

/// Decoded response, tagged by the content type the server declared.
#[derive(Debug)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// JSON either way: a textual body is parsed as a fallback, since some
    /// backends declare plain text for JSON payloads.
    pub fn into_json(self) -> Result<Value, ClientError> {
        match self {
            ResponseBody::Json(value) => Ok(value),
            ResponseBody::Text(text) => {
                serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
            }
        }
    }
}

/// The client-resident session/request layer. Owns the auth token via its
/// `Session` and funnels every backend call through [`ApiClient::request`].
pub struct ApiClient {
    pub config: ClientConfig,
    pub session: Session,
    http: reqwest::Client,
}

impl ApiClient {
    /// Fails fast on a bad function-id mapping instead of at call time.
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, ClientError> {
        config.functions.validate()?;
        Ok(Self {
            config,
            session,
            http: reqwest::Client::new(),
        })
    }

    /// The single low-level request primitive.
    ///
    /// Caller headers are merged, but the session is the sole source of truth
    /// for `Authorization`: a caller-supplied credential is discarded, and
    /// when the session holds no token the header is omitted entirely. A
    /// non-success response fails with the response text (or the canonical
    /// status reason); nothing is retried.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut headers = HeaderMap::new();
        for (name, value) in options.headers.iter() {
            if name != AUTHORIZATION {
                headers.insert(name.clone(), value.clone());
            }
        }
        if let Some(token) = self.session.access_token.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Config("access token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.http.request(options.method, &url).headers(headers);
        builder = match options.payload {
            Some(Payload::Json(body)) => builder.json(&body),
            Some(Payload::Multipart(form)) => builder.multipart(form),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let message = if message.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                message
            };
            if status == StatusCode::FORBIDDEN {
                return Err(ClientError::Authorization);
            }
            return Err(ClientError::Request {
                status: status.as_u16(),
                message,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            Ok(ResponseBody::Json(response.json().await?))
        } else {
            Ok(ResponseBody::Text(response.text().await?))
        }
    }

    /// Invokes a logical backend operation: a payload means a write-style
    /// POST, no payload a read-style GET.
    pub async fn run_function(
        &self,
        function: Function,
        payload: Option<Value>,
    ) -> Result<ResponseBody, ClientError> {
        let id = self.config.functions.resolve(function);
        let path = format!("/functions/run/{}", id);
        let options = match payload {
            Some(body) => RequestOptions::post(body),
            None => RequestOptions::default(),
        };
        self.request(&path, options).await
    }
}
