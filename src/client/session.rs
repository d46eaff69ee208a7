use std::path::PathBuf;

use serde_json::Value;

const ACCESS_TOKEN_KEY: &str = "accessToken";
const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// File-backed persistence for the token pair: two fixed keys in one JSON
/// file, always written and cleared together.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join("tokens.json"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn load(&self) -> (Option<String>, Option<String>) {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return (None, None);
        };
        let Ok(data) = serde_json::from_str::<Value>(&raw) else {
            return (None, None);
        };
        let read = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        (read(ACCESS_TOKEN_KEY), read(REFRESH_TOKEN_KEY))
    }

    pub fn save(&self, access: &str, refresh: Option<&str>) {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let data = serde_json::json!({
            ACCESS_TOKEN_KEY: access,
            REFRESH_TOKEN_KEY: refresh,
        });
        if let Err(e) = std::fs::write(&self.path, data.to_string()) {
            tracing::warn!("Failed to persist tokens: {}", e);
        }
    }

    pub fn clear(&self) {
        std::fs::remove_file(&self.path).ok();
    }
}

/// Identity cached after a successful whoami call.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub email: String,
    pub raw: Value,
}

/// Explicit authentication state: the token pair plus the identity resolved
/// for it. Constructed once at client start and passed into every request;
/// there is no ambient singleton.
#[derive(Debug)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub identity: Option<UserIdentity>,
    store: TokenStore,
}

impl Session {
    /// Restores persisted tokens without validating them remotely.
    pub fn load(store: TokenStore) -> Self {
        let (access_token, refresh_token) = store.load();
        Self {
            access_token,
            refresh_token,
            identity: None,
            store,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Adopts a token pair (e.g. from the magic-link callback) and persists
    /// it.
    pub fn set_tokens(&mut self, access: String, refresh: Option<String>) {
        self.store.save(&access, refresh.as_deref());
        self.access_token = Some(access);
        self.refresh_token = refresh;
        self.identity = None;
    }

    /// Drops both tokens and the cached identity, and removes the persisted
    /// keys. Takes effect immediately: the next request carries no
    /// Authorization credential at all.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.identity = None;
        self.store.clear();
    }
}
