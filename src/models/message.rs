use serde::{Deserialize, Serialize};

/// A stored inbox message. Create-only: no update or delete path exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub date: String,
}
