use sqlx::SqlitePool;
use uuid::Uuid;

/// Table name the message handlers store records under.
pub const MESSAGES_TABLE: &str = "messages";

pub fn new_guid() -> String {
    Uuid::new_v4().simple().to_string()
}

// The store adapter: an opaque key/value table holding JSON values.
// No filtering happens here; callers see every entry of a table.

pub async fn get_table<T: serde::de::DeserializeOwned>(
    pool: &SqlitePool,
    table: &str,
) -> Result<Vec<(String, T)>, sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT Key, DataJson FROM Store WHERE TableName = ?")
            .bind(table)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(key, json)| serde_json::from_str(&json).ok().map(|value| (key, value)))
        .collect())
}

pub async fn get<T: serde::de::DeserializeOwned>(
    pool: &SqlitePool,
    table: &str,
    key: &str,
) -> Result<Option<T>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT DataJson FROM Store WHERE TableName = ? AND Key = ?")
            .bind(table)
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(row.and_then(|(json,)| serde_json::from_str(&json).ok()))
}

pub async fn write<T: serde::Serialize>(
    pool: &SqlitePool,
    table: &str,
    key: &str,
    model: &T,
) -> Result<(), sqlx::Error> {
    let json = serde_json::to_string(model).unwrap_or_default();
    sqlx::query("INSERT OR REPLACE INTO Store (TableName, Key, DataJson) VALUES (?, ?, ?)")
        .bind(table)
        .bind(key)
        .bind(&json)
        .execute(pool)
        .await?;
    Ok(())
}
