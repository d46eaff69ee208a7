use sqlx::SqlitePool;

pub const KIND_ACCESS: &str = "access";
pub const KIND_REFRESH: &str = "refresh";

pub async fn insert_token(
    pool: &SqlitePool,
    token: &str,
    email: &str,
    kind: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR REPLACE INTO Tokens (Token, Email, Kind) VALUES (?, ?, ?)")
        .bind(token)
        .bind(email)
        .bind(kind)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolves a bearer access token to the email it was minted for.
pub async fn email_for_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT Email FROM Tokens WHERE Token = ? AND Kind = ?")
            .bind(token)
            .bind(KIND_ACCESS)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(email,)| email))
}
