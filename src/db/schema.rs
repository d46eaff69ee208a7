use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS Store (
            TableName TEXT NOT NULL,
            Key TEXT NOT NULL,
            DataJson TEXT NOT NULL,
            DateCreated TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (TableName, Key)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_store_table ON Store(TableName)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS Tokens (
            Token TEXT PRIMARY KEY,
            Email TEXT NOT NULL,
            Kind TEXT NOT NULL,
            DateCreated TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
