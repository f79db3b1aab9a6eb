use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token      TEXT PRIMARY KEY,
        user_id    UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id                 UUID PRIMARY KEY,
        user_id            UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        full_name          TEXT NOT NULL,
        role               TEXT NOT NULL,
        email              TEXT NOT NULL DEFAULT '',
        phone              TEXT NOT NULL DEFAULT '',
        address            TEXT NOT NULL DEFAULT '',
        degree             TEXT NOT NULL DEFAULT '',
        school             TEXT NOT NULL DEFAULT '',
        edu_years          TEXT NOT NULL DEFAULT '',
        education          JSONB NOT NULL DEFAULT '[]',
        experience         JSONB NOT NULL DEFAULT '[]',
        projects           JSONB NOT NULL DEFAULT '[]',
        skills             TEXT NOT NULL DEFAULT '',
        summary            TEXT NOT NULL DEFAULT '',
        profile_photo_data TEXT,
        template_id        TEXT NOT NULL DEFAULT '1',
        created_at         TIMESTAMPTZ NOT NULL,
        saved_at           TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS resumes_user_created_idx ON resumes (user_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS sessions_user_idx ON sessions (user_id)",
];

/// Applies the schema. Every statement is idempotent.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply database schema")?;
    }
    info!("Database schema ready");
    Ok(())
}
