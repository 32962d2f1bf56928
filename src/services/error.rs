use thiserror::Error;

/// Errors a data source can report
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read seed file: {0}")]
    SeedFile(#[from] std::io::Error),

    #[error("Invalid seed data: {0}")]
    SeedData(#[from] serde_json::Error),
}

/// Errors surfaced by the matching and leaderboard services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to fetch data: {0}")]
    Source(#[from] SourceError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
