#![cfg(test)]
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, in_memory_config};

use crate::crypto::Argon2Hasher;

/// Fresh, migrated in-memory database. Every call gets its own store.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&in_memory_config()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Argon2id with minimal costs; production parameters make debug-build tests crawl.
pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(256, 1, 1).expect("valid argon2 params")
}
