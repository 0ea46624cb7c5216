use super::{DbConnection, DbPool};
use crate::db::error::RepositoryError;
use anyhow::{Result, anyhow};
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;

/// Builds the r2d2 pool shared by every Postgres repository.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    diesel::r2d2::Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| anyhow!("Failed to create database pool: {}", e))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, RepositoryError> {
    pool.get().map_err(Into::into)
}

/// Pool used by the Postgres-backed tests (`DATABASE_URL` must point to a
/// migrated database).
#[cfg(test)]
pub fn test_pool() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    create_pool(&database_url, 2).expect("Failed to create test pool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a running Postgres at DATABASE_URL"]
    fn get_connection_from_test_pool() {
        let pool = test_pool();
        assert!(get_connection(&pool).is_ok());
        assert_eq!(pool.max_size(), 2);
    }
}
