use async_trait::async_trait;
use sqlx::SqlitePool;

use busline_core::repository::{UserRepository, UserRole};
use busline_core::CoreResult;

use crate::storage_err;

/// Credential checks against the fixed two-account table seeded by the
/// migrations. Sessions are the presentation layer's problem.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn verify_login(&self, username: &str, password: &str) -> CoreResult<Option<UserRole>> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(role.map(|r| {
            if r.eq_ignore_ascii_case("admin") {
                UserRole::Admin
            } else {
                UserRole::User
            }
        }))
    }
}
