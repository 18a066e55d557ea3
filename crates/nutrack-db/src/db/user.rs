use async_trait::async_trait;
use nutrack_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{IdentityResolver, UNKNOWN_USER};

/// Resolves submitter ids against the `users` table
#[derive(Clone)]
pub struct UserDirectory {
    pool: PgPool,
}

impl UserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityResolver for UserDirectory {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %user_id))]
    async fn resolve_display_name(&self, user_id: Uuid) -> Result<String, AppError> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT display_name FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(name.unwrap_or_else(|| {
            tracing::debug!(user_id = %user_id, "Submitter not found");
            UNKNOWN_USER.to_string()
        }))
    }
}
