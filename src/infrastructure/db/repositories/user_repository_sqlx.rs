use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        userid: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"INSERT INTO users (userid, password) VALUES ($1, $2)
               ON CONFLICT (userid) DO NOTHING
               RETURNING userid, password, is_admin"#,
        )
        .bind(userid)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserRow {
            userid: r.get("userid"),
            password_hash: r.try_get("password").ok(),
            is_admin: r.get("is_admin"),
        }))
    }

    async fn find_by_userid(&self, userid: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(r#"SELECT userid, password, is_admin FROM users WHERE userid = $1"#)
            .bind(userid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserRow {
            userid: r.get("userid"),
            password_hash: r.try_get("password").ok(),
            is_admin: r.get("is_admin"),
        }))
    }
}
