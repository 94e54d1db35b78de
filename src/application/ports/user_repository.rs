use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub userid: String,
    pub password_hash: Option<String>,
    pub is_admin: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; `None` when the userid is already taken.
    async fn create_user(&self, userid: &str, password_hash: &str)
    -> anyhow::Result<Option<UserRow>>;
    async fn find_by_userid(&self, userid: &str) -> anyhow::Result<Option<UserRow>>;
}
