use argon2::{Argon2, password_hash::PasswordHash, password_hash::PasswordVerifier};

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub userid: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// `None` on unknown user or wrong password.
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<UserRow>> {
        let Some(user) = self.repo.find_by_userid(&req.userid).await? else {
            return Ok(None);
        };
        let Some(hash) = user.password_hash.as_deref() else {
            return Ok(None);
        };
        let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(None);
        }
        Ok(Some(user))
    }
}
