use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub userid: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    /// `None` when the userid is already taken.
    pub async fn execute(&self, req: &RegisterRequest) -> anyhow::Result<Option<UserRow>> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        self.repo.create_user(&req.userid, &hash).await
    }
}
