use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct GetMe<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetMe<'a, R> {
    pub async fn execute(&self, userid: &str) -> anyhow::Result<Option<UserRow>> {
        self.repo.find_by_userid(userid).await
    }
}
