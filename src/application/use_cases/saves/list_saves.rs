use crate::application::ports::save_repository::{SaveRepository, SaveRow};

pub struct ListSaves<'a, R: SaveRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SaveRepository + ?Sized> ListSaves<'a, R> {
    pub async fn execute(
        &self,
        fileid: Option<&str>,
        userid: Option<&str>,
        only_final: bool,
    ) -> anyhow::Result<Vec<SaveRow>> {
        self.repo.list_saves(fileid, userid, only_final).await
    }
}
