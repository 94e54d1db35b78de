use chrono::{DateTime, Utc};

use crate::application::ports::save_repository::SaveRepository;

pub struct RenameSave<'a, R: SaveRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SaveRepository + ?Sized> RenameSave<'a, R> {
    /// Returns false when no such save exists.
    pub async fn execute(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: DateTime<Utc>,
        savename: &str,
        new_name: &str,
    ) -> anyhow::Result<bool> {
        self.repo
            .rename_save(fileid, userid, timestamp, savename, new_name)
            .await
    }
}
