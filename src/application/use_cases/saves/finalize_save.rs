use chrono::{DateTime, Utc};

use crate::application::ports::save_repository::SaveRepository;

pub struct FinalizeSave<'a, R: SaveRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SaveRepository + ?Sized> FinalizeSave<'a, R> {
    /// Returns false when no such save exists.
    pub async fn execute(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: DateTime<Utc>,
        savename: &str,
    ) -> anyhow::Result<bool> {
        self.repo
            .mark_final(fileid, userid, timestamp, savename)
            .await
    }
}
