use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One save listing entry, with its annotation count.
#[derive(Debug, Clone)]
pub struct SaveRow {
    pub fileid: String,
    pub userid: String,
    pub timestamp: DateTime<Utc>,
    pub savename: String,
    pub autosave: bool,
    pub is_final: bool,
    pub count: i64,
}

#[async_trait]
pub trait SaveRepository: Send + Sync {
    /// Non-deleted saves, newest first, optionally filtered by file, user
    /// and finality.
    async fn list_saves(
        &self,
        fileid: Option<&str>,
        userid: Option<&str>,
        only_final: bool,
    ) -> anyhow::Result<Vec<SaveRow>>;

    async fn mark_final(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: DateTime<Utc>,
        savename: &str,
    ) -> anyhow::Result<bool>;

    /// Rename a save everywhere it is recorded. Returns false when the save
    /// does not exist.
    async fn rename_save(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: DateTime<Utc>,
        savename: &str,
        new_name: &str,
    ) -> anyhow::Result<bool>;
}
