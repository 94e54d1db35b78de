use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::annotations::span::TextSpan;

/// Identity of one save of one document's annotations.
#[derive(Debug, Clone)]
pub struct SaveRef {
    pub fileid: String,
    pub userid: String,
    pub timestamp: DateTime<Utc>,
    pub savename: String,
}

#[async_trait]
pub trait AnnotationRepository: Send + Sync {
    /// Most recent non-deleted save for (fileid, userid), if any.
    async fn latest_save(&self, fileid: &str, userid: &str) -> anyhow::Result<Option<SaveRef>>;

    /// All spans of the save identified by (fileid, timestamp), links attached.
    async fn load_save(
        &self,
        fileid: &str,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TextSpan>>;

    /// The newest save of every document other than `fileid`, pooled into one
    /// span list (used for cross-document linking).
    async fn load_all_other(&self, fileid: &str) -> anyhow::Result<Vec<TextSpan>>;

    /// Persist a full span set as a new save: the save row, every annotation
    /// and every link, in one transaction.
    async fn store_save(
        &self,
        save: &SaveRef,
        autosave: bool,
        spans: &[TextSpan],
    ) -> anyhow::Result<()>;
}
