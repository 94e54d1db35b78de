use chrono::{DateTime, Utc};

use crate::application::ports::annotation_repository::{AnnotationRepository, SaveRef};
use crate::domain::annotations::span::TextSpan;

pub struct LoadAnnotations<'a, R: AnnotationRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoadedSave {
    pub save: SaveRef,
    pub spans: Vec<TextSpan>,
}

impl<'a, R: AnnotationRepository + ?Sized> LoadAnnotations<'a, R> {
    /// Load a specific save, or the most recent one when `timestamp` is
    /// absent. `None` when the user has no saves for this document.
    pub async fn execute(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<LoadedSave>> {
        let save = match timestamp {
            Some(ts) => Some(SaveRef {
                fileid: fileid.to_string(),
                userid: userid.to_string(),
                timestamp: ts,
                savename: String::new(),
            }),
            None => self.repo.latest_save(fileid, userid).await?,
        };
        let Some(save) = save else {
            return Ok(None);
        };
        let spans = self.repo.load_save(fileid, save.timestamp).await?;
        Ok(Some(LoadedSave { save, spans }))
    }
}
