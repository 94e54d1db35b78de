use chrono::{DateTime, Utc};

use crate::application::ports::annotation_repository::{AnnotationRepository, SaveRef};
use crate::application::ports::document_store::DocumentStore;
use crate::application::services::segmenter::{self, Segment};

pub struct GetSegments<'a, R, D>
where
    R: AnnotationRepository + ?Sized,
    D: DocumentStore + ?Sized,
{
    pub repo: &'a R,
    pub store: &'a D,
}

#[derive(Debug, Clone)]
pub struct SegmentsPayload {
    pub save: Option<SaveRef>,
    pub segments: Vec<Segment>,
}

impl<'a, R, D> GetSegments<'a, R, D>
where
    R: AnnotationRepository + ?Sized,
    D: DocumentStore + ?Sized,
{
    /// Segment a document against one of its saves (the latest one when no
    /// timestamp is given). A document without saves still segments, into
    /// untagged text. `None` when the document itself is unknown.
    pub async fn execute(
        &self,
        fileid: &str,
        userid: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<SegmentsPayload>> {
        let Some(tex) = self.store.load_tex(fileid).await? else {
            return Ok(None);
        };
        let save = match timestamp {
            Some(ts) => Some(SaveRef {
                fileid: fileid.to_string(),
                userid: userid.to_string(),
                timestamp: ts,
                savename: String::new(),
            }),
            None => self.repo.latest_save(fileid, userid).await?,
        };
        let spans = match &save {
            Some(s) => self.repo.load_save(fileid, s.timestamp).await?,
            None => Vec::new(),
        };
        Ok(Some(SegmentsPayload {
            save,
            segments: segmenter::segment(&tex, &spans),
        }))
    }
}
