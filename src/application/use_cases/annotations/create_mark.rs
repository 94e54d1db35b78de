use uuid::Uuid;

use crate::application::ports::annotation_repository::{AnnotationRepository, SaveRef};
use crate::application::ports::document_store::DocumentStore;
use crate::application::services::autolink::{self, AutoLinkConfig};
use crate::application::use_cases::annotations::save_annotations::SaveAnnotations;
use crate::domain::annotations::span::TextSpan;
use crate::domain::annotations::span_set::SpanSet;

#[derive(thiserror::Error, Debug)]
pub enum CreateMarkError {
    #[error("document {0} not found")]
    DocumentNotFound(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct CreateMark<'a, R, D>
where
    R: AnnotationRepository + ?Sized,
    D: DocumentStore + ?Sized,
{
    pub repo: &'a R,
    pub store: &'a D,
    pub autolink: &'a AutoLinkConfig,
}

#[derive(Debug, Clone)]
pub struct CreateMarkRequest {
    pub fileid: String,
    pub userid: String,
    pub start: usize,
    pub end: usize,
    pub tag: String,
    pub name: String,
    /// When set, reassign this existing mark instead of creating one.
    pub annoid: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateMarkOutcome {
    pub span: TextSpan,
    pub linked_to: Option<Uuid>,
    pub save: SaveRef,
    pub spans: Vec<TextSpan>,
}

impl<'a, R, D> CreateMark<'a, R, D>
where
    R: AnnotationRepository + ?Sized,
    D: DocumentStore + ?Sized,
{
    /// Apply the edit, run the auto-linker on the touched span, and persist
    /// the updated set as one new save. Readers only ever observe the set
    /// before or after the whole sequence.
    ///
    /// `Ok(None)` means the mark was rejected at the creation boundary
    /// (zero-length or invalid bounds); nothing is written and no
    /// auto-linking happens.
    pub async fn execute(
        &self,
        req: &CreateMarkRequest,
    ) -> Result<Option<CreateMarkOutcome>, CreateMarkError> {
        let tex = self
            .store
            .load_tex(&req.fileid)
            .await?
            .ok_or_else(|| CreateMarkError::DocumentNotFound(req.fileid.clone()))?;

        let latest = self.repo.latest_save(&req.fileid, &req.userid).await?;
        let spans = match &latest {
            Some(save) => self.repo.load_save(&req.fileid, save.timestamp).await?,
            None => Vec::new(),
        };

        let mut set = SpanSet::from_spans(spans);
        let created = match req.annoid {
            Some(annoid) => set.update_mark(&tex, annoid, req.start, req.end, &req.tag, &req.name),
            None => set.add_mark(&tex, &req.fileid, req.start, req.end, &req.tag, &req.name),
        };
        let Some(created) = created else {
            return Ok(None);
        };

        let linked_to = autolink::auto_link(&mut set, created.annoid, self.autolink);
        if let Some(target) = linked_to {
            tracing::debug!(source = %created.annoid, %target, tag = %created.tag, "auto-linked");
        }

        let saver = SaveAnnotations { repo: self.repo };
        let save = saver
            .execute(&req.fileid, &req.userid, "", true, set.spans())
            .await?;

        // The auto-linker may have replaced the span value; return the
        // version actually persisted.
        let span = set.get(created.annoid).cloned().unwrap_or(created);
        Ok(Some(CreateMarkOutcome {
            span,
            linked_to,
            save,
            spans: set.into_spans(),
        }))
    }
}
