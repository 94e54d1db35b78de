use crate::application::ports::document_store::{DocumentStore, PdfPayload};

pub struct GetDocument<'a, D: DocumentStore + ?Sized> {
    pub store: &'a D,
}

#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub fileid: String,
    pub tex: String,
    pub pdf: Option<PdfPayload>,
}

impl<'a, D: DocumentStore + ?Sized> GetDocument<'a, D> {
    /// `None` when no document with this fileid is stored. `with_pdf` skips
    /// the PDF lookup for tex-only callers.
    pub async fn execute(
        &self,
        fileid: &str,
        with_pdf: bool,
    ) -> anyhow::Result<Option<DocumentPayload>> {
        let Some(tex) = self.store.load_tex(fileid).await? else {
            return Ok(None);
        };
        let pdf = if with_pdf {
            self.store.load_pdf(fileid).await?
        } else {
            None
        };
        Ok(Some(DocumentPayload {
            fileid: fileid.to_string(),
            tex,
            pdf,
        }))
    }
}
