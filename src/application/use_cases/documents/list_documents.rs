use crate::application::ports::document_store::{DocumentInfo, DocumentStore};

pub struct ListDocuments<'a, D: DocumentStore + ?Sized> {
    pub store: &'a D,
}

impl<'a, D: DocumentStore + ?Sized> ListDocuments<'a, D> {
    pub async fn execute(&self) -> anyhow::Result<Vec<DocumentInfo>> {
        self.store.list_documents().await
    }
}
