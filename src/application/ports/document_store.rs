use async_trait::async_trait;

/// Listing entry for one stored LaTeX source.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub name: String,
    /// arXiv identifier parsed from the file name, empty when absent.
    pub arxiv_id: String,
    /// File name without the arXiv prefix and `.tex` suffix.
    pub stem: String,
    /// Human-readable modification time, e.g. `'24 Mar 03 @12:30`.
    pub modified: String,
    /// Size in KiB with one decimal.
    pub size: String,
}

/// How a PDF for a document is delivered.
#[derive(Debug, Clone)]
pub enum PdfPayload {
    /// Remote PDF (arXiv documents resolve to arxiv.org).
    Url(String),
    /// Locally stored PDF, base64-encoded.
    Base64(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self) -> anyhow::Result<Vec<DocumentInfo>>;
    async fn load_tex(&self, fileid: &str) -> anyhow::Result<Option<String>>;
    async fn load_pdf(&self, fileid: &str) -> anyhow::Result<Option<PdfPayload>>;
}
