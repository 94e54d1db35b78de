use chrono::{DateTime, Utc};

use crate::application::ports::annotation_repository::AnnotationRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "text" | "txt" => Self::Text,
            _ => Self::Json,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

pub struct ExportSave<'a, R: AnnotationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AnnotationRepository + ?Sized> ExportSave<'a, R> {
    /// Render one save as a downloadable document.
    pub async fn execute(
        &self,
        fileid: &str,
        timestamp: DateTime<Utc>,
        format: ExportFormat,
    ) -> anyhow::Result<String> {
        let spans = self.repo.load_save(fileid, timestamp).await?;
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&spans)?),
            ExportFormat::Text => {
                let mut sorted = spans;
                sorted.sort_by_key(|s| (s.start, s.end));
                let mut out = String::new();
                for span in &sorted {
                    let flat = span.text.replace('\n', " ");
                    out.push_str(&format!(
                        "{}\t{}\t{}\t{}\n",
                        span.start, span.end, span.tag, flat
                    ));
                }
                Ok(out)
            }
        }
    }
}
