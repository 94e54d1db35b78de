use crate::application::ports::annotation_repository::AnnotationRepository;
use crate::domain::annotations::span::TextSpan;

pub struct LoadAllAnnotations<'a, R: AnnotationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AnnotationRepository + ?Sized> LoadAllAnnotations<'a, R> {
    /// The newest save of every document except `fileid`, pooled for
    /// cross-document linking.
    pub async fn execute(&self, fileid: &str) -> anyhow::Result<Vec<TextSpan>> {
        self.repo.load_all_other(fileid).await
    }
}
