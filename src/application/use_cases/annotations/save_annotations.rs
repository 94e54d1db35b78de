use chrono::Utc;
use rand::seq::SliceRandom;

use crate::application::ports::annotation_repository::{AnnotationRepository, SaveRef};
use crate::domain::annotations::span::TextSpan;

const SAVENAME_ADJECTIVES: [&str; 16] = [
    "amber", "bold", "calm", "deft", "eager", "fond", "grand", "hazy", "keen", "lucid", "mellow",
    "noble", "plain", "quiet", "spry", "vivid",
];

const SAVENAME_NOUNS: [&str; 16] = [
    "basis", "corollary", "duality", "fiber", "functor", "kernel", "lattice", "lemma", "manifold",
    "monoid", "orbit", "quotient", "sheaf", "spectrum", "tensor", "variety",
];

/// Generated adjective-noun save names, used when the caller supplies none.
pub fn random_savename() -> String {
    let mut rng = rand::thread_rng();
    let adjective = SAVENAME_ADJECTIVES.choose(&mut rng).unwrap_or(&"plain");
    let noun = SAVENAME_NOUNS.choose(&mut rng).unwrap_or(&"lemma");
    format!("{adjective}-{noun}")
}

pub struct SaveAnnotations<'a, R: AnnotationRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AnnotationRepository + ?Sized> SaveAnnotations<'a, R> {
    /// Persist the full span set as a new timestamped save. An empty
    /// `savename` reuses the name of the latest save (autosave flow) or
    /// generates a fresh one for a first save.
    pub async fn execute(
        &self,
        fileid: &str,
        userid: &str,
        savename: &str,
        autosave: bool,
        spans: &[TextSpan],
    ) -> anyhow::Result<SaveRef> {
        let savename = if savename.is_empty() {
            match self.repo.latest_save(fileid, userid).await? {
                Some(prev) => prev.savename,
                None => random_savename(),
            }
        } else {
            savename.to_string()
        };
        let save = SaveRef {
            fileid: fileid.to_string(),
            userid: userid.to_string(),
            timestamp: Utc::now(),
            savename,
        };
        self.repo.store_save(&save, autosave, spans).await?;
        tracing::info!(
            fileid = %save.fileid,
            savename = %save.savename,
            spans = spans.len(),
            autosave,
            "annotations saved"
        );
        Ok(save)
    }
}
