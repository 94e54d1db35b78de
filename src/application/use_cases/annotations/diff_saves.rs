use chrono::{DateTime, Utc};

use crate::application::ports::annotation_repository::AnnotationRepository;
use crate::application::services::scoring;
use crate::domain::annotations::span::TextSpan;

pub struct DiffSaves<'a, R: AnnotationRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct SaveDiff {
    pub timestamp: DateTime<Utc>,
    pub lines: Vec<String>,
}

fn filter_tags(spans: Vec<TextSpan>, tags: &[String]) -> Vec<TextSpan> {
    if tags.is_empty() {
        return spans;
    }
    spans
        .into_iter()
        .filter(|s| tags.iter().any(|t| *t == s.tag))
        .collect()
}

impl<'a, R: AnnotationRepository + ?Sized> DiffSaves<'a, R> {
    /// Diff each listed save against the user's latest save, optionally
    /// restricted to a tag list.
    pub async fn execute(
        &self,
        fileid: &str,
        userid: &str,
        timestamps: &[DateTime<Utc>],
        tags: &[String],
    ) -> anyhow::Result<Vec<SaveDiff>> {
        let reference = match self.repo.latest_save(fileid, userid).await? {
            Some(save) => filter_tags(self.repo.load_save(fileid, save.timestamp).await?, tags),
            None => Vec::new(),
        };

        let mut diffs = Vec::with_capacity(timestamps.len());
        for &timestamp in timestamps {
            let spans = filter_tags(self.repo.load_save(fileid, timestamp).await?, tags);
            diffs.push(SaveDiff {
                timestamp,
                lines: scoring::diff_annotations(&spans, &reference),
            });
        }
        Ok(diffs)
    }
}
