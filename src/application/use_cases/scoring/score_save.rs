use chrono::{DateTime, Utc};

use crate::application::ports::annotation_repository::AnnotationRepository;
use crate::application::services::scoring::{self, ScoreReport};

pub struct ScoreSave<'a, R: AnnotationRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub fileid: String,
    pub timestamp: DateTime<Utc>,
    pub ref_fileid: String,
    pub ref_timestamp: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub report: ScoreReport,
    pub diff: Vec<String>,
}

impl ScoreOutcome {
    /// Downloadable plain-text rendering of the score and diff.
    pub fn to_report_text(&self, req: &ScoreRequest) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Scores for {} @{} against {} @{}\n",
            req.fileid, req.timestamp, req.ref_fileid, req.ref_timestamp
        ));
        out.push_str(&format!(
            "precision: {:.4}\nrecall:    {:.4}\nf1:        {:.4}\n",
            self.report.precision, self.report.recall, self.report.f1
        ));
        out.push_str("\n--- diff (>: system only, <: reference only) ---\n");
        for line in &self.diff {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl<'a, R: AnnotationRepository + ?Sized> ScoreSave<'a, R> {
    pub async fn execute(&self, req: &ScoreRequest) -> anyhow::Result<ScoreOutcome> {
        let system = self.repo.load_save(&req.fileid, req.timestamp).await?;
        let reference = self
            .repo
            .load_save(&req.ref_fileid, req.ref_timestamp)
            .await?;
        let tags: Vec<&str> = req.tags.iter().map(|t| t.as_str()).collect();
        Ok(ScoreOutcome {
            report: scoring::score_annotations(&system, &reference, &tags),
            diff: scoring::diff_annotations(&system, &reference),
        })
    }
}
