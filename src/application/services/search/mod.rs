use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::application::ports::document_store::DocumentStore;

/// Definition-shaped sentence patterns. Users may append their own per
/// request; the combined list keys the index cache.
pub const DEFAULT_PATTERNS: [&str; 5] = [
    r"a ([a-z]* )*is a",
    r"is called ([^ ]* )*if",
    r"is called ([^ ]* )*when",
    r"we call ([^ ]* )*if",
    r"we define ([^ ]* )*to be",
];

#[derive(Debug, Clone)]
struct IndexEntry {
    file: String,
    line: usize,
    text: String,
    /// Position of the line within its file, 0..=1, for jump-to-location.
    percent: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefinitionHit {
    pub file: String,
    pub line: usize,
    pub text: String,
    pub percent: f64,
    pub score: f64,
}

fn compile_patterns(extra: &[String]) -> anyhow::Result<Regex> {
    let mut parts: Vec<String> = DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect();
    for p in extra {
        // A broken user pattern poisons the whole alternation, so validate
        // each one separately first.
        Regex::new(p).map_err(|e| anyhow::anyhow!("invalid extra pattern {p:?}: {e}"))?;
        parts.push(p.clone());
    }
    let joined = format!("(?i){}", parts.join("|"));
    Ok(Regex::new(&joined)?)
}

fn truncate_chars(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    text.chars().take(width).collect()
}

/// Similarity of a query against one indexed line, 0..=1.
fn ratio(query: &str, line: &str) -> f64 {
    let a = query.to_lowercase();
    let b = line.to_lowercase();
    similar::TextDiff::from_chars(a.as_str(), b.as_str()).ratio() as f64
}

/// Fuzzy search over definition-shaped lines of every stored document.
/// The index is built lazily from the document store and cached until the
/// effective pattern list changes.
pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    cache: RwLock<Option<(Vec<String>, Arc<Vec<IndexEntry>>)>>,
}

impl SearchService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(None),
        }
    }

    async fn index(&self, extra: &[String]) -> anyhow::Result<Arc<Vec<IndexEntry>>> {
        let key: Vec<String> = extra.to_vec();
        if let Some((cached_key, entries)) = self.cache.read().await.as_ref() {
            if *cached_key == key {
                return Ok(entries.clone());
            }
        }

        let matcher = compile_patterns(extra)?;
        let mut entries = Vec::new();
        for doc in self.store.list_documents().await? {
            let Some(tex) = self.store.load_tex(&doc.name).await? else {
                continue;
            };
            let total_lines = tex.lines().count().max(1);
            for (i, line) in tex.lines().enumerate() {
                if matcher.is_match(line) {
                    entries.push(IndexEntry {
                        file: doc.name.clone(),
                        line: i + 1,
                        text: line.to_string(),
                        percent: (i + 1) as f64 / total_lines as f64,
                    });
                }
            }
        }
        tracing::debug!(entries = entries.len(), "definition index built");

        let entries = Arc::new(entries);
        *self.cache.write().await = Some((key, entries.clone()));
        Ok(entries)
    }

    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        width: usize,
        extra_patterns: &[String],
    ) -> anyhow::Result<Vec<DefinitionHit>> {
        let index = self.index(extra_patterns).await?;
        let mut scored: Vec<DefinitionHit> = index
            .iter()
            .map(|e| DefinitionHit {
                file: e.file.clone(),
                line: e.line,
                text: truncate_chars(&e.text, width),
                percent: e.percent,
                score: ratio(query, &e.text),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::document_store::{DocumentInfo, PdfPayload};
    use async_trait::async_trait;

    struct StubStore {
        docs: Vec<(String, String)>,
    }

    #[async_trait]
    impl DocumentStore for StubStore {
        async fn list_documents(&self) -> anyhow::Result<Vec<DocumentInfo>> {
            Ok(self
                .docs
                .iter()
                .map(|(name, _)| DocumentInfo {
                    name: name.clone(),
                    arxiv_id: String::new(),
                    stem: name.trim_end_matches(".tex").to_string(),
                    modified: String::new(),
                    size: "0.0".to_string(),
                })
                .collect())
        }

        async fn load_tex(&self, fileid: &str) -> anyhow::Result<Option<String>> {
            Ok(self
                .docs
                .iter()
                .find(|(name, _)| name == fileid)
                .map(|(_, tex)| tex.clone()))
        }

        async fn load_pdf(&self, _fileid: &str) -> anyhow::Result<Option<PdfPayload>> {
            Ok(None)
        }
    }

    fn service() -> SearchService {
        let store = StubStore {
            docs: vec![(
                "algebra.tex".to_string(),
                "Preliminaries.\n\
                 A ring is a set with two binary operations.\n\
                 Nothing to see here.\n\
                 A map f is called continuous if preimages of open sets are open.\n\
                 The end.\n"
                    .to_string(),
            )],
        };
        SearchService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn indexes_only_definition_shaped_lines() {
        let svc = service();
        let hits = svc.search("ring", 10, 0, &[]).await.unwrap();
        assert_eq!(hits.len(), 2);
        let lines: Vec<usize> = hits.iter().map(|h| h.line).collect();
        assert!(lines.contains(&2));
        assert!(lines.contains(&4));
    }

    #[test]
    fn default_patterns_match_expected_shapes() {
        let re = compile_patterns(&[]).unwrap();
        assert!(re.is_match("a ring is a set"));
        assert!(re.is_match("A commutative ring is a ring whose multiplication commutes"));
        assert!(re.is_match("f is called continuous if it preserves limits"));
        assert!(re.is_match("we define the kernel to be the preimage of zero"));
        assert!(!re.is_match("consider the following diagram"));
    }

    #[tokio::test]
    async fn ranks_the_matching_line_first() {
        let svc = service();
        let hits = svc
            .search("a ring is a set with two binary operations", 1, 0, &[])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 2);
        assert!(hits[0].score > 0.8);
    }

    #[tokio::test]
    async fn extra_patterns_extend_the_index() {
        let svc = service();
        let extra = vec!["The end".to_string()];
        let hits = svc.search("The end", 10, 0, &extra).await.unwrap();
        assert!(hits.iter().any(|h| h.line == 5));
    }

    #[tokio::test]
    async fn invalid_extra_pattern_is_an_error() {
        let svc = service();
        let extra = vec!["(unclosed".to_string()];
        assert!(svc.search("x", 5, 0, &extra).await.is_err());
    }

    #[tokio::test]
    async fn width_truncates_hit_text() {
        let svc = service();
        let hits = svc.search("ring", 10, 6, &[]).await.unwrap();
        assert!(hits.iter().all(|h| h.text.chars().count() <= 6));
    }
}
