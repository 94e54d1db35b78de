use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::application::ports::document_store::{DocumentInfo, DocumentStore, PdfPayload};

static ARXIV_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

/// Documents on local disk: LaTeX sources under `<root>/texs`, companion
/// PDFs under `<root>/pdfs`. File ids are bare file names.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn texs_dir(&self) -> PathBuf {
        self.root.join("texs")
    }

    fn pdfs_dir(&self) -> PathBuf {
        self.root.join("pdfs")
    }
}

/// File ids come straight from query strings; anything that could escape the
/// storage root is refused.
fn safe_fileid(fileid: &str) -> bool {
    !fileid.is_empty()
        && !fileid.contains('/')
        && !fileid.contains('\\')
        && !fileid.contains("..")
}

/// Split `2301.00001-intro-to-rings.tex` into its arXiv id and stem. Names
/// without an arXiv prefix get an empty id.
fn parse_name(name: &str) -> (String, String) {
    if let Some((prefix, rest)) = name.split_once('-') {
        if ARXIV_PREFIX.is_match(prefix) {
            return (prefix.to_string(), rest.trim_end_matches(".tex").to_string());
        }
    }
    (String::new(), name.trim_end_matches(".tex").to_string())
}

fn format_modified(modified: std::time::SystemTime) -> String {
    let dt: DateTime<Utc> = modified.into();
    dt.format("'%y %b %d @%H:%M").to_string()
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn list_documents(&self) -> anyhow::Result<Vec<DocumentInfo>> {
        let mut docs = Vec::new();
        for entry in WalkDir::new(self.texs_dir()).max_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = ?err, "skipping unreadable store entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".tex") {
                continue;
            }
            let meta = entry.metadata()?;
            let (arxiv_id, stem) = parse_name(&name);
            docs.push(DocumentInfo {
                name,
                arxiv_id,
                stem,
                modified: meta
                    .modified()
                    .map(format_modified)
                    .unwrap_or_default(),
                size: format!("{:.1}", meta.len() as f64 / 1024.0),
            });
        }
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(docs)
    }

    async fn load_tex(&self, fileid: &str) -> anyhow::Result<Option<String>> {
        if !safe_fileid(fileid) {
            return Ok(None);
        }
        let path = self.texs_dir().join(fileid);
        match tokio::fs::read_to_string(&path).await {
            Ok(tex) => Ok(Some(tex)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn load_pdf(&self, fileid: &str) -> anyhow::Result<Option<PdfPayload>> {
        if !safe_fileid(fileid) {
            return Ok(None);
        }
        // arXiv documents resolve to the public PDF.
        if let Some((prefix, _)) = fileid.split_once('-') {
            if ARXIV_PREFIX.is_match(prefix) {
                return Ok(Some(PdfPayload::Url(format!(
                    "https://arxiv.org/pdf/{prefix}.pdf"
                ))));
            }
        }
        let pdf_name = fileid.replace(".tex", ".pdf");
        let path = self.pdfs_dir().join(pdf_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(PdfPayload::Base64(BASE64.encode(bytes)))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_files(files: &[(&str, &str)]) -> (TempDir, FsDocumentStore) {
        let temp = TempDir::new().unwrap();
        let texs = temp.path().join("texs");
        std::fs::create_dir_all(&texs).unwrap();
        for (name, content) in files {
            std::fs::write(texs.join(name), content).unwrap();
        }
        let store = FsDocumentStore::new(temp.path());
        (temp, store)
    }

    #[test]
    fn parses_arxiv_prefixed_names() {
        let (id, stem) = parse_name("2301.00001-intro-to-rings.tex");
        assert_eq!(id, "2301.00001");
        assert_eq!(stem, "intro-to-rings");

        let (id, stem) = parse_name("lecture-notes.tex");
        assert_eq!(id, "");
        assert_eq!(stem, "lecture-notes");
    }

    #[test]
    fn rejects_escaping_fileids() {
        assert!(!safe_fileid("../secrets.tex"));
        assert!(!safe_fileid("a/b.tex"));
        assert!(!safe_fileid(""));
        assert!(safe_fileid("2301.00001-rings.tex"));
    }

    #[tokio::test]
    async fn lists_only_tex_files() {
        let (_temp, store) = store_with_files(&[("a.tex", "x"), ("b.tex", "y")]);
        std::fs::write(store.texs_dir().join("notes.txt"), "z").unwrap();
        let docs = store.list_documents().await.unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.tex", "b.tex"]);
    }

    #[tokio::test]
    async fn loads_tex_and_misses_cleanly() {
        let (_temp, store) = store_with_files(&[("a.tex", "\\section{Rings}")]);
        assert_eq!(
            store.load_tex("a.tex").await.unwrap().as_deref(),
            Some("\\section{Rings}")
        );
        assert!(store.load_tex("missing.tex").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn arxiv_pdfs_resolve_to_urls() {
        let (_temp, store) = store_with_files(&[]);
        let pdf = store.load_pdf("2301.00001-rings.tex").await.unwrap();
        match pdf {
            Some(PdfPayload::Url(url)) => {
                assert_eq!(url, "https://arxiv.org/pdf/2301.00001.pdf")
            }
            other => panic!("expected url payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn local_pdfs_are_base64_encoded() {
        let (temp, store) = store_with_files(&[]);
        let pdfs = temp.path().join("pdfs");
        std::fs::create_dir_all(&pdfs).unwrap();
        std::fs::write(pdfs.join("notes.pdf"), b"%PDF-1.4").unwrap();
        let pdf = store.load_pdf("notes.tex").await.unwrap();
        match pdf {
            Some(PdfPayload::Base64(data)) => {
                assert_eq!(BASE64.decode(data).unwrap(), b"%PDF-1.4")
            }
            other => panic!("expected base64 payload, got {other:?}"),
        }
    }
}
