use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Highlight palette cycled round-robin as marks are created. A span keeps
/// the color it was assigned even after the cursor wraps.
pub const PALETTE: [&str; 8] = [
    "#a8dadc", "#ffb4a2", "#b5e48c", "#ffd166", "#cdb4db", "#90e0ef", "#f4a261", "#e5989b",
];

/// Directed edge between two spans. Everything besides `source`/`target` is a
/// snapshot of the target at link-creation time and is never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub start: usize,
    pub end: usize,
    pub tag: String,
    pub fileid: String,
    pub color: String,
    pub source: Uuid,
    pub target: Uuid,
}

/// One annotation: a tagged, bounded region of document text.
///
/// `start`/`end` are half-open byte offsets into the document, both on UTF-8
/// character boundaries. `text` caches `doc[start..end]` and is re-derived
/// whenever the bounds change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TextSpan {
    pub annoid: Uuid,
    pub fileid: String,
    pub start: usize,
    pub end: usize,
    pub tag: String,
    pub text: String,
    #[serde(default)]
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl TextSpan {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// Build the link record `source -> target`, snapshotting the target.
pub fn make_link(source: &TextSpan, target: &TextSpan) -> Link {
    Link {
        start: target.start,
        end: target.end,
        tag: target.tag.clone(),
        fileid: target.fileid.clone(),
        color: target.color.clone(),
        source: source.annoid,
        target: target.annoid,
    }
}
