use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::annotations::span::TextSpan;

/// The tag classes scores are macro-averaged over.
pub const SCORED_TAGS: [&str; 6] = [
    "definition",
    "theorem",
    "name",
    "reference",
    "example",
    "proof",
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreReport {
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

/// Per-position tag sets: for every (start, end) marked in either save, the
/// tags each side assigned there.
fn tag_sets<'a>(
    spans: &'a [TextSpan],
    tags: &[&str],
) -> BTreeMap<(usize, usize), BTreeSet<&'a str>> {
    let mut by_pos: BTreeMap<(usize, usize), BTreeSet<&'a str>> = BTreeMap::new();
    for span in spans {
        if tags.iter().any(|t| *t == span.tag) {
            by_pos
                .entry((span.start, span.end))
                .or_default()
                .insert(span.tag.as_str());
        }
    }
    by_pos
}

/// Macro-averaged precision/recall/F1 of `system` against `reference`,
/// aligning spans by (start, end) and binarizing per tag class. `tags`
/// restricts the class list; an empty slice means all of [`SCORED_TAGS`].
pub fn score_annotations(system: &[TextSpan], reference: &[TextSpan], tags: &[&str]) -> ScoreReport {
    let classes: Vec<&str> = if tags.is_empty() {
        SCORED_TAGS.to_vec()
    } else {
        SCORED_TAGS.iter().copied().filter(|t| tags.contains(t)).collect()
    };

    let sys = tag_sets(system, &classes);
    let refr = tag_sets(reference, &classes);

    let positions: BTreeSet<(usize, usize)> = sys.keys().chain(refr.keys()).copied().collect();

    let empty = BTreeSet::new();
    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut f1_sum = 0.0;

    for class in &classes {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for pos in &positions {
            let in_sys = sys.get(pos).unwrap_or(&empty).contains(class);
            let in_ref = refr.get(pos).unwrap_or(&empty).contains(class);
            match (in_sys, in_ref) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
                (false, false) => {}
            }
        }
        let precision = if tp + fp == 0 { 0.0 } else { tp as f64 / (tp + fp) as f64 };
        let recall = if tp + fn_ == 0 { 0.0 } else { tp as f64 / (tp + fn_) as f64 };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        precision_sum += precision;
        recall_sum += recall;
        f1_sum += f1;
    }

    let n = classes.len().max(1) as f64;
    ScoreReport {
        f1: f1_sum / n,
        precision: precision_sum / n,
        recall: recall_sum / n,
    }
}

fn shorten(text: &str) -> String {
    if text.len() > 75 {
        let mut cut = 75;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    } else {
        text.to_string()
    }
}

/// Line-per-span diff of two saves: `>` for spans only in `a`, `<` for spans
/// only in `b`, ordered by position. Shared spans are omitted.
pub fn diff_annotations(a: &[TextSpan], b: &[TextSpan]) -> Vec<String> {
    let key = |s: &TextSpan| (s.start, s.end, s.tag.clone(), s.text.clone());
    let set_a: BTreeSet<_> = a.iter().map(key).collect();
    let set_b: BTreeSet<_> = b.iter().map(key).collect();

    let mut lines = Vec::new();
    for entry in set_a.union(&set_b) {
        let (_, _, tag, text) = entry;
        let in_a = set_a.contains(entry);
        let in_b = set_b.contains(entry);
        if in_a && in_b {
            continue;
        }
        let marker = if in_a { '>' } else { '<' };
        let flat = shorten(text).replace('\n', " ");
        lines.push(format!("{marker} ({tag}) {flat}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn span(start: usize, end: usize, tag: &str, text: &str) -> TextSpan {
        TextSpan {
            annoid: Uuid::new_v4(),
            fileid: "doc.tex".to_string(),
            start,
            end,
            tag: tag.to_string(),
            text: text.to_string(),
            name: String::new(),
            color: "#a8dadc".to_string(),
            links: Vec::new(),
        }
    }

    #[test]
    fn identical_saves_score_perfectly() {
        let spans = vec![span(0, 10, "definition", "d"), span(2, 6, "name", "n")];
        let report = score_annotations(&spans, &spans, &["definition", "name"]);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn disjoint_saves_score_zero() {
        let sys = vec![span(0, 10, "definition", "d")];
        let refr = vec![span(20, 30, "definition", "d")];
        let report = score_annotations(&sys, &refr, &["definition"]);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn macro_average_over_classes() {
        // "definition" matches exactly, "name" is entirely missed by sys.
        let sys = vec![span(0, 10, "definition", "d")];
        let refr = vec![span(0, 10, "definition", "d"), span(2, 6, "name", "n")];
        let report = score_annotations(&sys, &refr, &["definition", "name"]);
        assert!((report.precision - 0.5).abs() < 1e-9);
        assert!((report.recall - 0.5).abs() < 1e-9);
        assert!((report.f1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn tag_filter_restricts_the_class_list() {
        let sys = vec![span(0, 10, "definition", "d")];
        let refr = vec![span(0, 10, "definition", "d"), span(2, 6, "name", "n")];
        let report = score_annotations(&sys, &refr, &["definition"]);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn diff_marks_sides_and_skips_shared() {
        let shared = span(0, 10, "definition", "a ring is a set");
        let only_a = span(20, 30, "name", "ring");
        let only_b = span(40, 50, "theorem", "every field is a ring");
        let lines = diff_annotations(
            &[shared.clone(), only_a],
            &[shared, only_b],
        );
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"> (name) ring".to_string()));
        assert!(lines.contains(&"< (theorem) every field is a ring".to_string()));
    }

    #[test]
    fn diff_truncates_long_text() {
        let long = "x".repeat(100);
        let lines = diff_annotations(&[span(0, 100, "definition", &long)], &[]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("..."));
        // "> (definition) " prefix + 75 kept chars + "..."
        assert_eq!(lines[0].len(), 15 + 75 + 3);
    }
}
