use uuid::Uuid;

use crate::domain::annotations::span::TextSpan;
use crate::domain::annotations::span_set::SpanSet;

/// Deployment knobs for the link heuristics.
#[derive(Debug, Clone)]
pub struct AutoLinkConfig {
    /// Tags that count as enclosing containers for the `Name` heuristic.
    pub container_tags: Vec<String>,
    /// How far (in bytes) before a proof the linked theorem may end.
    pub proof_window: usize,
}

impl Default for AutoLinkConfig {
    fn default() -> Self {
        Self {
            container_tags: vec!["definition".to_string(), "theorem".to_string()],
            proof_window: 500,
        }
    }
}

/// The recognized link heuristics. Spans with any other tag get none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHeuristic {
    /// A name inside a definition/theorem links to the innermost container.
    Name,
    /// A reference links to the most recent preceding matching name.
    Reference,
    /// A proof links to the closest preceding theorem within the window.
    Proof,
}

impl LinkHeuristic {
    pub fn for_tag(tag: &str) -> Option<Self> {
        match tag {
            "name" => Some(Self::Name),
            "reference" => Some(Self::Reference),
            "proof" => Some(Self::Proof),
            _ => None,
        }
    }
}

/// Does `reference` refer to `name`? Exact match, naive plural ("s"/"es"),
/// or any whitespace-delimited token of the reference matching either.
fn name_match(name: &str, reference: &str) -> bool {
    if reference == name {
        return true;
    }
    let plural_s = format!("{name}s");
    let plural_es = format!("{name}es");
    if reference == plural_s || reference == plural_es {
        return true;
    }
    reference
        .split_whitespace()
        .any(|token| token == name || token == plural_s || token == plural_es)
}

/// Pick a link target for `anno` among `all`, or `None` when no heuristic
/// applies or no candidate qualifies. Pure; never inspects link state.
pub fn propose(anno: &TextSpan, all: &[TextSpan], cfg: &AutoLinkConfig) -> Option<Uuid> {
    match LinkHeuristic::for_tag(&anno.tag)? {
        LinkHeuristic::Name => {
            // Innermost enclosing container: smallest width wins.
            let mut target: Option<&TextSpan> = None;
            for candidate in all {
                if candidate.annoid == anno.annoid {
                    continue;
                }
                if !cfg.container_tags.iter().any(|t| *t == candidate.tag) {
                    continue;
                }
                if !(candidate.start <= anno.start && anno.end <= candidate.end) {
                    continue;
                }
                if target.is_none_or(|t| t.width() > candidate.width()) {
                    target = Some(candidate);
                }
            }
            target.map(|t| t.annoid)
        }
        LinkHeuristic::Reference => {
            // Names that occur before the reference and match its text;
            // the most recent one wins.
            all.iter()
                .filter(|a| a.tag == "name" && a.end <= anno.start && name_match(&a.text, &anno.text))
                .max_by_key(|a| a.start)
                .map(|a| a.annoid)
        }
        LinkHeuristic::Proof => {
            // Theorems ending at most `proof_window` bytes before the proof;
            // the closest preceding end wins. The window is inclusive.
            all.iter()
                .filter(|a| {
                    a.tag == "theorem"
                        && a.end <= anno.start
                        && a.end + cfg.proof_window >= anno.start
                })
                .max_by_key(|a| a.end)
                .map(|a| a.annoid)
        }
    }
}

/// Run the heuristics for a freshly created/edited span and establish the
/// proposed link, add-only. Returns the target id when a link was made.
/// Finding no candidate is not an error, just a no-op.
pub fn auto_link(set: &mut SpanSet, annoid: Uuid, cfg: &AutoLinkConfig) -> Option<Uuid> {
    let anno = set.get(annoid)?.clone();
    let target = propose(&anno, set.spans(), cfg)?;
    set.toggle_link(annoid, target, true);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn unrecognized_tags_have_no_heuristic() {
        assert_eq!(LinkHeuristic::for_tag("definition"), None);
        assert_eq!(LinkHeuristic::for_tag("example"), None);
        assert_eq!(LinkHeuristic::for_tag(""), None);
        assert_eq!(LinkHeuristic::for_tag("proof"), Some(LinkHeuristic::Proof));
    }

    #[test]
    fn name_links_to_innermost_container() {
        let theorem = span(0, 100, "theorem", "");
        let definition = span(10, 50, "definition", "");
        let name = span(20, 25, "name", "ring");
        let all = vec![theorem, definition.clone(), name.clone()];
        let target = propose(&name, &all, &AutoLinkConfig::default());
        assert_eq!(target, Some(definition.annoid));
    }

    #[test]
    fn name_outside_all_containers_gets_no_link() {
        let definition = span(10, 50, "definition", "");
        let name = span(60, 65, "name", "ring");
        let all = vec![definition, name.clone()];
        assert_eq!(propose(&name, &all, &AutoLinkConfig::default()), None);
    }

    #[test]
    fn container_allow_list_is_configurable() {
        let example = span(0, 40, "example", "");
        let name = span(10, 14, "name", "ring");
        let all = vec![example.clone(), name.clone()];

        assert_eq!(propose(&name, &all, &AutoLinkConfig::default()), None);

        let cfg = AutoLinkConfig {
            container_tags: vec!["definition".into(), "theorem".into(), "example".into()],
            ..AutoLinkConfig::default()
        };
        assert_eq!(propose(&name, &all, &cfg), Some(example.annoid));
    }

    #[test]
    fn reference_links_to_plural_of_earlier_name() {
        let name = span(0, 4, "name", "ring");
        let reference = span(20, 25, "reference", "rings");
        let all = vec![name.clone(), reference.clone()];
        let target = propose(&reference, &all, &AutoLinkConfig::default());
        assert_eq!(target, Some(name.annoid));
    }

    #[test]
    fn reference_prefers_most_recent_preceding_name() {
        let early = span(0, 4, "name", "ring");
        let late = span(40, 44, "name", "ring");
        let reference = span(60, 64, "reference", "ring");
        let all = vec![early, late.clone(), reference.clone()];
        assert_eq!(
            propose(&reference, &all, &AutoLinkConfig::default()),
            Some(late.annoid)
        );
    }

    #[test]
    fn reference_never_links_forward() {
        let reference = span(0, 5, "reference", "rings");
        let name = span(20, 24, "name", "ring");
        let all = vec![reference.clone(), name];
        assert_eq!(propose(&reference, &all, &AutoLinkConfig::default()), None);
    }

    #[test]
    fn reference_matches_on_individual_tokens() {
        let name = span(0, 4, "name", "ring");
        let reference = span(20, 36, "reference", "commutative rings");
        let all = vec![name.clone(), reference.clone()];
        assert_eq!(
            propose(&reference, &all, &AutoLinkConfig::default()),
            Some(name.annoid)
        );

        let unrelated = span(50, 60, "reference", "fields");
        assert_eq!(propose(&unrelated, &all, &AutoLinkConfig::default()), None);
    }

    #[test]
    fn proof_window_is_inclusive_at_the_boundary() {
        let theorem = span(50, 100, "theorem", "");
        let at_boundary = span(600, 650, "proof", "");
        let past_boundary = span(601, 650, "proof", "");
        let all = vec![theorem.clone()];

        let cfg = AutoLinkConfig::default();
        assert_eq!(propose(&at_boundary, &all, &cfg), Some(theorem.annoid));
        assert_eq!(propose(&past_boundary, &all, &cfg), None);
    }

    #[test]
    fn proof_links_to_closest_preceding_theorem() {
        let far = span(0, 50, "theorem", "");
        let near = span(60, 120, "theorem", "");
        let proof = span(150, 200, "proof", "");
        let all = vec![far, near.clone(), proof.clone()];
        assert_eq!(
            propose(&proof, &all, &AutoLinkConfig::default()),
            Some(near.annoid)
        );
    }

    #[test]
    fn auto_link_is_add_only_and_idempotent() {
        let doc = "Definition. A ring is a set with two operations.";
        let mut set = SpanSet::new();
        let def = set.add_mark(doc, "doc.tex", 0, 48, "definition", "").unwrap();
        let name = set.add_mark(doc, "doc.tex", 14, 18, "name", "").unwrap();

        let cfg = AutoLinkConfig::default();
        assert_eq!(auto_link(&mut set, name.annoid, &cfg), Some(def.annoid));
        // Re-running must not toggle the link away.
        assert_eq!(auto_link(&mut set, name.annoid, &cfg), Some(def.annoid));
        assert_eq!(set.get(name.annoid).unwrap().links.len(), 1);
    }

    #[test]
    fn auto_link_without_candidate_is_a_noop() {
        let doc = "No containers here.";
        let mut set = SpanSet::new();
        let name = set.add_mark(doc, "doc.tex", 3, 13, "name", "").unwrap();
        assert_eq!(auto_link(&mut set, name.annoid, &AutoLinkConfig::default()), None);
        assert!(set.get(name.annoid).unwrap().links.is_empty());
    }
}
