use uuid::Uuid;

use super::span::{Link, PALETTE, TextSpan, make_link};

/// The working set of spans for one editing session.
///
/// Spans are immutable value records: every mutation replaces the span at its
/// index with a new value. In particular a span's link list is never aliased
/// or mutated in place, so a reader holding a clone of the set can never
/// observe a half-updated span.
#[derive(Debug, Clone, Default)]
pub struct SpanSet {
    spans: Vec<TextSpan>,
    next_color: usize,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing span collection, resuming the palette cursor after
    /// the most recently assigned color.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let next_color = spans
            .last()
            .and_then(|s| PALETTE.iter().position(|c| *c == s.color))
            .map(|i| (i + 1) % PALETTE.len())
            .unwrap_or(0);
        Self { spans, next_color }
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<TextSpan> {
        self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, annoid: Uuid) -> Option<&TextSpan> {
        self.spans.iter().find(|s| s.annoid == annoid)
    }

    fn take_color(&mut self) -> String {
        let color = PALETTE[self.next_color % PALETTE.len()].to_string();
        self.next_color = (self.next_color + 1) % PALETTE.len();
        color
    }

    fn valid_bounds(doc: &str, start: usize, end: usize) -> bool {
        start < end
            && end <= doc.len()
            && doc.is_char_boundary(start)
            && doc.is_char_boundary(end)
    }

    /// Create a new mark over `doc[start..end]`.
    ///
    /// Returns `None` for a zero-length or out-of-bounds selection, and for a
    /// mark identical (same bounds, tag and file) to one already in the set.
    /// Callers must check the result before auto-linking.
    pub fn add_mark(
        &mut self,
        doc: &str,
        fileid: &str,
        start: usize,
        end: usize,
        tag: &str,
        name: &str,
    ) -> Option<TextSpan> {
        if !Self::valid_bounds(doc, start, end) {
            return None;
        }
        let duplicate = self.spans.iter().any(|s| {
            s.start == start && s.end == end && s.tag == tag && s.fileid == fileid
        });
        if duplicate {
            return None;
        }
        let span = TextSpan {
            annoid: Uuid::new_v4(),
            fileid: fileid.to_string(),
            start,
            end,
            tag: tag.to_string(),
            text: doc[start..end].to_string(),
            name: name.to_string(),
            color: self.take_color(),
            links: Vec::new(),
        };
        self.spans.push(span.clone());
        Some(span)
    }

    /// Reassign bounds/tag/name of an existing mark, re-deriving its cached
    /// text. Color and links are kept. Returns the updated value.
    pub fn update_mark(
        &mut self,
        doc: &str,
        annoid: Uuid,
        start: usize,
        end: usize,
        tag: &str,
        name: &str,
    ) -> Option<TextSpan> {
        if !Self::valid_bounds(doc, start, end) {
            return None;
        }
        let idx = self.spans.iter().position(|s| s.annoid == annoid)?;
        let mut updated = self.spans[idx].clone();
        updated.start = start;
        updated.end = end;
        updated.tag = tag.to_string();
        updated.name = name.to_string();
        updated.text = doc[start..end].to_string();
        self.spans[idx] = updated.clone();
        Some(updated)
    }

    /// Remove a mark and every link pointing at it from other spans.
    pub fn remove_mark(&mut self, annoid: Uuid) -> bool {
        let before = self.spans.len();
        self.spans.retain(|s| s.annoid != annoid);
        if self.spans.len() == before {
            return false;
        }
        for i in 0..self.spans.len() {
            if self.spans[i].links.iter().any(|l| l.target == annoid) {
                let mut updated = self.spans[i].clone();
                updated.links.retain(|l| l.target != annoid);
                self.spans[i] = updated;
            }
        }
        true
    }

    /// Toggle the link `source -> target`. Two links are the same iff their
    /// source and target ids match. With `force_enable` an existing link is
    /// left in place instead of being removed (add-only semantics, used by
    /// the auto-linker). Returns whether the link is present afterwards.
    pub fn toggle_link(&mut self, source: Uuid, target: Uuid, force_enable: bool) -> bool {
        let Some(src_idx) = self.spans.iter().position(|s| s.annoid == source) else {
            return false;
        };
        let Some(target_span) = self.get(target).cloned() else {
            return false;
        };
        let link: Link = make_link(&self.spans[src_idx], &target_span);

        let mut updated = self.spans[src_idx].clone();
        let existing = updated
            .links
            .iter()
            .position(|l| l.source == link.source && l.target == link.target);
        let present = match existing {
            Some(_) if force_enable => true,
            Some(pos) => {
                updated.links.remove(pos);
                false
            }
            None => {
                updated.links.push(link);
                true
            }
        };
        self.spans[src_idx] = updated;
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Let R be a ring. A module over R is an abelian group.";

    fn set_with(doc: &str, marks: &[(usize, usize, &str)]) -> SpanSet {
        let mut set = SpanSet::new();
        for (start, end, tag) in marks {
            set.add_mark(doc, "doc.tex", *start, *end, tag, "")
                .expect("mark should be accepted");
        }
        set
    }

    #[test]
    fn rejects_zero_length_and_out_of_bounds() {
        let mut set = SpanSet::new();
        assert!(set.add_mark(DOC, "doc.tex", 4, 4, "name", "").is_none());
        assert!(set.add_mark(DOC, "doc.tex", 10, 9999, "name", "").is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn rejects_offsets_inside_a_character() {
        let doc = "λ-calculus";
        let mut set = SpanSet::new();
        // Offset 1 falls inside the two-byte lambda.
        assert!(set.add_mark(doc, "doc.tex", 1, 4, "name", "").is_none());
        assert!(set.add_mark(doc, "doc.tex", 0, 2, "name", "").is_some());
    }

    #[test]
    fn caches_text_and_cycles_palette() {
        let mut set = SpanSet::new();
        let a = set.add_mark(DOC, "doc.tex", 11, 15, "name", "").unwrap();
        assert_eq!(a.text, "ring");
        assert_eq!(a.color, PALETTE[0]);
        let b = set.add_mark(DOC, "doc.tex", 19, 25, "name", "").unwrap();
        assert_eq!(b.color, PALETTE[1]);

        // Cursor wraps after the last palette entry.
        let mut full = SpanSet::new();
        for i in 0..PALETTE.len() + 1 {
            full.add_mark(DOC, "doc.tex", i, i + 1, "name", "").unwrap();
        }
        assert_eq!(full.spans().last().unwrap().color, PALETTE[0]);
    }

    #[test]
    fn palette_cursor_resumes_from_loaded_spans() {
        let mut set = SpanSet::new();
        set.add_mark(DOC, "doc.tex", 0, 3, "definition", "").unwrap();
        set.add_mark(DOC, "doc.tex", 4, 5, "name", "").unwrap();
        let reloaded = SpanSet::from_spans(set.into_spans());
        let mut reloaded = reloaded;
        let c = reloaded.add_mark(DOC, "doc.tex", 6, 8, "name", "").unwrap();
        assert_eq!(c.color, PALETTE[2]);
    }

    #[test]
    fn duplicate_marks_are_not_added_twice() {
        let mut set = set_with(DOC, &[(11, 15, "name")]);
        assert!(set.add_mark(DOC, "doc.tex", 11, 15, "name", "").is_none());
        assert_eq!(set.len(), 1);
        // Same bounds with a different tag is a distinct mark.
        assert!(set.add_mark(DOC, "doc.tex", 11, 15, "reference", "").is_some());
    }

    #[test]
    fn update_rederives_cached_text() {
        let mut set = set_with(DOC, &[(11, 15, "name")]);
        let id = set.spans()[0].annoid;
        let updated = set.update_mark(DOC, id, 0, 5, "definition", "").unwrap();
        assert_eq!(updated.text, "Let R");
        assert_eq!(updated.tag, "definition");
        assert_eq!(set.spans()[0], updated);
    }

    #[test]
    fn toggle_twice_restores_original_links() {
        let mut set = set_with(DOC, &[(0, 16, "definition"), (11, 15, "name")]);
        let source = set.spans()[1].annoid;
        let target = set.spans()[0].annoid;

        assert!(set.toggle_link(source, target, false));
        assert_eq!(set.get(source).unwrap().links.len(), 1);
        let link = &set.get(source).unwrap().links[0];
        assert_eq!(link.target, target);
        assert_eq!(link.tag, "definition");

        assert!(!set.toggle_link(source, target, false));
        assert!(set.get(source).unwrap().links.is_empty());
    }

    #[test]
    fn force_enable_never_removes() {
        let mut set = set_with(DOC, &[(0, 16, "definition"), (11, 15, "name")]);
        let source = set.spans()[1].annoid;
        let target = set.spans()[0].annoid;

        assert!(set.toggle_link(source, target, true));
        assert!(set.toggle_link(source, target, true));
        assert_eq!(set.get(source).unwrap().links.len(), 1);
    }

    #[test]
    fn removing_a_mark_drops_dangling_links() {
        let mut set = set_with(DOC, &[(0, 16, "definition"), (11, 15, "name")]);
        let source = set.spans()[1].annoid;
        let target = set.spans()[0].annoid;
        set.toggle_link(source, target, false);

        assert!(set.remove_mark(target));
        assert_eq!(set.len(), 1);
        assert!(set.get(source).unwrap().links.is_empty());
    }
}
