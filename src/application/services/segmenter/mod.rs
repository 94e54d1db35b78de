use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::annotations::span::TextSpan;

/// One covering span's projection onto a segment, together with the nesting
/// height assigned to it for stacked rendering.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SegmentTag {
    pub annoid: Uuid,
    pub tag: String,
    pub height: usize,
    pub start: usize,
    pub end: usize,
    pub fileid: String,
    pub color: String,
}

/// A maximal contiguous run of text covered by an unchanging set of spans.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub content: String,
    pub tags: Vec<SegmentTag>,
    pub has_link: bool,
}

fn smallest_unused_height(open: &[SegmentTag]) -> usize {
    let mut height = 0;
    while open.iter().any(|t| t.height == height) {
        height += 1;
    }
    height
}

/// Split `text` into display segments along every span boundary.
///
/// The result partitions `[0, text.len())` in increasing order: a segment
/// never crosses the start of a span that has not opened yet, nor the end of
/// one currently open. Each segment carries every covering span with a
/// nesting height that is minimal among the spans open at that point
/// (heights freed by closed spans are reused). Spans may overlap and nest
/// arbitrarily; spans out of bounds or off UTF-8 character boundaries are a
/// precondition violation, enforced where marks are created.
///
/// Pure function of its inputs.
pub fn segment(text: &str, spans: &[TextSpan]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut open: Vec<SegmentTag> = Vec::new();

    let mut sorted: Vec<&TextSpan> = spans.iter().collect();
    sorted.sort_by_key(|s| s.start);

    let mut offset_start = 0usize;
    let mut offset_end = 0usize;

    while offset_end < text.len() {
        // Candidates for where this segment must stop: the next span start
        // after the cursor, or the earliest end among spans covering it.
        let mut next_start = text.len();
        let mut current_end = text.len();

        for anno in &sorted {
            if offset_start < anno.start {
                next_start = next_start.min(anno.start);
            }
            if anno.start <= offset_start && offset_start < anno.end {
                // A span covering the same range with the same tag may appear
                // once per underlying span; re-adding the same entry is
                // suppressed by (tag, start, end, fileid).
                let already = open.iter().any(|t| {
                    t.tag == anno.tag
                        && t.start == anno.start
                        && t.end == anno.end
                        && t.fileid == anno.fileid
                });
                if !already {
                    open.push(SegmentTag {
                        annoid: anno.annoid,
                        tag: anno.tag.clone(),
                        height: smallest_unused_height(&open),
                        start: anno.start,
                        end: anno.end,
                        fileid: anno.fileid.clone(),
                        color: anno.color.clone(),
                    });
                }
                current_end = current_end.min(anno.end);
            }
        }

        offset_end = next_start.min(current_end);

        let has_link = sorted
            .iter()
            .any(|a| a.start <= offset_start && a.end >= offset_end && !a.links.is_empty());

        segments.push(Segment {
            start: offset_start,
            end: offset_end,
            content: text[offset_start..offset_end].to_string(),
            tags: open.clone(),
            has_link,
        });

        offset_start = offset_end;

        // Entries that close at this boundary free their height slots.
        if offset_end == current_end {
            open.retain(|t| t.end > current_end);
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotations::span_set::SpanSet;

    fn spans_for(doc: &str, marks: &[(usize, usize, &str)]) -> Vec<TextSpan> {
        let mut set = SpanSet::new();
        for (start, end, tag) in marks {
            set.add_mark(doc, "doc.tex", *start, *end, tag, "").unwrap();
        }
        set.into_spans()
    }

    fn assert_partition(text: &str, segments: &[Segment]) {
        let mut cursor = 0;
        for seg in segments {
            assert_eq!(seg.start, cursor, "segments must be contiguous");
            assert!(seg.start < seg.end, "segments must be non-empty");
            assert_eq!(seg.content, &text[seg.start..seg.end]);
            cursor = seg.end;
        }
        assert_eq!(cursor, text.len(), "segments must cover the whole text");
    }

    #[test]
    fn empty_text_yields_no_segments() {
        assert!(segment("", &[]).is_empty());
    }

    #[test]
    fn uncovered_text_is_a_single_untagged_segment() {
        let segs = segment("ABCDE", &[]);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].content, "ABCDE");
        assert!(segs[0].tags.is_empty());
    }

    #[test]
    fn nested_spans_split_at_every_boundary() {
        let text = "ABCDE";
        let spans = spans_for(text, &[(0, 3, "definition"), (1, 2, "name")]);
        let segs = segment(text, &spans);
        assert_partition(text, &segs);
        assert_eq!(segs.len(), 4);

        // [0,1): definition only, at height 0.
        assert_eq!(segs[0].end, 1);
        assert_eq!(segs[0].tags.len(), 1);
        assert_eq!(segs[0].tags[0].tag, "definition");
        assert_eq!(segs[0].tags[0].height, 0);

        // [1,2): definition at 0, name nested at 1.
        assert_eq!(segs[1].end, 2);
        let tags: Vec<(&str, usize)> = segs[1]
            .tags
            .iter()
            .map(|t| (t.tag.as_str(), t.height))
            .collect();
        assert_eq!(tags, vec![("definition", 0), ("name", 1)]);

        // [2,3): definition only again.
        assert_eq!(segs[2].end, 3);
        assert_eq!(segs[2].tags.len(), 1);
        assert_eq!(segs[2].tags[0].tag, "definition");

        // [3,5): plain text.
        assert_eq!(segs[3].end, 5);
        assert!(segs[3].tags.is_empty());
    }

    #[test]
    fn partially_overlapping_spans_partition_cleanly() {
        let text = "0123456789";
        let spans = spans_for(text, &[(0, 6, "theorem"), (4, 9, "reference")]);
        let segs = segment(text, &spans);
        assert_partition(text, &segs);
        let bounds: Vec<(usize, usize)> = segs.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, vec![(0, 4), (4, 6), (6, 9), (9, 10)]);
        assert_eq!(segs[1].tags.len(), 2);
        assert_eq!(segs[2].tags.len(), 1);
        assert_eq!(segs[2].tags[0].tag, "reference");
    }

    #[test]
    fn heights_are_unique_and_minimal_per_segment() {
        let text = "abcdefghijklmnopqrst";
        let spans = spans_for(
            text,
            &[(0, 20, "definition"), (2, 6, "name"), (8, 12, "reference"), (9, 11, "name")],
        );
        for seg in segment(text, &spans) {
            let mut heights: Vec<usize> = seg.tags.iter().map(|t| t.height).collect();
            let unique_before = heights.len();
            heights.sort_unstable();
            heights.dedup();
            assert_eq!(heights.len(), unique_before, "duplicate height in {seg:?}");
            // Minimality: the used heights are exactly 0..n.
            assert_eq!(heights, (0..heights.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn closed_span_frees_its_height_for_reuse() {
        let text = "abcdefghijklmnopqrst";
        let spans = spans_for(text, &[(0, 20, "definition"), (2, 6, "name"), (10, 14, "reference")]);
        let segs = segment(text, &spans);
        // The "name" at [2,6) occupies height 1; once closed, the later
        // "reference" must reuse height 1 rather than stack at 2.
        let reference_seg = segs.iter().find(|s| s.start == 10).unwrap();
        let tag = reference_seg.tags.iter().find(|t| t.tag == "reference").unwrap();
        assert_eq!(tag.height, 1);
    }

    #[test]
    fn identical_ranges_with_same_tag_collapse_to_one_entry() {
        let text = "ABCDE";
        // Distinct underlying spans, same (tag, start, end, fileid): the open
        // set keeps a single entry.
        let mut spans = spans_for(text, &[(1, 3, "name")]);
        let mut dup = spans[0].clone();
        dup.annoid = Uuid::new_v4();
        spans.push(dup);
        let segs = segment(text, &spans);
        let covered = segs.iter().find(|s| s.start == 1).unwrap();
        assert_eq!(covered.tags.len(), 1);
    }

    #[test]
    fn identical_ranges_with_different_tags_both_appear() {
        let text = "ABCDE";
        let spans = spans_for(text, &[(1, 3, "name"), (1, 3, "reference")]);
        let segs = segment(text, &spans);
        let covered = segs.iter().find(|s| s.start == 1).unwrap();
        assert_eq!(covered.tags.len(), 2);
    }

    #[test]
    fn has_link_is_set_only_under_linked_spans() {
        let text = "ABCDEFGH";
        let mut set = SpanSet::new();
        let def = set.add_mark(text, "doc.tex", 0, 4, "definition", "").unwrap();
        let name = set.add_mark(text, "doc.tex", 1, 3, "name", "").unwrap();
        set.toggle_link(name.annoid, def.annoid, false);
        let segs = segment(text, &set.into_spans());
        for seg in &segs {
            let under_name = seg.start >= 1 && seg.end <= 3;
            assert_eq!(seg.has_link, under_name, "at {}..{}", seg.start, seg.end);
        }
    }

    #[test]
    fn segmentation_is_idempotent() {
        let text = "Let R be a ring. A module over R is an abelian group.";
        let spans = spans_for(text, &[(0, 16, "definition"), (11, 15, "name"), (17, 53, "definition")]);
        assert_eq!(segment(text, &spans), segment(text, &spans));
    }

    #[test]
    fn multibyte_text_segments_on_char_boundaries() {
        let text = "αβγ δε";
        // "αβγ" is bytes 0..6, the trailing "δε" is 7..11.
        let spans = spans_for(text, &[(0, 6, "name")]);
        let segs = segment(text, &spans);
        assert_partition(text, &segs);
        assert_eq!(segs[0].content, "αβγ");
    }
}
