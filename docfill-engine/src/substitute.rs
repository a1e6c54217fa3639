//! Run-aware placeholder substitution
//!
//! A placeholder token's characters may be split arbitrarily across run
//! boundaries by the originating editor, so substitution maps each token
//! occurrence from the paragraph's full text back onto the runs it
//! intersects and rewrites run text in place. Styles are never touched;
//! the replacement text inherits the first affected run's style, a
//! deliberate choice: the editor who authored the placeholder determines
//! its resulting style.

use crate::asset::{dispatch_asset, is_asset_token, AssetKind, AssetRenderer};
use crate::document::{Document, Paragraph};
use crate::resolve::PlaceholderMap;
use serde::Serialize;
use smallvec::SmallVec;

/// Counters for one merge pass.
///
/// `paragraphs_touched` stays at zero for paragraphs that contain none of
/// the configured tokens: the engine bails out after a single containment
/// check without visiting runs, which is what keeps large documents cheap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Paragraphs examined (body, headers, footers)
    pub paragraphs_scanned: usize,
    /// Paragraphs whose runs were actually visited
    pub paragraphs_touched: usize,
    /// Token occurrences replaced in run-aware mode
    pub replacements: usize,
    /// Reserved asset tokens dispatched to the renderer
    pub assets_dispatched: usize,
    /// Table cells rewritten in plain mode
    pub cells_touched: usize,
}

impl MergeStats {
    fn absorb(&mut self, other: MergeStats) {
        self.paragraphs_scanned += other.paragraphs_scanned;
        self.paragraphs_touched += other.paragraphs_touched;
        self.replacements += other.replacements;
        self.assets_dispatched += other.assets_dispatched;
        self.cells_touched += other.cells_touched;
    }
}

/// One run intersecting a token occurrence, with the cut range local to
/// that run's text. Byte offsets; cuts always land on char boundaries
/// because they are either run boundaries or token-match boundaries.
struct AffectedRun {
    index: usize,
    cut_start: usize,
    cut_end: usize,
}

/// Substitute every mapped token in one paragraph, in map insertion order.
///
/// Reserved asset tokens are spliced out first with an empty replacement
/// and their values recorded; after the plain pass each recorded value is
/// dispatched to the renderer, which appends a rendered run (or a textual
/// fallback) at the end of the paragraph.
///
/// Only the first textual occurrence of each token is handled per call. A
/// second literal occurrence of the same token is left unresolved; callers
/// invoke substitution once per token in practice, so this is documented
/// behavior rather than a defect.
pub fn substitute_paragraph(
    paragraph: &mut Paragraph,
    map: &PlaceholderMap,
    renderer: &dyn AssetRenderer,
    stats: &mut MergeStats,
) {
    stats.paragraphs_scanned += 1;

    // Cheap skip for the common no-placeholder paragraph. This is the hot
    // path across the whole document, every table cell, and every
    // header/footer.
    let full_text = paragraph.text();
    if !map.iter().any(|(token, _)| full_text.contains(token)) {
        return;
    }
    stats.paragraphs_touched += 1;

    // Asset tokens are removed before the plain pass so their text never
    // interferes with neighboring replacements.
    let mut pending_assets: Vec<String> = Vec::new();
    for (token, value) in map.iter() {
        if is_asset_token(token) && splice_token(paragraph, token, "") {
            pending_assets.push(value.to_string());
        }
    }

    for (token, replacement) in map.iter() {
        if !is_asset_token(token) && splice_token(paragraph, token, replacement) {
            stats.replacements += 1;
        }
    }

    for value in pending_assets {
        dispatch_asset(paragraph, &value, AssetKind::default(), renderer);
        stats.assets_dispatched += 1;
    }
}

/// Replace the first occurrence of `token` in the paragraph's full text,
/// rewriting only the runs the occurrence intersects. Returns whether a
/// replacement happened; an absent token is an idempotent no-op.
pub fn splice_token(paragraph: &mut Paragraph, token: &str, replacement: &str) -> bool {
    if token.is_empty() {
        return false;
    }

    let full_text = paragraph.text();
    let Some(start) = full_text.find(token) else {
        return false;
    };
    let end = start + token.len();

    // Map the [start, end) range back onto runs by walking them in order.
    let mut affected: SmallVec<[AffectedRun; 4]> = SmallVec::new();
    let mut offset = 0;
    for (index, run) in paragraph.runs.iter().enumerate() {
        let run_start = offset;
        let run_end = offset + run.text.len();
        if run_start < end && run_end > start {
            affected.push(AffectedRun {
                index,
                cut_start: start.saturating_sub(run_start),
                cut_end: (end - run_start).min(run.text.len()),
            });
        }
        offset = run_end;
    }

    match affected.as_slice() {
        [] => false,
        [single] => {
            // Token contained in one run: prefix + replacement + suffix.
            let run = &mut paragraph.runs[single.index];
            let mut text =
                String::with_capacity(run.text.len() - token.len() + replacement.len());
            text.push_str(&run.text[..single.cut_start]);
            text.push_str(replacement);
            text.push_str(&run.text[single.cut_end..]);
            run.text = text;
            true
        }
        [first, interior @ .., last] => {
            // Token spans runs: the first affected run carries the prefix
            // and the replacement, the last keeps its suffix, interior
            // runs are emptied. Every run keeps its style.
            let first_run = &mut paragraph.runs[first.index];
            first_run.text.truncate(first.cut_start);
            first_run.text.push_str(replacement);

            for span in interior {
                paragraph.runs[span.index].text.clear();
            }

            let last_run = &mut paragraph.runs[last.index];
            last_run.text = last_run.text[last.cut_end..].to_string();
            true
        }
    }
}

/// Degraded whole-string mode for contexts without run formatting: every
/// occurrence of every mapped token is replaced. Used for table cells and
/// plain-text templates.
pub fn substitute_plain(text: &str, map: &PlaceholderMap) -> String {
    let mut out = text.to_string();
    for (token, replacement) in map.iter() {
        if out.contains(token) {
            out = out.replace(token, replacement);
        }
    }
    out
}

/// Apply a placeholder map to an entire document: body paragraphs in
/// document order, then each table's rows and cells, then each section's
/// header and footer paragraphs. Cells go through the plain mode, which
/// collapses a touched cell to a single unstyled run.
pub fn merge_document(
    document: &mut Document,
    map: &PlaceholderMap,
    renderer: &dyn AssetRenderer,
) -> MergeStats {
    let mut stats = MergeStats::default();

    for paragraph in &mut document.paragraphs {
        substitute_paragraph(paragraph, map, renderer, &mut stats);
    }

    for table in &mut document.tables {
        for row in &mut table.rows {
            for cell in &mut row.cells {
                let text = cell.text();
                if map.iter().any(|(token, _)| text.contains(token)) {
                    cell.set_text(substitute_plain(&text, map));
                    stats.cells_touched += 1;
                }
            }
        }
    }

    for section in &mut document.sections {
        let mut section_stats = MergeStats::default();
        for paragraph in &mut section.header {
            substitute_paragraph(paragraph, map, renderer, &mut section_stats);
        }
        for paragraph in &mut section.footer {
            substitute_paragraph(paragraph, map, renderer, &mut section_stats);
        }
        stats.absorb(section_stats);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NullRenderer;
    use crate::document::{Cell, Paragraph, Row, Run, Section, Table};
    use serde_json::json;

    fn map_of(entries: &[(&str, &str)]) -> PlaceholderMap {
        let mut map = PlaceholderMap::new();
        for (token, replacement) in entries {
            map.insert(token.to_string(), replacement.to_string());
        }
        map
    }

    #[test]
    fn test_single_run_substitution_preserves_style() {
        let mut style = serde_json::Map::new();
        style.insert("bold".to_string(), json!(true));
        let mut para = Paragraph {
            runs: vec![Run::styled("Dear {{NAME}},", style.clone())],
        };

        let mut stats = MergeStats::default();
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{NAME}}", "Ada")]),
            &NullRenderer,
            &mut stats,
        );

        assert_eq!(para.text(), "Dear Ada,");
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.runs[0].style, style);
        assert_eq!(stats.replacements, 1);
    }

    #[test]
    fn test_span_merge_across_runs() {
        let mut para = Paragraph::from_texts(["Hello ", "{{NA", "ME}}", "!"]);
        let replaced = splice_token(&mut para, "{{NAME}}", "World");
        assert!(replaced);
        assert_eq!(para.text(), "Hello World!");
        let texts: Vec<&str> = para.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello ", "World", "", "!"]);
    }

    #[test]
    fn test_spanning_token_with_interior_runs() {
        let mut para = Paragraph::from_texts(["a{{", "NA", "M", "E}}b"]);
        assert!(splice_token(&mut para, "{{NAME}}", "x"));
        let texts: Vec<&str> = para.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["ax", "", "", "b"]);
        assert_eq!(para.text(), "axb");
    }

    #[test]
    fn test_run_count_never_grows_during_substitution() {
        let mut para = Paragraph::from_texts(["{{A}}", " and ", "{{B}}"]);
        let before = para.runs.len();
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{A}}", "one"), ("{{B}}", "two")]),
            &NullRenderer,
            &mut MergeStats::default(),
        );
        assert_eq!(para.runs.len(), before);
        assert_eq!(para.text(), "one and two");
    }

    #[test]
    fn test_first_occurrence_only() {
        let mut para = Paragraph::from_texts(["{{X}} then {{X}}"]);
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{X}}", "v")]),
            &NullRenderer,
            &mut MergeStats::default(),
        );
        assert_eq!(para.text(), "v then {{X}}");
    }

    #[test]
    fn test_absent_token_is_noop() {
        let mut para = Paragraph::from_texts(["no markers here"]);
        assert!(!splice_token(&mut para, "{{NAME}}", "x"));
        assert_eq!(para.text(), "no markers here");
    }

    #[test]
    fn test_no_match_fast_path_skips_runs() {
        let mut para = Paragraph::from_texts(["plain ", "text ", "only"]);
        let before = para.clone();
        let mut stats = MergeStats::default();
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{NAME}}", "Ada"), ("{{DATE}}", "2024-01-01")]),
            &NullRenderer,
            &mut stats,
        );
        assert_eq!(para, before);
        assert_eq!(stats.paragraphs_scanned, 1);
        assert_eq!(stats.paragraphs_touched, 0);
        assert_eq!(stats.replacements, 0);
    }

    #[test]
    fn test_preserve_empty_token_maps_to_itself() {
        let mut para = Paragraph::from_texts(["Nick: {{NICK}}"]);
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{NICK}}", "{{NICK}}")]),
            &NullRenderer,
            &mut MergeStats::default(),
        );
        assert_eq!(para.text(), "Nick: {{NICK}}");
    }

    #[test]
    fn test_overlapping_tokens_resolve_in_map_order() {
        // "{{NAME}}" is a literal prefix of "{{NAME}}_X". Inserted first,
        // it consumes its characters and the longer token never matches.
        // Documented precedence, not a disambiguation rule.
        let mut para = Paragraph::from_texts(["{{NAME}}_X"]);
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{NAME}}", "Ada"), ("{{NAME}}_X", "Ada Lovelace")]),
            &NullRenderer,
            &mut MergeStats::default(),
        );
        assert_eq!(para.text(), "Ada_X");

        // With the longer token inserted first it wins instead.
        let mut para = Paragraph::from_texts(["{{NAME}}_X"]);
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{NAME}}_X", "Ada Lovelace"), ("{{NAME}}", "Ada")]),
            &NullRenderer,
            &mut MergeStats::default(),
        );
        assert_eq!(para.text(), "Ada Lovelace");
    }

    #[test]
    fn test_multibyte_text_around_token() {
        let mut para = Paragraph::from_texts(["héllo ", "{{NA", "ME}}", " wörld"]);
        assert!(splice_token(&mut para, "{{NAME}}", "ñ"));
        assert_eq!(para.text(), "héllo ñ wörld");
    }

    #[test]
    fn test_asset_token_spliced_out_and_fallback_appended() {
        let mut para = Paragraph::from_texts(["Scan ", "{{BARCODE_", "ORDER}}", " now"]);
        let mut stats = MergeStats::default();
        substitute_paragraph(
            &mut para,
            &map_of(&[("{{BARCODE_ORDER}}", "12345")]),
            &NullRenderer,
            &mut stats,
        );
        // Token text removed via run splicing, fallback appended at the
        // end of the paragraph rather than the token's position.
        assert_eq!(para.text(), "Scan  now[BARCODE: 12345]");
        assert_eq!(stats.assets_dispatched, 1);
    }

    #[test]
    fn test_plain_mode_replaces_every_occurrence() {
        let map = map_of(&[("{{X}}", "v")]);
        assert_eq!(substitute_plain("{{X}} and {{X}}", &map), "v and v");
        assert_eq!(substitute_plain("none", &map), "none");
    }

    #[test]
    fn test_merge_document_traversal_and_cell_plain_mode() {
        let mut doc = Document {
            paragraphs: vec![Paragraph::from_texts(["Body {{A}}"])],
            tables: vec![Table {
                rows: vec![Row {
                    cells: vec![
                        Cell {
                            paragraphs: vec![Paragraph::from_texts(["{{A}} ", "{{A}}"])],
                        },
                        Cell {
                            paragraphs: vec![Paragraph::from_texts(["untouched"])],
                        },
                    ],
                }],
            }],
            sections: vec![Section {
                header: vec![Paragraph::from_texts(["Head {{A}}"])],
                footer: vec![Paragraph::from_texts(["Foot {{A}}"])],
            }],
        };

        let stats = merge_document(&mut doc, &map_of(&[("{{A}}", "x")]), &NullRenderer);

        assert_eq!(doc.paragraphs[0].text(), "Body x");
        // Plain cell mode replaces every occurrence and collapses runs.
        assert_eq!(doc.tables[0].rows[0].cells[0].text(), "x x");
        assert_eq!(doc.tables[0].rows[0].cells[0].paragraphs[0].runs.len(), 1);
        assert_eq!(doc.tables[0].rows[0].cells[1].text(), "untouched");
        assert_eq!(doc.sections[0].header[0].text(), "Head x");
        assert_eq!(doc.sections[0].footer[0].text(), "Foot x");

        assert_eq!(stats.paragraphs_scanned, 3);
        assert_eq!(stats.paragraphs_touched, 3);
        assert_eq!(stats.cells_touched, 1);
        assert_eq!(stats.replacements, 3);
    }

    #[test]
    fn test_run_partition_invariant_after_repeated_passes() {
        let mut para = Paragraph::from_texts(["{{A}}-", "{{B", "}}", "-{{C}}"]);
        let map = map_of(&[("{{A}}", "1"), ("{{B}}", "22"), ("{{C}}", "")]);
        for _ in 0..3 {
            substitute_paragraph(&mut para, &map, &NullRenderer, &mut MergeStats::default());
            let concatenated: String = para.runs.iter().map(|r| r.text.as_str()).collect();
            assert_eq!(concatenated, para.text());
        }
        assert_eq!(para.text(), "1-22-");
    }
}
