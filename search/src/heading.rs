use docshelf_utils_anchor::anchor_id;
use serde::Serialize;

/// Deepest heading level the extractor recognises (`###`).
pub const MAX_HEADING_LEVEL: u8 = 3;

/// A heading found in a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub anchor: String,
    /// Byte offset of the heading line within the body.
    pub source_offset: usize,
}

/// Extract `#`-style headings up to `max_level`, in document order.
///
/// A heading is a line starting with one to three `#` followed by a space or
/// tab. Lines whose text is empty after trimming are skipped.
pub fn extract_headings(text: &str, max_level: u8) -> Vec<Heading> {
    let max_level = max_level.min(MAX_HEADING_LEVEL);
    let mut headings = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let Some((level, content)) = parse_heading_line(line) else {
            continue;
        };
        if level > max_level || content.is_empty() {
            continue;
        }
        headings.push(Heading {
            level,
            text: content.to_string(),
            anchor: anchor_id(content),
            source_offset: start,
        });
    }
    headings
}

fn parse_heading_line(line: &str) -> Option<(u8, &str)> {
    let line = line.trim_end_matches(['\n', '\r']);
    let markers = line.bytes().take_while(|b| *b == b'#').count();
    if markers == 0 || markers > usize::from(MAX_HEADING_LEVEL) {
        return None;
    }
    let rest = &line[markers..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((markers as u8, strip_closing_sequence(rest.trim())))
}

// "## Title ##" reads as "Title", the same way Markdown renders it.
fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.len() == text.len() {
        return text;
    }
    if without.is_empty() {
        return without;
    }
    if without.ends_with([' ', '\t']) {
        return without.trim_end();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(headings: &[Heading]) -> Vec<(u8, &str)> {
        headings
            .iter()
            .map(|heading| (heading.level, heading.text.as_str()))
            .collect()
    }

    #[test]
    fn extracts_levels_in_document_order() {
        let body = "# Overview\nintro\n## Oil Change\ntext\n### Drain plug\n#### Too deep\n";
        let headings = extract_headings(body, 3);
        assert_eq!(
            summary(&headings),
            vec![(1, "Overview"), (2, "Oil Change"), (3, "Drain plug")]
        );
        assert_eq!(headings[1].anchor, "oil-change");
        assert_eq!(headings[1].source_offset, body.find("## Oil").unwrap());
    }

    #[test]
    fn max_level_restricts_output() {
        let body = "# A\n## B\n### C\n";
        assert_eq!(summary(&extract_headings(body, 2)), vec![(1, "A"), (2, "B")]);
        assert_eq!(summary(&extract_headings(body, 1)), vec![(1, "A")]);
    }

    #[test]
    fn requires_whitespace_after_markers() {
        let body = "#hashtag\n##\n#\ttabbed\n  # indented\n";
        assert_eq!(summary(&extract_headings(body, 3)), vec![(1, "tabbed")]);
    }

    #[test]
    fn skips_empty_heading_text() {
        let body = "#   \n##  \t\n## Real\n";
        assert_eq!(summary(&extract_headings(body, 3)), vec![(2, "Real")]);
    }

    #[test]
    fn trims_text_and_handles_crlf() {
        let body = "##   Spaced out   \r\n## Next\r\n";
        assert_eq!(
            summary(&extract_headings(body, 3)),
            vec![(2, "Spaced out"), (2, "Next")]
        );
    }

    #[test]
    fn strips_closing_hashes() {
        let body = "## Title ##\n## C#\n## ###\n";
        assert_eq!(summary(&extract_headings(body, 3)), vec![(2, "Title"), (2, "C#")]);
    }

    #[test]
    fn extraction_is_repeatable() {
        let body = "# 安全 须知\n## Step 1: Prepare\n";
        assert_eq!(extract_headings(body, 3), extract_headings(body, 3));
        assert_eq!(extract_headings(body, 3)[0].anchor, "安全-须知");
    }

    #[test]
    fn last_line_without_newline_is_scanned() {
        assert_eq!(summary(&extract_headings("text\n# End", 3)), vec![(1, "End")]);
    }
}
