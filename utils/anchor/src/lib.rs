//! Anchor identifiers for document headings.
//!
//! Heading extraction and Markdown rendering both derive the in-page fragment
//! for a heading from its text. They must agree byte for byte, so the
//! derivation lives here and nowhere else.

/// First and last code points of the CJK unified ideograph block kept in anchors.
const CJK_START: char = '\u{4e00}';
const CJK_END: char = '\u{9fa5}';

/// Derive the anchor id for a heading.
///
/// The text is lowercased, whitespace runs become a single `-`, everything
/// outside ASCII alphanumerics, CJK ideographs and `-` is dropped, repeated
/// hyphens collapse and leading/trailing hyphens are trimmed.
///
/// ```
/// use docshelf_utils_anchor::anchor_id;
///
/// assert_eq!(anchor_id("Oil Change"), "oil-change");
/// assert_eq!(anchor_id("  Step 2: Drain -- the  sump! "), "step-2-drain-the-sump");
/// ```
pub fn anchor_id(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                push_hyphen(&mut out);
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch == '-' {
            push_hyphen(&mut out);
        } else if is_anchor_char(ch) {
            out.push(ch);
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Fragment form of [`anchor_id`], ready to append to a document href.
pub fn fragment(text: &str) -> String {
    format!("#{}", anchor_id(text))
}

fn is_anchor_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || (CJK_START..=CJK_END).contains(&ch)
}

// Collapses runs and never emits a leading hyphen.
fn push_hyphen(out: &mut String) {
    if !out.is_empty() && !out.ends_with('-') {
        out.push('-');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(anchor_id("Engine Maintenance"), "engine-maintenance");
    }

    #[test]
    fn drops_punctuation_and_underscores() {
        assert_eq!(anchor_id("Q&A: what's new?"), "qa-whats-new");
        assert_eq!(anchor_id("snake_case_name"), "snakecasename");
    }

    #[test]
    fn keeps_cjk_ideographs() {
        assert_eq!(anchor_id("安全 须知"), "安全-须知");
        assert_eq!(anchor_id("第1章 概述"), "第1章-概述");
    }

    #[test]
    fn collapses_and_trims_hyphens() {
        assert_eq!(anchor_id("--a -- b--"), "a-b");
        assert_eq!(anchor_id("a \t\n b"), "a-b");
        assert_eq!(anchor_id("!!!"), "");
    }

    #[test]
    fn removed_characters_between_spaces_do_not_double_hyphens() {
        // "a ! b" -> "a-" + "" + "-b" collapses to a single hyphen.
        assert_eq!(anchor_id("a ! b"), "a-b");
    }

    #[test]
    fn fragment_prefixes_hash() {
        assert_eq!(fragment("Oil Change"), "#oil-change");
    }

    #[test]
    fn is_deterministic() {
        let text = "  Mixed CASE 中文 -- Heading  ";
        assert_eq!(anchor_id(text), anchor_id(text));
    }
}
