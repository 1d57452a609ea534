//! Markdown rendering for document pages.
//!
//! Rendering itself is pulldown-cmark's business. What this crate adds is the
//! anchor on every h1-h3, derived with the same function the heading
//! extractor uses, so table of contents links land where they point.

use docshelf_search::Heading;
use docshelf_search::MAX_HEADING_LEVEL;
use docshelf_search::extract_headings;
use docshelf_utils_anchor::anchor_id;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;
use pulldown_cmark::html;
use serde::Serialize;

/// Characters shown before the full body is rendered.
pub const DEFAULT_PREVIEW_CHARS: usize = 1_000;

/// One line of a table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    /// In-page link, `#anchor`.
    pub href: String,
}

impl From<Heading> for TocEntry {
    fn from(heading: Heading) -> Self {
        Self {
            level: heading.level,
            href: format!("#{}", heading.anchor),
            text: heading.text,
        }
    }
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Render Markdown to HTML, giving h1-h3 an `id` from their text.
pub fn render_html(text: &str) -> String {
    let mut events = Vec::new();
    // Events of the heading being read, with its level.
    let mut heading: Option<(HeadingLevel, Vec<Event<'_>>)> = None;

    for event in Parser::new_ext(text, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) if anchored(level) => {
                heading = Some((level, Vec::new()));
            }
            Event::End(TagEnd::Heading(level)) if heading.is_some() => {
                let inner = heading.take().map(|(_, inner)| inner).unwrap_or_default();
                let anchor = anchor_id(&plain_text(&inner));
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: (!anchor.is_empty()).then(|| CowStr::from(anchor)),
                    classes: Vec::new(),
                    attrs: Vec::new(),
                }));
                events.extend(inner);
                events.push(Event::End(TagEnd::Heading(level)));
            }
            event => match heading.as_mut() {
                Some((_, inner)) => inner.push(event),
                None => events.push(event),
            },
        }
    }

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn anchored(level: HeadingLevel) -> bool {
    matches!(level, HeadingLevel::H1 | HeadingLevel::H2 | HeadingLevel::H3)
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(value) | Event::Code(value) => text.push_str(value),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Headings of levels 1 to `max_level` as linked entries.
pub fn table_of_contents(text: &str, max_level: u8) -> Vec<TocEntry> {
    extract_headings(text, max_level.min(MAX_HEADING_LEVEL))
        .into_iter()
        .map(TocEntry::from)
        .collect()
}

/// Plain-text outline, indented two spaces per level below the first.
pub fn format_toc(entries: &[TocEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        out.push_str(&format!("{indent}- {} ({})\n", entry.text, entry.href));
    }
    out
}

/// The first `chars` characters of `text`, never splitting a character.
pub fn preview(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
