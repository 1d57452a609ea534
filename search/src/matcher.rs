use crate::heading::Heading;
use docshelf_catalog::Category;
use serde::Serialize;
use std::collections::HashMap;

/// A category that matched a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub category: Category,
    /// The title or the description contains the query. Heading hits never
    /// set this.
    pub title_match: bool,
    /// Matching headings, in document order.
    pub heading_matches: Vec<Heading>,
}

/// Case-insensitive substring match over title, description and headings.
///
/// `headings` is keyed by category id. Results keep the order of
/// `categories`. A blank query matches nothing; callers show the unfiltered
/// list in that case. Otherwise the query is matched as typed, surrounding
/// whitespace included.
pub fn match_query<'a, I>(
    query: &str,
    categories: I,
    headings: &HashMap<String, Vec<Heading>>,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a Category>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    categories
        .into_iter()
        .filter_map(|category| {
            let title_match = contains(&category.title) || contains(&category.description);
            let heading_matches: Vec<Heading> = headings
                .get(&category.id)
                .into_iter()
                .flatten()
                .filter(|heading| contains(&heading.text))
                .cloned()
                .collect();
            if !title_match && heading_matches.is_empty() {
                return None;
            }
            Some(SearchResult {
                category: category.clone(),
                title_match,
                heading_matches,
            })
        })
        .collect()
}
