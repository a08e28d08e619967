//! Snippet extraction (spec §4.7): find the first substring match of the
//! full query (case-folded); if absent, fall back to the first match of
//! any whitespace-delimited token. Center a ~200-character window on the
//! match, collapse whitespace, and bracket with ellipses wherever the
//! window is truncated relative to the full content.

const WINDOW: usize = 200;

pub fn build_snippet(content: &str, query: &str) -> String {
    let collapsed = collapse_whitespace(content);
    let chars: Vec<char> = collapsed.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let match_idx = find_match_char_index(&collapsed, query).unwrap_or(0);
    let half = WINDOW / 2;
    let start = match_idx.saturating_sub(half);
    let end = (match_idx + half).min(chars.len());

    let mut snippet: String = chars[start..end].iter().collect();
    if start > 0 {
        snippet = format!("...{snippet}");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn find_match_char_index(collapsed: &str, query: &str) -> Option<usize> {
    let lower_query = query.to_lowercase();
    if lower_query.trim().is_empty() {
        return None;
    }
    let lower_haystack = collapsed.to_lowercase();

    if let Some(byte_idx) = lower_haystack.find(&lower_query) {
        return Some(lower_haystack[..byte_idx].chars().count());
    }
    for token in lower_query.split_whitespace() {
        if let Some(byte_idx) = lower_haystack.find(token) {
            return Some(lower_haystack[..byte_idx].chars().count());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_on_first_full_query_match() {
        let content = "lorem ipsum dolor sit amet, the target phrase sits here, consectetur adipiscing elit";
        let snippet = build_snippet(content, "target phrase");
        assert!(snippet.contains("target phrase"));
        assert!(snippet.starts_with("..."));
    }

    #[test]
    fn falls_back_to_a_single_token_when_the_full_query_is_absent() {
        let content = "some words before the needle appears in a longer sentence of text";
        let snippet = build_snippet(content, "needle missing-phrase");
        assert!(snippet.contains("needle"));
    }

    #[test]
    fn short_content_is_returned_without_ellipses() {
        let snippet = build_snippet("short text with query inside", "query");
        assert_eq!(snippet, "short text with query inside");
    }
}
