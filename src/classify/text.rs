//! Small text utilities shared by the classification rules.

use std::collections::HashSet;

/// Words of `text` with their byte offsets.
///
/// A word is a maximal run of alphanumeric characters, allowing inner
/// apostrophes (`owner's`).
pub(crate) fn word_spans(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let inner_apostrophe = matches!(c, '\'' | '\u{2019}')
            && start.is_some()
            && chars.peek().is_some_and(|(_, n)| n.is_alphanumeric());
        if c.is_alphanumeric() || inner_apostrophe {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            spans.push((s, &text[s..i]));
        }
    }
    if let Some(s) = start {
        spans.push((s, &text[s..]));
    }
    spans
}

/// Byte offset of the first `,` or `;` that separates clauses.
///
/// A comma between two digits groups thousands and is skipped.
pub(crate) fn clause_separator(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    text.char_indices()
        .find(|&(i, c)| match c {
            ';' => true,
            ',' => {
                let before = i.checked_sub(1).map(|p| bytes[p]);
                let after = bytes.get(i + 1).copied();
                !(before.is_some_and(|b| b.is_ascii_digit())
                    && after.is_some_and(|b| b.is_ascii_digit()))
            }
            _ => false,
        })
        .map(|(i, _)| i)
}

/// Uppercase the first character.
pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title-case each whitespace-separated word.
///
/// Words found in `acronyms` (uppercase, ignoring surrounding punctuation)
/// are written in capitals instead.
pub(crate) fn title_case(text: &str, acronyms: &HashSet<String>) -> String {
    text.split_whitespace()
        .map(|word| {
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            if !core.is_empty() && acronyms.contains(&core.to_uppercase()) {
                word.to_uppercase()
            } else {
                capitalize_first(&word.to_lowercase())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip list numbering (`1.`, `2.3`, `(a)`, `IV.`, bullets) from the start.
pub(crate) fn strip_list_marker(text: &str) -> &str {
    let text = text.trim_start();
    let Some((marker, rest)) = text.split_once(char::is_whitespace) else {
        return if is_list_marker(text) { "" } else { text };
    };
    if is_list_marker(marker) {
        rest.trim_start()
    } else {
        text
    }
}

fn is_list_marker(token: &str) -> bool {
    if matches!(token, "-" | "*" | "\u{2022}" | "\u{2013}" | "\u{2014}" | "\u{25AA}") {
        return true;
    }
    let closed = token.ends_with(['.', ')', ':']);
    let core = token
        .trim_start_matches('(')
        .trim_end_matches(['.', ')', ':']);
    if core.is_empty() {
        return false;
    }
    if core.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return core.chars().any(|c| c.is_ascii_digit());
    }
    let mut chars = core.chars();
    let single_letter = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic());
    closed && (single_letter || is_roman_numeral(core))
}

/// Largest roman numeral accepted as a list marker.
const MAX_ROMAN_MARKER: usize = 39;

/// `iv`, `XII`, `xxxix`: canonical numerals from 1 to [`MAX_ROMAN_MARKER`].
fn is_roman_numeral(token: &str) -> bool {
    const ONES: [&str; 10] = ["", "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix"];
    let lower = token.to_ascii_lowercase();
    (1..=MAX_ROMAN_MARKER).any(|n| {
        let tens = "x".repeat(n / 10);
        lower.strip_prefix(tens.as_str()) == Some(ONES[n % 10])
    })
}

/// Find `phrase` in `haystack` at word boundaries, ASCII case-insensitively.
///
/// With `allow_plural` a trailing `s` or `es` still counts as a match.
/// Returns the byte offset of the match.
pub(crate) fn find_phrase(haystack: &str, phrase: &str, allow_plural: bool) -> Option<usize> {
    let hay = haystack.to_ascii_lowercase();
    let needle = phrase.to_ascii_lowercase();
    if needle.is_empty() {
        return None;
    }
    let is_word = |c: char| c.is_alphanumeric();

    let mut from = 0;
    while let Some(found) = hay[from..].find(&needle) {
        let start = from + found;
        let mut end = start + needle.len();
        let boundary_before = hay[..start].chars().next_back().map_or(true, |c| !is_word(c));
        if allow_plural {
            if hay[end..].starts_with("es") && !hay[end + 2..].starts_with(is_word) {
                end += 2;
            } else if hay[end..].starts_with('s') {
                end += 1;
            }
        }
        let boundary_after = hay[end..].chars().next().map_or(true, |c| !is_word(c));
        if boundary_before && boundary_after {
            return Some(start);
        }
        from = start + hay[start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}
