//! Sentence segmentation of block text.
//!
//! A boundary follows `.`, `!` or `?` (and any closing quotes or brackets
//! right after it) when the next non-space character is an uppercase letter,
//! or when the block ends. Known abbreviations and single-letter initials
//! never end a sentence. Heading blocks are not split: they produce one
//! anchor sentence.

use std::collections::HashSet;

use crate::model::{Block, Sentence};

const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "etc.", "mr.", "mrs.", "ms.", "dr.", "st.", "approx.", "no.", "vs.", "sq.",
    "ft.", "in.", "inc.", "ltd.", "co.", "jr.", "sr.", "est.", "incl.", "min.", "max.", "qty.",
];

/// Options for sentence segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterOptions {
    /// Words that end in a period without ending the sentence
    pub abbreviations: Vec<String>,
}

impl SegmenterOptions {
    /// Create options with the default abbreviation list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an abbreviation (`"approx."` or `"approx"`).
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviations.push(abbreviation.into());
        self
    }

    /// Replace the abbreviation list.
    pub fn with_abbreviations<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abbreviations = abbreviations.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Splits blocks into sentences.
#[derive(Debug, Clone)]
pub struct Segmenter {
    abbreviations: HashSet<String>,
}

impl Segmenter {
    /// Create a segmenter.
    pub fn new(options: &SegmenterOptions) -> Self {
        let abbreviations = options
            .abbreviations
            .iter()
            .map(|a| a.trim().trim_end_matches('.').to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        Self { abbreviations }
    }

    /// Lazily split a block into sentences.
    pub fn segment<'a>(&'a self, block: &'a Block) -> Sentences<'a> {
        Sentences {
            segmenter: self,
            block,
            pos: 0,
            order: 0,
            done: false,
        }
    }

    /// Whether the word ending just before a period suppresses the split.
    fn is_abbreviation(&self, word: &str) -> bool {
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        let mut chars = word.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return c.is_alphabetic();
        }
        !word.is_empty() && self.abbreviations.contains(&word.to_lowercase())
    }

    /// Byte offset just past the end of the sentence starting at `start`.
    fn sentence_end(&self, text: &str, start: usize) -> usize {
        for (offset, c) in text[start..].char_indices() {
            let i = start + offset;
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }

            let mut end = i + c.len_utf8();
            for next in text[end..].chars() {
                if matches!(next, '.' | '!' | '?') || is_closing(next) {
                    end += next.len_utf8();
                } else {
                    break;
                }
            }

            let rest = &text[end..];
            let after_space = rest.trim_start();
            if after_space.is_empty() {
                return text.len();
            }
            if after_space.len() == rest.len() {
                // No whitespace after the punctuation (decimals, URLs).
                continue;
            }
            let starts_upper = after_space.chars().next().is_some_and(char::is_uppercase);
            if !starts_upper {
                continue;
            }
            if c == '.' && end == i + 1 {
                let word_start = text[start..i]
                    .char_indices()
                    .rev()
                    .find(|(_, c)| c.is_whitespace())
                    .map_or(start, |(j, ws)| start + j + ws.len_utf8());
                if self.is_abbreviation(&text[word_start..i]) {
                    continue;
                }
            }
            return end;
        }
        text.len()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(&SegmenterOptions::default())
    }
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '}' | '\u{201D}' | '\u{2019}' | '\u{00BB}')
}

/// Lazy iterator over the sentences of one block.
pub struct Sentences<'a> {
    segmenter: &'a Segmenter,
    block: &'a Block,
    pos: usize,
    order: usize,
    done: bool,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = Sentence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let text = self.block.text.as_str();

        if self.block.is_heading() {
            self.done = true;
            return (!self.block.is_empty()).then(|| Sentence::anchor(self.block));
        }

        let skipped = text[self.pos..].len() - text[self.pos..].trim_start().len();
        let start = self.pos + skipped;
        if start >= text.len() {
            self.done = true;
            return None;
        }

        let end = self.segmenter.sentence_end(text, start);
        let trimmed_end = start + text[start..end].trim_end().len();
        self.pos = end;

        let sentence = Sentence::new(self.block, start..trimmed_end, self.order);
        self.order += 1;
        Some(sentence)
    }
}
