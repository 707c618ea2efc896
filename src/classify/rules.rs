//! Deterministic rule-based task classifier.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Sentence, TaskRecord};

use super::currency::{CurrencyMatch, CurrencyMatcher};
use super::text::{
    capitalize_first, clause_separator, find_phrase, strip_list_marker, title_case, word_spans,
};
use super::{Classifier, Vocabulary};

/// Classifies sentences with vocabulary lookups and a few patterns.
///
/// A sentence is a task when it contains a task verb in any common
/// inflection, or a currency amount. Every field of the resulting record is
/// a pure function of the sentence text and the anchor text.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    vocabulary: Vocabulary,
    verbs: HashSet<String>,
    synonyms: HashMap<String, String>,
    noise: HashSet<String>,
    amount_words: HashSet<String>,
    roles: HashMap<String, String>,
    acronyms: HashSet<String>,
    currency: CurrencyMatcher,
    drawing: Option<Regex>,
}

impl RuleClassifier {
    /// Build a classifier from a vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Result<Self> {
        vocabulary.validate()?;

        let verbs = lower_set(&vocabulary.task_verbs);
        let noise = lower_set(&vocabulary.noise_words);
        let mut amount_words = lower_set(&vocabulary.currency_words);
        amount_words.extend(lower_set(&vocabulary.thousand_words));

        let synonyms = vocabulary
            .verb_synonyms
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
            .collect();
        let roles = vocabulary
            .roles
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.clone()))
            .collect();
        let acronyms = vocabulary
            .acronyms
            .iter()
            .map(|a| a.trim().to_uppercase())
            .collect();

        let currency = CurrencyMatcher::new(&vocabulary)?;
        let drawing = drawing_regex(&vocabulary)?;

        Ok(Self {
            vocabulary,
            verbs,
            synonyms,
            noise,
            amount_words,
            roles,
            acronyms,
            currency,
            drawing,
        })
    }

    /// The vocabulary this classifier was built from.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Check whether a sentence reads as a task.
    pub fn is_task(&self, text: &str) -> bool {
        self.first_verb(text).is_some() || self.currency.contains(text)
    }

    /// Category for a task: cleaned anchor text, else keyword category,
    /// else `Uncategorized` (applied by [`TaskRecord::new`]).
    pub fn category(&self, text: &str, anchor: Option<&str>) -> String {
        if let Some(category) = anchor.and_then(|a| self.category_from_heading(a)) {
            return category;
        }
        self.vocabulary
            .category_keywords
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| find_phrase(text, k, true).is_some()))
            .map(|rule| rule.category.clone())
            .unwrap_or_default()
    }

    /// Cleaned category from heading text; `None` when nothing is left.
    fn category_from_heading(&self, heading: &str) -> Option<String> {
        let cleaned = strip_list_marker(heading.trim())
            .trim_end_matches([':', '.'])
            .trim();
        (!cleaned.is_empty()).then(|| title_case(cleaned, &self.acronyms))
    }

    /// First currency amount, if any.
    pub fn budget(&self, text: &str) -> Option<CurrencyMatch> {
        self.currency.find(text)
    }

    /// Normalized restatement of the main clause.
    pub fn proposed(&self, text: &str) -> String {
        let clause_end = clause_separator(text).unwrap_or(text.len());
        let clause = &text[..clause_end];
        let amounts = self.currency.find_all(clause);

        let words = word_spans(clause);
        let verb_at = words
            .iter()
            .position(|(_, w)| self.base_verb(&w.to_lowercase()).is_some())
            .unwrap_or(0);

        let mut out: Vec<String> = Vec::new();
        for (idx, &(offset, word)) in words.iter().enumerate().skip(verb_at) {
            let in_amount = amounts
                .iter()
                .any(|m| m.range.contains(&offset));
            if in_amount || word.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            let lower = word.to_lowercase();
            if self.noise.contains(&lower) || self.amount_words.contains(&lower) {
                continue;
            }
            if idx == verb_at {
                if let Some(base) = self.base_verb(&lower) {
                    let canonical = self.synonyms.get(base).map_or(base, String::as_str);
                    out.push(canonical.to_string());
                    continue;
                }
            }
            out.push(lower);
        }
        capitalize_first(&out.join(" "))
    }

    /// Clause after the first comma or semicolon.
    pub fn comment(&self, text: &str) -> String {
        clause_separator(text)
            .map(|i| text[i + 1..].trim().to_string())
            .unwrap_or_default()
    }

    /// Drawing or plan reference, capitalised.
    pub fn drawing_ref(&self, text: &str) -> String {
        let Some(caps) = self.drawing.as_ref().and_then(|re| re.captures(text)) else {
            return String::new();
        };
        let mut parts: Vec<String> = Vec::new();
        if let Some(q) = caps.name("qualifier") {
            parts.push(q.as_str().to_lowercase());
        }
        if let Some(m) = caps.name("marker") {
            parts.push(m.as_str().to_lowercase());
        }
        if let Some(id) = caps.name("id") {
            let id = id.as_str().trim_end_matches(['.', '-', '/']);
            if id.chars().any(|c| c.is_ascii_digit()) {
                parts.push(id.to_string());
            }
        }
        capitalize_first(&parts.join(" "))
    }

    /// Responsible party: earliest role or named lead, else a lead phrase.
    pub fn lead(&self, text: &str) -> String {
        let by_word = word_spans(text).into_iter().find_map(|(_, word)| {
            if self.vocabulary.named_leads.iter().any(|n| n == word) {
                return Some(word.to_string());
            }
            let lower = word.to_lowercase();
            let singular = lower.strip_suffix('s').unwrap_or(&lower);
            self.roles
                .get(&lower)
                .or_else(|| self.roles.get(singular))
                .cloned()
        });
        if let Some(lead) = by_word {
            return lead;
        }
        self.vocabulary
            .lead_phrases
            .iter()
            .find(|p| find_phrase(text, p.phrase.trim(), false).is_some())
            .map(|p| p.lead.clone())
            .unwrap_or_default()
    }

    fn first_verb(&self, text: &str) -> Option<&str> {
        word_spans(text)
            .into_iter()
            .find_map(|(_, w)| self.base_verb(&w.to_lowercase()))
    }

    /// Vocabulary verb a word inflects, e.g. `replacing` → `replace`.
    fn base_verb(&self, word: &str) -> Option<&str> {
        verb_candidates(word)
            .into_iter()
            .find_map(|c| self.verbs.get(&c).map(String::as_str))
    }
}

impl Classifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    fn classify(&self, sentence: &Sentence<'_>, anchor: Option<&Sentence<'_>>) -> Option<TaskRecord> {
        if sentence.is_anchor {
            return None;
        }
        let text = sentence.text.trim();
        if text.is_empty() || !self.is_task(text) {
            return None;
        }

        let category = self.category(text, anchor.map(|a| a.text));
        let mut record = TaskRecord::new(category, text)
            .with_proposed(self.proposed(text))
            .with_comment(self.comment(text))
            .with_drawing_ref(self.drawing_ref(text))
            .with_lead(self.lead(text));
        if let Some(found) = self.budget(text) {
            record = record.with_budget(found.amount);
        }
        Some(record)
    }
}

fn lower_set(list: &[String]) -> HashSet<String> {
    list.iter().map(|w| w.trim().to_lowercase()).collect()
}

/// Escaped alternatives, longest first.
fn escaped_alternatives(list: &[String]) -> Vec<String> {
    let mut items: Vec<String> = list
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    items.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    items
}

/// Possible base forms of an inflected word, most literal first.
fn verb_candidates(word: &str) -> Vec<String> {
    let mut candidates = vec![word.to_string()];
    let mut push_stem = |stem: &str| {
        if stem.len() >= 2 {
            candidates.push(stem.to_string());
            candidates.push(format!("{}e", stem));
            // scrapped → scrap
            let mut tail = stem.chars().rev();
            if let (Some(a), Some(b)) = (tail.next(), tail.next()) {
                if a == b && a.is_ascii_alphabetic() && stem.len() >= 3 {
                    candidates.push(stem[..stem.len() - 1].to_string());
                }
            }
        }
    };

    for suffix in ["ing", "ed"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            push_stem(stem);
        }
    }
    if let Some(stem) = word.strip_suffix("ied") {
        candidates.push(format!("{}y", stem));
    }
    if let Some(stem) = word.strip_suffix("ies") {
        candidates.push(format!("{}y", stem));
    }
    for suffix in ["es", "s", "d"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            candidates.push(stem.to_string());
        }
    }
    candidates
}

fn drawing_regex(vocabulary: &Vocabulary) -> Result<Option<Regex>> {
    let markers = escaped_alternatives(&vocabulary.drawing_markers);
    if markers.is_empty() {
        return Ok(None);
    }
    let qualifiers = escaped_alternatives(&vocabulary.drawing_qualifiers);
    let qualifier = if qualifiers.is_empty() {
        String::new()
    } else {
        format!(r"(?:(?P<qualifier>{})\s+)?", qualifiers.join("|"))
    };
    let pattern = format!(
        r"(?i)\b{}(?P<marker>(?:{})s?)\b(?:\s+(?P<id>#?[a-z0-9][a-z0-9./-]*))?",
        qualifier,
        markers.join("|")
    );
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| Error::Config(e.to_string()))
}
