//! Currency amount recognition.

use std::ops::Range;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::model::Amount;

use super::Vocabulary;

const NUMBER: &str = r"(?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]+)?";
const THOUSAND: u64 = 1000;

/// A currency amount found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyMatch {
    /// Parsed amount
    pub amount: Amount,
    /// Byte range of the whole token, symbol or word included
    pub range: Range<usize>,
}

/// Finds currency-formatted amounts: `$5,000`, `€ 1200.50`, `$15k`,
/// `2,500 USD`, `5 grand`.
#[derive(Debug, Clone)]
pub struct CurrencyMatcher {
    regex: Option<Regex>,
    thousand_words: Vec<String>,
}

impl CurrencyMatcher {
    /// Build a matcher from the vocabulary's symbols and words.
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let symbols = alternation(&vocabulary.currency_symbols);
        let suffix_words: Vec<String> = vocabulary
            .currency_words
            .iter()
            .chain(&vocabulary.thousand_words)
            .cloned()
            .collect();
        let words = alternation(&suffix_words);

        let mut branches = Vec::new();
        if let Some(symbols) = symbols {
            branches.push(format!(
                r"(?:{symbols})\s?(?P<sym_num>{NUMBER})(?P<sym_k>k)?\b"
            ));
        }
        if let Some(words) = words {
            branches.push(format!(
                r"\b(?P<word_num>{NUMBER})(?P<word_k>k)?\s*(?P<word>{words})\b"
            ));
        }

        let regex = if branches.is_empty() {
            None
        } else {
            let pattern = format!("(?i){}", branches.join("|"));
            Some(Regex::new(&pattern).map_err(|e| Error::Config(e.to_string()))?)
        };

        Ok(Self {
            regex,
            thousand_words: vocabulary
                .thousand_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        })
    }

    /// The first amount in `text` by position.
    pub fn find(&self, text: &str) -> Option<CurrencyMatch> {
        self.find_all(text).into_iter().next()
    }

    /// Every amount in `text`, in order. Tokens that overflow are skipped.
    pub fn find_all(&self, text: &str) -> Vec<CurrencyMatch> {
        let Some(regex) = &self.regex else {
            return Vec::new();
        };
        regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let amount = self.amount(&caps)?;
                Some(CurrencyMatch {
                    amount,
                    range: whole.range(),
                })
            })
            .collect()
    }

    /// Check if `text` contains a currency amount.
    pub fn contains(&self, text: &str) -> bool {
        !self.find_all(text).is_empty()
    }

    fn amount(&self, caps: &Captures<'_>) -> Option<Amount> {
        let (number, k, word) = match caps.name("sym_num") {
            Some(n) => (n, caps.name("sym_k"), None),
            None => (caps.name("word_num")?, caps.name("word_k"), caps.name("word")),
        };

        let mut amount = Amount::parse(number.as_str())?;
        if k.is_some() {
            amount = amount.checked_mul(THOUSAND)?;
        }
        let is_thousand_word = word.is_some_and(|w| {
            self.thousand_words
                .iter()
                .any(|t| t.eq_ignore_ascii_case(w.as_str()))
        });
        if is_thousand_word {
            amount = amount.checked_mul(THOUSAND)?;
        }
        Some(amount)
    }
}

/// Escaped alternation, longest first so `euros` wins over `euro`.
fn alternation(items: &[String]) -> Option<String> {
    let mut items: Vec<&str> = items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return None;
    }
    items.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    items.dedup();
    Some(
        items
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> CurrencyMatcher {
        CurrencyMatcher::new(&Vocabulary::default()).unwrap()
    }

    fn first(text: &str) -> Option<u64> {
        matcher().find(text).map(|m| m.amount.cents())
    }

    #[test]
    fn test_symbol_amounts() {
        assert_eq!(first("Install new cabinets for $5000."), Some(500_000));
        assert_eq!(first("Costs $5,000 total"), Some(500_000));
        assert_eq!(first("Budget € 1200.50 approx"), Some(120_050));
        assert_eq!(first("Roughly $15k for the roof"), Some(1_500_000));
        assert_eq!(first("About £2.5K"), Some(250_000));
        assert_eq!(first("Fee $99.999"), Some(10_000));
    }

    #[test]
    fn test_word_amounts() {
        assert_eq!(first("Spend 5000 dollars on tile"), Some(500_000));
        assert_eq!(first("Spend 2,500 USD on tile"), Some(250_000));
        assert_eq!(first("Maybe 5 grand for paint"), Some(500_000));
        assert_eq!(first("About 3k bucks"), Some(300_000));
    }

    #[test]
    fn test_first_by_position() {
        let m = matcher().find("Tile for 800 dollars, then $1,200 for grout").unwrap();
        assert_eq!(m.amount, Amount::from_cents(80_000));
        assert_eq!(m.range, 9..20);
    }

    #[test]
    fn test_plain_numbers_are_not_currency() {
        assert_eq!(first("Install 3 outlets in room 12"), None);
        assert_eq!(first("Call 555-1234"), None);
        assert!(!matcher().contains("Replace 20 tiles"));
    }

    #[test]
    fn test_empty_vocabulary() {
        let vocabulary = Vocabulary {
            currency_symbols: Vec::new(),
            currency_words: Vec::new(),
            thousand_words: Vec::new(),
            ..Vocabulary::default()
        };
        let matcher = CurrencyMatcher::new(&vocabulary).unwrap();
        assert!(matcher.find("$5000").is_none());
    }
}
