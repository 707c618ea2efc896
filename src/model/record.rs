//! Task records and money amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned when no heading anchor or keyword applies.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A non-negative money amount with exact cent precision.
///
/// Stored as whole cents so sums are exact and amounts can be compared and
/// hashed. Serializes as a JSON number (`5000.5`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "f64", try_from = "f64")]
pub struct Amount {
    cents: u64,
}

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount { cents: 0 };

    /// Create an amount from whole cents.
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Create an amount from whole currency units, `None` on overflow.
    pub fn from_units(units: u64) -> Option<Self> {
        units.checked_mul(100).map(Self::from_cents)
    }

    /// Parse a decimal number such as `1,234.56`.
    ///
    /// Grouping commas are ignored; digits past the second decimal place are
    /// rounded half-up. Returns `None` for malformed input or overflow.
    pub fn parse(s: &str) -> Option<Self> {
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();
        let (int_part, frac_part) = match cleaned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (cleaned.as_str(), ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let units: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };

        let digits: Vec<u64> = frac_part.bytes().map(|b| u64::from(b - b'0')).collect();
        let digit = |i: usize| digits.get(i).copied().unwrap_or(0);
        let mut cents = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        units.checked_mul(100)?.checked_add(cents).map(Self::from_cents)
    }

    /// Whole cents.
    pub fn cents(&self) -> u64 {
        self.cents
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Add two amounts, `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.cents.checked_add(other.cents).map(Self::from_cents)
    }

    /// Multiply by an integer factor, `None` on overflow.
    pub fn checked_mul(self, factor: u64) -> Option<Amount> {
        self.cents.checked_mul(factor).map(Self::from_cents)
    }

    /// Sum amounts, `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    /// Lossy conversion to a float.
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.as_f64()
    }
}

impl TryFrom<f64> for Amount {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("amount must be a non-negative number, got {}", value));
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(format!("amount {} is too large", value));
        }
        Ok(Self::from_cents(cents as u64))
    }
}

/// One scope-of-work task extracted from a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Category (heading anchor, title-cased); never empty
    pub category: String,

    /// The source sentence, verbatim
    pub description: String,

    /// First currency amount in the sentence, zero when absent
    pub budget: Amount,

    /// Normalized restatement of the task
    pub proposed: String,

    /// Clause after the first comma or semicolon
    pub comment: String,

    /// Drawing / plan reference
    pub drawing_ref: String,

    /// Responsible party
    pub lead: String,
}

impl TaskRecord {
    /// Create a record with the given category and description.
    ///
    /// A blank category becomes [`UNCATEGORIZED`].
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        let category = category.into();
        let category = if category.trim().is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            category
        };
        Self {
            category,
            description: description.into(),
            budget: Amount::ZERO,
            proposed: String::new(),
            comment: String::new(),
            drawing_ref: String::new(),
            lead: String::new(),
        }
    }

    /// Set the budget.
    pub fn with_budget(mut self, budget: Amount) -> Self {
        self.budget = budget;
        self
    }

    /// Set the proposed restatement.
    pub fn with_proposed(mut self, proposed: impl Into<String>) -> Self {
        self.proposed = proposed.into();
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set the drawing reference.
    pub fn with_drawing_ref(mut self, drawing_ref: impl Into<String>) -> Self {
        self.drawing_ref = drawing_ref.into();
        self
    }

    /// Set the lead.
    pub fn with_lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = lead.into();
        self
    }

    /// Identity used for deduplication: category, description and budget.
    pub fn dedup_key(&self) -> (&str, &str, Amount) {
        (&self.category, &self.description, self.budget)
    }

    /// Check if this record fell back to the default category.
    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parse() {
        assert_eq!(Amount::parse("5000"), Some(Amount::from_cents(500_000)));
        assert_eq!(Amount::parse("1,234.5"), Some(Amount::from_cents(123_450)));
        assert_eq!(Amount::parse("12.345"), Some(Amount::from_cents(1_235)));
        assert_eq!(Amount::parse(".5"), Some(Amount::from_cents(50)));
        assert_eq!(Amount::parse(""), None);
        assert_eq!(Amount::parse("12a"), None);
        assert_eq!(Amount::parse("99999999999999999999"), None);
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_cents(500_000).to_string(), "5000.00");
        assert_eq!(Amount::from_cents(7).to_string(), "0.07");
    }

    #[test]
    fn test_amount_checked_sum() {
        let total = Amount::checked_sum([Amount::from_cents(1), Amount::from_cents(2)]);
        assert_eq!(total, Some(Amount::from_cents(3)));
        let overflow = Amount::checked_sum([Amount::from_cents(u64::MAX), Amount::from_cents(1)]);
        assert_eq!(overflow, None);
    }

    #[test]
    fn test_amount_serde() {
        let json = serde_json::to_string(&Amount::from_cents(250_050)).unwrap();
        assert_eq!(json, "2500.5");
        let back: Amount = serde_json::from_str("2500.5").unwrap();
        assert_eq!(back, Amount::from_cents(250_050));
        assert!(serde_json::from_str::<Amount>("-1").is_err());
    }

    #[test]
    fn test_record_default_category() {
        let record = TaskRecord::new("  ", "Install sink.");
        assert_eq!(record.category, UNCATEGORIZED);
        assert!(record.is_uncategorized());
        assert_eq!(record.budget, Amount::ZERO);
    }

    #[test]
    fn test_record_builder() {
        let record = TaskRecord::new("Kitchen", "Install new cabinets for $5000.")
            .with_budget(Amount::from_cents(500_000))
            .with_lead("Contractor");
        assert_eq!(
            record.dedup_key(),
            (
                "Kitchen",
                "Install new cabinets for $5000.",
                Amount::from_cents(500_000)
            )
        );
        assert_eq!(record.lead, "Contractor");
    }
}
