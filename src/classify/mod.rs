//! Task classification.
//!
//! A [`Classifier`] looks at one sentence plus the nearest preceding heading
//! anchor and returns zero or one [`TaskRecord`]. [`RuleClassifier`] is the
//! shipped implementation; anything implementing the trait can replace it in
//! the [`Pipeline`](crate::Pipeline).

mod currency;
mod rules;
mod text;
mod vocabulary;

pub use currency::{CurrencyMatch, CurrencyMatcher};
pub use rules::RuleClassifier;
pub use vocabulary::{CategoryKeywords, LeadPhrase, Vocabulary};

use crate::model::{Sentence, TaskRecord};

/// Turns sentences into task records.
///
/// Implementations must be deterministic: the same sentence text and anchor
/// text always give the same result.
pub trait Classifier: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Classify a sentence under the current category anchor.
    ///
    /// Returns `None` for sentences that are not tasks, including anchors.
    fn classify(&self, sentence: &Sentence<'_>, anchor: Option<&Sentence<'_>>)
        -> Option<TaskRecord>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn classify(
        &self,
        sentence: &Sentence<'_>,
        anchor: Option<&Sentence<'_>>,
    ) -> Option<TaskRecord> {
        (**self).classify(sentence, anchor)
    }
}
