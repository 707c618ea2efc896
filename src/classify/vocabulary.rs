//! Word lists driving the rule classifier.
//!
//! Vocabularies are plain data: they serialize to and from TOML so a
//! deployment can tune the rules without rebuilding. Missing keys in a TOML
//! file fall back to the built-in lists.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A lead phrase and the party it designates (`"you will"` → `Contractor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPhrase {
    /// Words matched case-insensitively at word boundaries
    pub phrase: String,

    /// Lead label written when the phrase occurs
    pub lead: String,
}

impl LeadPhrase {
    /// Map `phrase` to `lead`.
    pub fn new(phrase: impl Into<String>, lead: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            lead: lead.into(),
        }
    }
}

/// Category inferred from keywords when a task has no heading anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    /// Category name used as written
    pub category: String,

    /// Keywords matched at word boundaries, plurals included
    pub keywords: Vec<String>,
}

impl CategoryKeywords {
    /// Assign `category` to tasks mentioning any of `keywords`.
    pub fn new<I, S>(category: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Classifier vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Base forms of verbs that mark a sentence as a task
    pub task_verbs: Vec<String>,

    /// Currency symbols written before an amount
    pub currency_symbols: Vec<String>,

    /// Currency words written after an amount
    pub currency_words: Vec<String>,

    /// Words meaning "thousand" after an amount (`5 grand`)
    pub thousand_words: Vec<String>,

    /// Words dropped from the proposed restatement
    pub noise_words: Vec<String>,

    /// Drawing reference markers
    pub drawing_markers: Vec<String>,

    /// Words that may precede a drawing marker (`floor plan`)
    pub drawing_qualifiers: Vec<String>,

    /// Case-sensitive personal names recognised as leads
    pub named_leads: Vec<String>,

    /// Words kept in capitals when a heading becomes a category
    pub acronyms: Vec<String>,

    /// Verb base form → canonical verb in the proposed restatement
    pub verb_synonyms: BTreeMap<String, String>,

    /// Role word → lead label
    pub roles: BTreeMap<String, String>,

    /// Lead phrases, checked in order when no role or name occurs
    pub lead_phrases: Vec<LeadPhrase>,

    /// Keyword categories, checked in order for tasks without an anchor
    pub category_keywords: Vec<CategoryKeywords>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn pairs(list: &[(&str, &str)]) -> BTreeMap<String, String> {
    list.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            task_verbs: words(&[
                "install", "replace", "upgrade", "repair", "supply", "add", "remove", "tear",
                "demo", "demolish", "refinish", "fix", "update", "modernize", "renovate",
                "remodel", "paint", "build", "patch", "seal", "relocate",
            ]),
            currency_symbols: words(&["$", "€", "£"]),
            currency_words: words(&[
                "dollars", "dollar", "usd", "bucks", "eur", "euro", "euros", "gbp", "pounds",
            ]),
            thousand_words: words(&["grand"]),
            noise_words: words(&[
                "a", "an", "the", "for", "please", "also", "just", "really", "basically",
                "probably", "maybe", "about", "around", "approximately", "roughly", "approx",
                "some", "like", "um", "uh",
            ]),
            drawing_markers: words(&["drawing", "plan", "sketch", "elevation"]),
            drawing_qualifiers: words(&[
                "floor", "site", "architectural", "electrical", "plumbing", "framing",
                "reflected", "ceiling", "front", "rear", "side", "design", "riser",
            ]),
            named_leads: Vec::new(),
            acronyms: words(&[
                "HVAC", "AC", "MEP", "GFCI", "AFCI", "LED", "ADA", "PVC", "CPVC", "PEX", "MDF",
                "EV", "DIY", "USB",
            ]),
            verb_synonyms: pairs(&[("fix", "repair"), ("tear", "demolish"), ("demo", "demolish")]),
            roles: pairs(&[
                ("contractor", "Contractor"),
                ("electrician", "Electrician"),
                ("plumber", "Plumber"),
                ("carpenter", "Carpenter"),
                ("painter", "Painter"),
                ("tiler", "Tiler"),
                ("roofer", "Roofer"),
                ("designer", "Designer"),
                ("architect", "Architect"),
                ("engineer", "Engineer"),
                ("client", "Client"),
                ("owner", "Client"),
                ("homeowner", "Client"),
            ]),
            lead_phrases: vec![
                LeadPhrase::new("you will", "Contractor"),
                LeadPhrase::new("you can", "Contractor"),
                LeadPhrase::new("you should", "Contractor"),
                LeadPhrase::new("we will", "Team"),
                LeadPhrase::new("we can", "Team"),
                LeadPhrase::new("we need", "Team"),
                LeadPhrase::new("we should", "Team"),
            ],
            category_keywords: Vec::new(),
        }
    }
}

impl Vocabulary {
    /// Built-in vocabulary without keyword categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in vocabulary plus home-renovation keyword categories.
    pub fn renovation() -> Self {
        Self {
            category_keywords: vec![
                CategoryKeywords::new(
                    "Kitchen",
                    ["kitchen", "cabinet", "countertop", "backsplash", "dishwasher", "sink"],
                ),
                CategoryKeywords::new(
                    "Bathroom",
                    ["bathroom", "bathtub", "shower", "vanity", "mirror", "toilet", "bath"],
                ),
                CategoryKeywords::new(
                    "HVAC",
                    ["hvac", "air conditioning", "duct", "heating", "cooling", "ventilation"],
                ),
                CategoryKeywords::new(
                    "Electrical",
                    ["electrical", "panel", "circuit", "wiring", "outlet", "switch", "breaker"],
                ),
                CategoryKeywords::new("Plumbing", ["plumbing", "pipe", "riser", "water", "drain"]),
                CategoryKeywords::new(
                    "Flooring",
                    ["floor", "flooring", "hardwood", "carpet", "laminate", "vinyl"],
                ),
                CategoryKeywords::new(
                    "Appliances",
                    ["washer", "dryer", "appliance", "refrigerator", "stove", "oven"],
                ),
                CategoryKeywords::new(
                    "Lighting",
                    ["lighting", "fixture", "lamp", "chandelier", "light"],
                ),
                CategoryKeywords::new("Doors & Windows", ["door", "window", "frame", "glass"]),
                CategoryKeywords::new("Tiling", ["tile", "tiling", "grout", "ceramic", "porcelain"]),
                CategoryKeywords::new(
                    "Demo & Construction",
                    ["demo", "demolish", "demolition", "tear", "remove"],
                ),
            ],
            ..Self::default()
        }
    }

    /// Parse a vocabulary from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let vocabulary: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Load a vocabulary from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), config_message(e))))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Reject blank entries, which would match everywhere.
    pub fn validate(&self) -> Result<()> {
        let lists: [(&str, &[String]); 9] = [
            ("task_verbs", &self.task_verbs),
            ("currency_symbols", &self.currency_symbols),
            ("currency_words", &self.currency_words),
            ("thousand_words", &self.thousand_words),
            ("noise_words", &self.noise_words),
            ("drawing_markers", &self.drawing_markers),
            ("drawing_qualifiers", &self.drawing_qualifiers),
            ("named_leads", &self.named_leads),
            ("acronyms", &self.acronyms),
        ];
        for (name, list) in lists {
            if list.iter().any(|w| w.trim().is_empty()) {
                return Err(Error::Config(format!("{} contains a blank entry", name)));
            }
        }
        if self.roles.keys().any(|w| w.trim().is_empty()) {
            return Err(Error::Config("roles contains a blank word".into()));
        }
        if self.lead_phrases.iter().any(|p| p.phrase.trim().is_empty()) {
            return Err(Error::Config("lead_phrases contains a blank phrase".into()));
        }
        for rule in &self.category_keywords {
            if rule.category.trim().is_empty() {
                return Err(Error::Config("category_keywords has a blank category".into()));
            }
            if rule.keywords.iter().any(|w| w.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "category {} contains a blank keyword",
                    rule.category
                )));
            }
        }
        Ok(())
    }
}

fn config_message(err: Error) -> String {
    match err {
        Error::Config(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let vocabulary = Vocabulary::from_toml_str(
            r#"
task_verbs = ["install", "caulk"]
named_leads = ["Al"]

[[category_keywords]]
category = "Roofing"
keywords = ["roof", "shingle"]
"#,
        )
        .unwrap();

        assert_eq!(vocabulary.task_verbs, vec!["install", "caulk"]);
        assert_eq!(vocabulary.named_leads, vec!["Al"]);
        assert_eq!(vocabulary.category_keywords[0].category, "Roofing");
        assert_eq!(vocabulary.currency_symbols, Vocabulary::default().currency_symbols);
        assert_eq!(vocabulary.roles.get("plumber").map(String::as_str), Some("Plumber"));
        assert!(vocabulary.acronyms.iter().any(|a| a == "HVAC"));
    }

    #[test]
    fn test_toml_round_trip() {
        let vocabulary = Vocabulary::renovation();
        let toml = vocabulary.to_toml_string().unwrap();
        assert!(toml.contains("task_verbs"));
        assert_eq!(Vocabulary::from_toml_str(&toml).unwrap(), vocabulary);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Vocabulary::from_toml_str("task_verbs = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Vocabulary::from_toml_str(r#"noise_words = ["a", " "]"#).unwrap_err();
        assert!(err.to_string().contains("noise_words"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "thousand_words = [\"grand\", \"large\"]").unwrap();
        let vocabulary = Vocabulary::load(file.path()).unwrap();
        assert_eq!(vocabulary.thousand_words, vec!["grand", "large"]);

        let missing = Vocabulary::load(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(missing, Error::Io(_)));
    }

    #[test]
    fn test_renovation_has_keyword_categories() {
        assert!(Vocabulary::default().category_keywords.is_empty());
        assert!(Vocabulary::renovation()
            .category_keywords
            .iter()
            .any(|c| c.category == "HVAC"));
    }
}
