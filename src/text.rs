//! Text normalization for symptom matching.
//!
//! Pipeline: split on word boundaries (punctuation separates), lowercase,
//! drop English stopwords, then reduce surviving tokens to a singular noun
//! base form. All linguistic resources are fixed at compile time, so
//! [`TextNormalizer::normalize`] is a pure function of its input.

use std::collections::{HashMap, HashSet};

/// Common English stopwords, lowercased. Includes the contraction tails
/// ("m", "ve", "ll", …) that word splitting detaches from "I'm" / "we've".
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she",
    "her", "hers", "herself", "it", "its", "itself", "they", "them", "their",
    "theirs", "themselves", "what", "which", "who", "whom", "this", "that",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of",
    "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "can", "will", "just", "don", "should", "now", "s", "t", "d",
    "ll", "m", "o", "re", "ve", "y", "ain",
];

/// Irregular plural → singular pairs the suffix rules cannot derive.
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("geese", "goose"),
];

/// Singular forms consulted to pick between competing suffix rules
/// ("aches" → "ache", not "ach"). Rule order alone cannot decide these.
const KNOWN_SINGULARS: &[&str] = &[
    "ache", "allergy", "arm", "blister", "bruise", "chill", "cough", "cramp",
    "disease", "dose", "ear", "eye", "fever", "gland", "hand", "headache",
    "hive", "infection", "itch", "joint", "leg", "medicine", "muscle",
    "nose", "pain", "rash", "sneeze", "sore", "spasm", "symptom", "tablet",
    "throat", "toe", "wheeze",
];

/// Suffix rewrite rules tried in order; each produces one candidate.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
];

/// Converts raw text into the canonical token sequence used for matching.
///
/// Output is ordered, lowercase, and may contain duplicates — downstream
/// matching uses membership, not multiplicity, on the catalog side.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stopwords: HashSet<&'static str>,
    irregular: HashMap<&'static str, &'static str>,
    lexicon: HashSet<&'static str>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            irregular: IRREGULAR_NOUNS.iter().copied().collect(),
            lexicon: KNOWN_SINGULARS.iter().copied().collect(),
        }
    }

    /// Normalize `text` into content-bearing base-form tokens.
    ///
    /// Empty or all-stopword input yields an empty sequence. Idempotent over
    /// its own output: re-normalizing the joined result changes nothing.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .filter(|t| !self.stopwords.contains(t.as_str()))
            .map(|t| self.singularize(t))
            .collect()
    }

    /// Reduce a lowercase token to its singular noun form.
    ///
    /// Irregular table first, then suffix rules. When several rules apply,
    /// a candidate found in the lexicon wins; otherwise the first candidate.
    /// Words the rules leave alone pass through unchanged, which keeps the
    /// whole pipeline stable under repeated application.
    fn singularize(&self, token: String) -> String {
        if let Some(base) = self.irregular.get(token.as_str()) {
            return (*base).to_string();
        }

        let mut candidates: Vec<String> = Vec::new();
        if let Some(stem) = token.strip_suffix("ies") {
            if stem.len() > 1 {
                candidates.push(format!("{stem}y"));
            }
        }
        for (suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = token.strip_suffix(suffix) {
                candidates.push(format!("{stem}{replacement}"));
            }
        }
        if token.ends_with('s')
            && !token.ends_with("ss")
            && !token.ends_with("us")
            && !token.ends_with("is")
            && token.len() > 3
        {
            candidates.push(token[..token.len() - 1].to_string());
        }

        if let Some(hit) = candidates.iter().find(|c| self.lexicon.contains(c.as_str())) {
            return hit.clone();
        }
        candidates.into_iter().next().unwrap_or(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> Vec<String> {
        TextNormalizer::new().normalize(text)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(norm("").is_empty());
        assert!(norm("   \t\n").is_empty());
    }

    #[test]
    fn punctuation_separates_tokens() {
        assert_eq!(norm("fever, cough; headache."), vec!["fever", "cough", "headache"]);
    }

    #[test]
    fn stopwords_are_dropped() {
        assert_eq!(norm("I have a fever and a cough"), vec!["fever", "cough"]);
    }

    #[test]
    fn contractions_leave_no_residue() {
        // "I'm" splits into "i" + "m", both stopwords.
        assert_eq!(norm("I'm running a fever"), vec!["running", "fever"]);
    }

    #[test]
    fn output_is_lowercase() {
        assert_eq!(norm("Fever COUGH"), vec!["fever", "cough"]);
    }

    #[test]
    fn plurals_singularize() {
        assert_eq!(
            norm("chills aches rashes allergies"),
            vec!["chill", "ache", "rash", "allergy"]
        );
    }

    #[test]
    fn lexicon_breaks_suffix_rule_ties() {
        // "ches" → "ch" would give "ach"; the lexicon prefers "ache".
        assert_eq!(norm("aches"), vec!["ache"]);
        // With no lexicon entry, the specific rule wins: "churches" → "church".
        assert_eq!(norm("churches"), vec!["church"]);
    }

    #[test]
    fn non_plural_s_endings_survive() {
        assert_eq!(norm("dizziness nausea sinus"), vec!["dizziness", "nausea", "sinus"]);
    }

    #[test]
    fn irregular_plurals_use_the_table() {
        assert_eq!(norm("swollen feet"), vec!["swollen", "foot"]);
    }

    #[test]
    fn duplicates_are_preserved_in_order() {
        assert_eq!(norm("cough cough fever cough"), vec!["cough", "cough", "fever", "cough"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        for text in [
            "I have a fever and a cough",
            "chills, body aches, and rashes",
            "sore throat with swollen glands",
            "sneezing fits and watery eyes",
            "itches, hives, churches",
        ] {
            let once = norm(text);
            let twice = norm(&once.join(" "));
            assert_eq!(once, twice, "re-normalizing changed: {text}");
        }
    }
}
