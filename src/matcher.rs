//! Symptom → disease matching by normalized token overlap.
//!
//! Each disease's symptom phrases are normalized once at construction; a
//! patient description is normalized per call and scored by how many of its
//! tokens appear among a disease's symptom tokens. Patient duplicates count
//! each time they occur; the catalog side is a membership set.

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::DiseaseCatalog;
use crate::text::TextNormalizer;

/// A successful match: the winning disease and its overlap score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub disease: String,
    pub score: usize,
}

/// Outcome of one matching pass.
///
/// `NoMatch` always means zero overlap: malformed catalog data is rejected
/// at load time and normalization cannot fail, so matching has no internal
/// error case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(Diagnosis),
    NoMatch,
}

/// Matcher over a fixed disease catalog.
///
/// Entries keep catalog order: a later disease only takes the lead with a
/// strictly greater score, so ties always resolve to the earliest record
/// and results are deterministic for a fixed catalog and input.
#[derive(Debug, Clone)]
pub struct SymptomMatcher {
    normalizer: TextNormalizer,
    entries: Vec<(String, HashSet<String>)>,
}

impl SymptomMatcher {
    /// Build a matcher, normalizing every disease's symptom phrases up front.
    pub fn new(catalog: &DiseaseCatalog) -> Self {
        let normalizer = TextNormalizer::new();
        let entries = catalog
            .records()
            .iter()
            .map(|record| {
                let tokens: HashSet<String> = normalizer
                    .normalize(&record.symptoms.join(" "))
                    .into_iter()
                    .collect();
                (record.name.clone(), tokens)
            })
            .collect();
        Self { normalizer, entries }
    }

    /// Score `patient_text` against every disease and return the best match,
    /// or `NoMatch` when no disease shares a single token with the input.
    pub fn diagnose(&self, patient_text: &str) -> MatchOutcome {
        let patient_tokens = self.normalizer.normalize(patient_text);

        let mut best: Option<(&str, usize)> = None;
        for (disease, symptom_tokens) in &self.entries {
            let score = patient_tokens
                .iter()
                .filter(|token| symptom_tokens.contains(token.as_str()))
                .count();
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((disease, score));
            }
        }

        match best {
            Some((disease, score)) => {
                debug!(%disease, score, "symptom match");
                MatchOutcome::Matched(Diagnosis { disease: disease.to_string(), score })
            }
            None => {
                debug!(tokens = patient_tokens.len(), "no symptom overlap");
                MatchOutcome::NoMatch
            }
        }
    }
}
