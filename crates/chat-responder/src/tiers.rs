//! Matching tiers
//!
//! Each tier is a strategy over the same inputs. The resolver runs them in
//! priority order and the first one that yields a match wins; scores are
//! never compared across tiers. Within a tier, knowledge base order decides
//! ties, which makes the outcome depend on how the file is ordered.

use crate::capabilities::{lemmas, LanguageCapabilities};
use crate::config::{RepresentativeMode, DEFAULT_SEMANTIC_THRESHOLD};
use crate::error::CapabilityError;
use crate::knowledge_base::{Intent, KnowledgeBase};
use crate::types::{Capability, Evidence, Tier};
use tracing::debug;

/// A tier's positive result
#[derive(Debug, Clone, PartialEq)]
pub struct TierMatch {
    pub intent: String,
    pub evidence: Evidence,
}

/// One level of the matching cascade
pub trait MatchStrategy {
    fn tier(&self) -> Tier;

    /// Capabilities that must be available for the tier to run at all
    fn required_capabilities(&self) -> &[Capability];

    /// `Ok(None)` means no match; `Err` means the tier could not run
    fn try_match(
        &self,
        utterance: &str,
        kb: &KnowledgeBase,
        caps: &dyn LanguageCapabilities,
    ) -> Result<Option<TierMatch>, CapabilityError>;
}

// =============================================================================
// EXACT
// =============================================================================

/// Case-insensitive substring containment of pattern keywords
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTier;

impl MatchStrategy for ExactTier {
    fn tier(&self) -> Tier {
        Tier::Exact
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[]
    }

    fn try_match(
        &self,
        utterance: &str,
        kb: &KnowledgeBase,
        _caps: &dyn LanguageCapabilities,
    ) -> Result<Option<TierMatch>, CapabilityError> {
        let normalized = utterance.trim().to_lowercase();

        for intent in kb.intents() {
            if let Some(pattern) = intent
                .patterns()
                .iter()
                .find(|p| normalized.contains(p.as_str()))
            {
                return Ok(Some(TierMatch {
                    intent: intent.name().to_string(),
                    evidence: Evidence::Keyword {
                        pattern: pattern.clone(),
                    },
                }));
            }
        }
        Ok(None)
    }
}

// =============================================================================
// NORMALIZED
// =============================================================================

/// Lemma-sequence match: the pattern's lemmas must appear as a contiguous
/// run in the utterance's lemmas
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedTier;

impl MatchStrategy for NormalizedTier {
    fn tier(&self) -> Tier {
        Tier::Normalized
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Tokenize, Capability::Lemmatize]
    }

    fn try_match(
        &self,
        utterance: &str,
        kb: &KnowledgeBase,
        caps: &dyn LanguageCapabilities,
    ) -> Result<Option<TierMatch>, CapabilityError> {
        let utterance_lemmas = lemmas(caps, utterance)?;
        if utterance_lemmas.is_empty() {
            return Ok(None);
        }
        debug!("Utterance lemmas: {:?}", utterance_lemmas);

        for intent in kb.intents() {
            for pattern in intent.patterns() {
                let pattern_lemmas = lemmas(caps, pattern)?;
                if pattern_lemmas.is_empty() || pattern_lemmas.len() > utterance_lemmas.len() {
                    continue;
                }
                if utterance_lemmas
                    .windows(pattern_lemmas.len())
                    .any(|w| w == pattern_lemmas.as_slice())
                {
                    return Ok(Some(TierMatch {
                        intent: intent.name().to_string(),
                        evidence: Evidence::Lemmas {
                            pattern: pattern.clone(),
                            lemmas: pattern_lemmas,
                        },
                    }));
                }
            }
        }
        Ok(None)
    }
}

// =============================================================================
// SEMANTIC
// =============================================================================

/// Highest similarity to an intent's representative text, above a threshold
#[derive(Debug, Clone, Copy)]
pub struct SemanticTier {
    threshold: f32,
    representative: RepresentativeMode,
}

impl Default for SemanticTier {
    fn default() -> Self {
        Self::new(DEFAULT_SEMANTIC_THRESHOLD, RepresentativeMode::default())
    }
}

impl SemanticTier {
    pub fn new(threshold: f32, representative: RepresentativeMode) -> Self {
        Self {
            threshold,
            representative,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Text compared against the utterance for `intent`
    pub fn representative(&self, intent: &Intent) -> String {
        match self.representative {
            RepresentativeMode::Concatenated => intent.patterns().join(" "),
            RepresentativeMode::FirstPattern => {
                intent.patterns().first().cloned().unwrap_or_default()
            }
        }
    }
}

impl MatchStrategy for SemanticTier {
    fn tier(&self) -> Tier {
        Tier::Semantic
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[Capability::Similarity]
    }

    fn try_match(
        &self,
        utterance: &str,
        kb: &KnowledgeBase,
        caps: &dyn LanguageCapabilities,
    ) -> Result<Option<TierMatch>, CapabilityError> {
        let mut best: Option<(&Intent, String, f32)> = None;

        for intent in kb.intents() {
            let representative = self.representative(intent);
            let score = caps.similarity(utterance, &representative)?;
            if !(0.0..=1.0).contains(&score) {
                return Err(CapabilityError::call_failed(
                    Capability::Similarity,
                    format!("score {} outside [0, 1]", score),
                ));
            }
            debug!("Similarity {:.3} for intent {}", score, intent.name());

            // Strict comparisons: below-or-at threshold never matches, and
            // equal scores keep the earlier intent
            if score > self.threshold && best.as_ref().map_or(true, |(_, _, s)| score > *s) {
                best = Some((intent, representative, score));
            }
        }

        Ok(best.map(|(intent, representative, score)| TierMatch {
            intent: intent.name().to_string(),
            evidence: Evidence::Similarity {
                representative,
                score,
            },
        }))
    }
}
