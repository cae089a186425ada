//! Shared types for intent resolution and response selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// CAPABILITIES
// =============================================================================

/// A single language capability a provider may or may not offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Tokenize,
    Lemmatize,
    PosTag,
    Ner,
    Sentiment,
    Similarity,
    Generate,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Tokenize,
        Capability::Lemmatize,
        Capability::PosTag,
        Capability::Ner,
        Capability::Sentiment,
        Capability::Similarity,
        Capability::Generate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize",
            Self::Lemmatize => "lemmatize",
            Self::PosTag => "pos_tag",
            Self::Ner => "ner",
            Self::Sentiment => "sentiment",
            Self::Similarity => "similarity",
            Self::Generate => "generate",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Snapshot of which capabilities a provider offers.
///
/// Fixed when the provider is constructed; never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    available: BTreeSet<Capability>,
}

impl CapabilitySet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    pub fn is_available(&self, capability: Capability) -> bool {
        self.available.contains(&capability)
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.available.remove(&capability);
        self
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.available.insert(capability);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.available.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            available: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Matching tier that produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Case-insensitive substring match of a pattern keyword
    Exact,
    /// Lemma-sequence match after tokenization and lemmatization
    Normalized,
    /// Best similarity score above the threshold
    Semantic,
    /// No tier matched
    None,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Exact => write!(f, "exact"),
            Tier::Normalized => write!(f, "normalized"),
            Tier::Semantic => write!(f, "semantic"),
            Tier::None => write!(f, "none"),
        }
    }
}

/// Why a tier matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    /// Pattern keyword found verbatim in the lower-cased utterance
    Keyword { pattern: String },
    /// Pattern lemmas found as a contiguous run in the utterance lemmas
    Lemmas { pattern: String, lemmas: Vec<String> },
    /// Similarity between the utterance and the intent's representative text
    Similarity { representative: String, score: f32 },
}

impl std::fmt::Display for Evidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evidence::Keyword { pattern } => write!(f, "keyword '{}'", pattern),
            Evidence::Lemmas { pattern, lemmas } => {
                write!(f, "lemmas [{}] of '{}'", lemmas.join(" "), pattern)
            }
            Evidence::Similarity {
                representative,
                score,
            } => write!(f, "similarity {:.2} with '{}'", score, representative),
        }
    }
}

/// Output of intent resolution for one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionDecision {
    pub utterance: String,
    pub intent: Option<String>,
    pub tier: Tier,
    pub evidence: Option<Evidence>,
    /// Capabilities that failed during resolution (tier skipped)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Capability>,
}

impl ResolutionDecision {
    pub fn no_match(utterance: &str) -> Self {
        Self {
            utterance: utterance.to_string(),
            intent: None,
            tier: Tier::None,
            evidence: None,
            degraded: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.intent.is_some()
    }
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Sentiment label and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

/// Named entity extracted from text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

// =============================================================================
// TURN OUTPUT
// =============================================================================

/// Which link of the fallback chain produced the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Generated,
    Intent,
    KnowledgeBaseDefault,
    Fallback,
    EmptyInput,
}

/// Everything a turn produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutput {
    pub text: String,
    pub source: ResponseSource,
    pub decision: ResolutionDecision,
    pub diagnostics: Option<crate::diagnostics::Diagnostics>,
}
