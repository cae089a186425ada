//! Intent Resolver - runs the tier cascade
//!
//! ```text
//! Utterance
//!     │
//!     ▼
//! ┌──────────────────────────────┐
//! │ Exact (substring, always on) │──── match ──► Decision(Exact)
//! └──────────────────────────────┘
//!     │ none
//!     ▼
//! ┌──────────────────────────────┐
//! │ Normalized (lemmatize)       │──── match ──► Decision(Normalized)
//! └──────────────────────────────┘
//!     │ none / unavailable / failed
//!     ▼
//! ┌──────────────────────────────┐
//! │ Semantic (similarity > 0.7)  │──── match ──► Decision(Semantic)
//! └──────────────────────────────┘
//!     │ none / unavailable / failed
//!     ▼
//! Decision(None)
//! ```
//!
//! Resolution is a pure function of the utterance, the knowledge base and
//! the provider. A tier whose capability is missing is skipped without a
//! call; a tier whose capability call fails is skipped and recorded.

use crate::capabilities::LanguageCapabilities;
use crate::config::{RepresentativeMode, SessionConfig};
use crate::knowledge_base::KnowledgeBase;
use crate::tiers::{ExactTier, MatchStrategy, NormalizedTier, SemanticTier};
use crate::types::ResolutionDecision;
use tracing::{debug, instrument, warn};

/// Ordered list of matching tiers
pub struct IntentResolver {
    tiers: Vec<Box<dyn MatchStrategy>>,
}

impl IntentResolver {
    /// Resolver over an explicit tier list, attempted in the given order
    pub fn new(tiers: Vec<Box<dyn MatchStrategy>>) -> Self {
        Self { tiers }
    }

    /// Exact, then Normalized, then Semantic
    pub fn standard(threshold: f32, representative: RepresentativeMode) -> Self {
        Self::new(vec![
            Box::new(ExactTier),
            Box::new(NormalizedTier),
            Box::new(SemanticTier::new(threshold, representative)),
        ])
    }

    /// Exact only
    pub fn exact_only() -> Self {
        Self::new(vec![Box::new(ExactTier)])
    }

    /// Tier set implied by a session configuration
    pub fn for_config(config: &SessionConfig) -> Self {
        if config.nlp_enabled {
            Self::standard(config.semantic_threshold, config.representative)
        } else {
            Self::exact_only()
        }
    }

    /// Append a tier after the existing ones
    pub fn push(&mut self, tier: Box<dyn MatchStrategy>) {
        self.tiers.push(tier);
    }

    pub fn tiers(&self) -> impl Iterator<Item = &dyn MatchStrategy> {
        self.tiers.iter().map(|t| t.as_ref())
    }

    #[instrument(skip(self, kb, caps))]
    pub fn resolve(
        &self,
        utterance: &str,
        kb: &KnowledgeBase,
        caps: &dyn LanguageCapabilities,
    ) -> ResolutionDecision {
        let mut decision = ResolutionDecision::no_match(utterance);

        for strategy in &self.tiers {
            let tier = strategy.tier();

            if let Some(missing) = strategy
                .required_capabilities()
                .iter()
                .find(|c| !caps.is_available(**c))
            {
                debug!("Skipping {} tier: {} unavailable", tier, missing);
                continue;
            }

            match strategy.try_match(utterance, kb, caps) {
                Ok(Some(found)) => {
                    debug!("{} tier matched {} ({})", tier, found.intent, found.evidence);
                    decision.intent = Some(found.intent);
                    decision.tier = tier;
                    decision.evidence = Some(found.evidence);
                    return decision;
                }
                Ok(None) => debug!("{} tier found nothing", tier),
                Err(e) => {
                    warn!("Skipping {} tier: {}", tier, e);
                    if !decision.degraded.contains(&e.capability()) {
                        decision.degraded.push(e.capability());
                    }
                }
            }
        }

        debug!("No tier matched");
        decision
    }
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::for_config(&SessionConfig::default())
    }
}
