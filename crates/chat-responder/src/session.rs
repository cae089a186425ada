//! Dialogue Session - one turn at a time through resolver and selector
//!
//! A session keeps no conversational memory: every turn depends only on the
//! utterance, the knowledge base, the provider and the configuration. A
//! context-tracking extension would need its own explicit state here rather
//! than hiding it in the resolver or the provider.

use crate::capabilities::LanguageCapabilities;
use crate::config::SessionConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ConfigError;
use crate::knowledge_base::KnowledgeBase;
use crate::resolver::IntentResolver;
use crate::selector::{ResponseSelector, EMPTY_INPUT_RESPONSE};
use crate::types::{Capability, ResolutionDecision, ResponseSource, TurnOutput};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct DialogueSession<C, R = StdRng> {
    kb: Arc<KnowledgeBase>,
    caps: C,
    config: SessionConfig,
    resolver: IntentResolver,
    selector: ResponseSelector<R>,
}

impl<C: LanguageCapabilities> DialogueSession<C, StdRng> {
    pub fn new(kb: Arc<KnowledgeBase>, caps: C, config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_selector(kb, caps, config, ResponseSelector::from_entropy())
    }

    /// Session whose response choices are reproducible
    pub fn seeded(
        kb: Arc<KnowledgeBase>,
        caps: C,
        config: SessionConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_selector(kb, caps, config, ResponseSelector::seeded(seed))
    }
}

impl<C: LanguageCapabilities, R: Rng> DialogueSession<C, R> {
    pub fn with_selector(
        kb: Arc<KnowledgeBase>,
        caps: C,
        config: SessionConfig,
        selector: ResponseSelector<R>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            "Dialogue session ready: nlp={}, verbose={}, generation={} ({} intents)",
            config.nlp_enabled,
            config.verbose_analysis,
            config.generation_enabled,
            kb.len()
        );
        if config.generation_enabled && !caps.is_available(Capability::Generate) {
            warn!("Generation requested but unavailable; replies will be rule-based");
        }

        Ok(Self {
            resolver: IntentResolver::for_config(&config),
            kb,
            caps,
            config,
            selector,
        })
    }

    /// Replace the tier cascade derived from the configuration
    pub fn with_resolver(mut self, resolver: IntentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Answer one utterance. Never fails: degradation shows up only in
    /// `source`, diagnostics and logs.
    #[instrument(skip(self))]
    pub fn turn(&mut self, utterance: &str) -> TurnOutput {
        if utterance.trim().is_empty() {
            let decision = ResolutionDecision::no_match(utterance);
            return TurnOutput {
                text: EMPTY_INPUT_RESPONSE.to_string(),
                source: ResponseSource::EmptyInput,
                diagnostics: self
                    .config
                    .verbose_analysis
                    .then(|| Diagnostics::from_decision(&decision)),
                decision,
            };
        }

        let decision = self.resolver.resolve(utterance, &self.kb, &self.caps);
        let selection = self
            .selector
            .select(&decision, &self.kb, &self.config, &self.caps);

        TurnOutput {
            text: selection.text,
            source: selection.source,
            decision,
            diagnostics: selection.diagnostics,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn capabilities(&self) -> &C {
        &self.caps
    }
}
