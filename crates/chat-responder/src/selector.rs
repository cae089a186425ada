//! Response Selector - turns a resolution decision into reply text
//!
//! Fallback chain, first usable link wins:
//!
//! 1. Generated text (generation enabled and the capability available)
//! 2. Random response of the matched intent
//! 3. Random response of the knowledge base `default` entry
//! 4. [`DEFAULT_RESPONSE`]
//!
//! Generation failures and unusable generated text fall through to the
//! rule-based links; nothing is propagated to the caller.

use crate::capabilities::LanguageCapabilities;
use crate::config::{SessionConfig, SENTENCE_TERMINATORS};
use crate::diagnostics::{self, Diagnostics};
use crate::error::CapabilityError;
use crate::knowledge_base::KnowledgeBase;
use crate::types::{Capability, ResolutionDecision, ResponseSource};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, warn};

/// Reply when nothing matched and the knowledge base has no `default` entry
pub const DEFAULT_RESPONSE: &str = "Je ne sais pas comment répondre à cela.";

/// Reply to a blank utterance
pub const EMPTY_INPUT_RESPONSE: &str = "Je n'ai rien reçu. Pouvez-vous répéter ?";

/// Chosen reply plus optional diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub text: String,
    pub source: ResponseSource,
    pub diagnostics: Option<Diagnostics>,
}

/// Picks reply text. Owns the randomness source so tests can seed it.
pub struct ResponseSelector<R = StdRng> {
    rng: R,
}

impl ResponseSelector<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic selector: same seed and same decisions give same replies
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ResponseSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    #[instrument(skip_all, fields(intent = ?decision.intent, tier = %decision.tier))]
    pub fn select(
        &mut self,
        decision: &ResolutionDecision,
        kb: &KnowledgeBase,
        config: &SessionConfig,
        caps: &dyn LanguageCapabilities,
    ) -> Selection {
        let mut generation_failure = None;

        let (text, source) = match self.try_generate(decision, config, caps) {
            Ok(Some(text)) => (text, ResponseSource::Generated),
            Ok(None) => self.rule_based(decision, kb),
            Err(e) => {
                generation_failure = Some(e.capability());
                self.rule_based(decision, kb)
            }
        };
        debug!("Selected {:?} response", source);

        let diagnostics = config.verbose_analysis.then(|| {
            let mut diagnostics = diagnostics::analyze(decision, caps);
            if let Some(capability) = generation_failure {
                if !diagnostics.degraded.contains(&capability) {
                    diagnostics.degraded.push(capability);
                }
            }
            diagnostics
        });

        Selection {
            text,
            source,
            diagnostics,
        }
    }

    /// `Ok(None)` when generation is off or produced nothing usable
    fn try_generate(
        &self,
        decision: &ResolutionDecision,
        config: &SessionConfig,
        caps: &dyn LanguageCapabilities,
    ) -> Result<Option<String>, CapabilityError> {
        if !config.generation_enabled || !caps.is_available(Capability::Generate) {
            return Ok(None);
        }

        let prompt = build_prompt(&decision.utterance, decision.intent.as_deref());
        let variants = caps.generate(&prompt, &config.generation).map_err(|e| {
            warn!("Generation failed, using rule-based reply: {}", e);
            e
        })?;

        let text = variants
            .iter()
            .map(|raw| clean_generated(raw, &prompt))
            .find(|t| !t.is_empty());
        if text.is_none() {
            warn!(
                "Generation returned {} unusable variants, using rule-based reply",
                variants.len()
            );
        }
        Ok(text)
    }

    fn rule_based(
        &mut self,
        decision: &ResolutionDecision,
        kb: &KnowledgeBase,
    ) -> (String, ResponseSource) {
        if let Some(intent) = decision.intent.as_deref().and_then(|name| kb.get(name)) {
            if let Some(text) = intent.responses().choose(&mut self.rng) {
                return (text.clone(), ResponseSource::Intent);
            }
        }
        match kb.default_responses().choose(&mut self.rng) {
            Some(text) => (text.clone(), ResponseSource::KnowledgeBaseDefault),
            None => (DEFAULT_RESPONSE.to_string(), ResponseSource::Fallback),
        }
    }
}

/// Prompt sent to the generator, steered by the matched intent when known
pub fn build_prompt(utterance: &str, intent: Option<&str>) -> String {
    let exchange = format!("Utilisateur : {}\nAssistant :", utterance.trim());
    match intent {
        Some(intent) => format!("[{}] {}", intent, exchange),
        None => exchange,
    }
}

/// Strip the echoed prompt, collapse whitespace, keep the first sentence.
///
/// Returns an empty string when nothing alphanumeric survives, so callers
/// can treat the variant as unusable.
pub fn clean_generated(raw: &str, prompt: &str) -> String {
    let raw = raw.trim_start();
    let body = raw.strip_prefix(prompt.trim()).unwrap_or(raw);
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");

    let sentence = match sentence_end(&collapsed) {
        Some(end) => &collapsed[..end],
        None => collapsed.as_str(),
    };
    if sentence.chars().any(char::is_alphanumeric) {
        sentence.to_string()
    } else {
        String::new()
    }
}

/// Byte offset just past the first sentence terminator.
///
/// A terminator ends a sentence only when followed by whitespace or the end
/// of the text, and not preceded by a digit (`9.30`) or by a
/// lone capital initial (`M. Dupont`).
fn sentence_end(text: &str) -> Option<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !SENTENCE_TERMINATORS.contains(&c) {
            continue;
        }
        if !chars.get(i + 1).map_or(true, |(_, next)| next.is_whitespace()) {
            continue;
        }
        let prev = i.checked_sub(1).map(|j| chars[j].1);
        if prev.is_some_and(|p| p.is_numeric()) {
            continue;
        }
        let initial = prev.is_some_and(char::is_uppercase)
            && i.checked_sub(2).map_or(true, |j| chars[j].1.is_whitespace());
        if initial {
            continue;
        }
        return Some(pos + c.len_utf8());
    }
    None
}
