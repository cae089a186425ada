//! Language capability provider interface
//!
//! The resolver and selector never talk to NLP libraries directly. They go
//! through [`LanguageCapabilities`], which reports per-capability availability
//! and returns [`CapabilityError`] instead of panicking. Every method has a
//! default that reports the capability as unavailable, so a provider only
//! implements what it actually has.

mod lexical;
#[cfg(feature = "openai")]
mod openai;

pub use lexical::{remove_stopwords, LexicalCapabilities};
#[cfg(feature = "openai")]
pub use openai::OpenAiGenerator;

use crate::config::GenerationParams;
use crate::error::CapabilityError;
use crate::types::{Capability, CapabilitySet, Entity, Sentiment};

/// External collaborator exposing linguistic and generative operations
pub trait LanguageCapabilities {
    /// Availability snapshot, fixed for the lifetime of the provider
    fn capabilities(&self) -> &CapabilitySet;

    fn is_available(&self, capability: Capability) -> bool {
        self.capabilities().is_available(capability)
    }

    fn tokenize(&self, _text: &str) -> Result<Vec<String>, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::Tokenize))
    }

    fn lemmatize(&self, _tokens: &[String]) -> Result<Vec<String>, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::Lemmatize))
    }

    /// Coarse part-of-speech tag per word, as `(token, tag)` pairs
    fn pos_tags(&self, _text: &str) -> Result<Vec<(String, String)>, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::PosTag))
    }

    fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::Ner))
    }

    fn sentiment(&self, _text: &str) -> Result<Sentiment, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::Sentiment))
    }

    /// Similarity score in `[0, 1]`
    fn similarity(&self, _a: &str, _b: &str) -> Result<f32, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::Similarity))
    }

    fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Vec<String>, CapabilityError> {
        Err(CapabilityError::Unavailable(Capability::Generate))
    }
}

/// Provider with every capability switched off
#[derive(Debug, Clone, Default)]
pub struct NoCapabilities {
    caps: CapabilitySet,
}

impl NoCapabilities {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageCapabilities for NoCapabilities {
    fn capabilities(&self) -> &CapabilitySet {
        &self.caps
    }
}

/// Text generation backend that can be attached to a provider
pub trait TextGenerator {
    /// Return up to `params.num_variants` raw continuations of `prompt`
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<String>, CapabilityError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str, &GenerationParams) -> Result<Vec<String>, CapabilityError>,
{
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<String>, CapabilityError> {
        self(prompt, params)
    }
}

/// Tokenize then lemmatize, the normalization used by the lemma tier and
/// by diagnostics keyword extraction
pub fn lemmas(caps: &dyn LanguageCapabilities, text: &str) -> Result<Vec<String>, CapabilityError> {
    let tokens = caps.tokenize(text)?;
    caps.lemmatize(&tokens)
}
