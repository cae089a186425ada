//! Scriptable capability provider for integration tests

#![allow(dead_code)]

use chat_responder::{
    Capability, CapabilityError, CapabilitySet, Entity, GenerationParams, KnowledgeBase,
    LanguageCapabilities, Sentiment,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Provider whose answers, availability and failures are set by the test.
/// Records how often each capability is called.
#[derive(Default)]
pub struct StubCapabilities {
    caps: CapabilitySet,
    failing: HashSet<Capability>,
    scores: HashMap<String, f32>,
    generated: Vec<String>,
    calls: RefCell<BTreeMap<Capability, usize>>,
    prompts: RefCell<Vec<String>>,
}

impl StubCapabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            caps: CapabilitySet::all(),
            ..Self::default()
        }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.caps = self.caps.with(capability);
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.caps = self.caps.without(capability);
        self
    }

    /// Available, but every call fails
    pub fn failing(mut self, capability: Capability) -> Self {
        self.caps = self.caps.with(capability);
        self.failing.insert(capability);
        self
    }

    /// Similarity returned when the second argument equals `representative`
    pub fn score(mut self, representative: &str, score: f32) -> Self {
        self.scores.insert(representative.to_string(), score);
        self
    }

    pub fn generating(mut self, variants: &[&str]) -> Self {
        self.generated = variants.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn calls(&self, capability: Capability) -> usize {
        self.calls.borrow().get(&capability).copied().unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    fn enter(&self, capability: Capability) -> Result<(), CapabilityError> {
        *self.calls.borrow_mut().entry(capability).or_insert(0) += 1;
        if !self.caps.is_available(capability) {
            return Err(CapabilityError::Unavailable(capability));
        }
        if self.failing.contains(&capability) {
            return Err(CapabilityError::call_failed(capability, "scripted failure"));
        }
        Ok(())
    }
}

impl LanguageCapabilities for StubCapabilities {
    fn capabilities(&self) -> &CapabilitySet {
        &self.caps
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, CapabilityError> {
        self.enter(Capability::Tokenize)?;
        Ok(text.split_whitespace().map(|t| t.to_lowercase()).collect())
    }

    fn lemmatize(&self, tokens: &[String]) -> Result<Vec<String>, CapabilityError> {
        self.enter(Capability::Lemmatize)?;
        Ok(tokens.to_vec())
    }

    fn pos_tags(&self, text: &str) -> Result<Vec<(String, String)>, CapabilityError> {
        self.enter(Capability::PosTag)?;
        Ok(text
            .split_whitespace()
            .map(|t| (t.to_string(), "X".to_string()))
            .collect())
    }

    fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>, CapabilityError> {
        self.enter(Capability::Ner)?;
        Ok(vec![Entity {
            text: "Paris".to_string(),
            label: "LOC".to_string(),
        }])
    }

    fn sentiment(&self, _text: &str) -> Result<Sentiment, CapabilityError> {
        self.enter(Capability::Sentiment)?;
        Ok(Sentiment {
            label: "POSITIVE".to_string(),
            score: 0.9,
        })
    }

    fn similarity(&self, _a: &str, b: &str) -> Result<f32, CapabilityError> {
        self.enter(Capability::Similarity)?;
        Ok(self.scores.get(b).copied().unwrap_or(0.0))
    }

    fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Vec<String>, CapabilityError> {
        self.enter(Capability::Generate)?;
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.generated.clone())
    }
}

pub fn greet_kb() -> KnowledgeBase {
    KnowledgeBase::builder()
        .intent("greet", ["bonjour", "salut"], ["Salut !"])
        .build()
        .unwrap()
}

pub fn faq_kb() -> KnowledgeBase {
    KnowledgeBase::builder()
        .intent("greet", ["bonjour", "salut"], ["Salut !", "Bonjour !", "Hello !"])
        .intent("thanks", ["merci beaucoup"], ["De rien !", "Avec plaisir !"])
        .intent("hours", ["horaires", "ouvert"], ["9h-18h", "Du lundi au vendredi"])
        .build()
        .unwrap()
}
