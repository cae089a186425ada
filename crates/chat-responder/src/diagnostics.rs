//! Read-only turn analysis
//!
//! Sentiment, entities, part-of-speech tags and keywords are gathered for display only. They are
//! computed after the reply has been chosen and cannot change it.

use crate::capabilities::{remove_stopwords, LanguageCapabilities};
use crate::config::MAX_DIAGNOSTIC_KEYWORDS;
use crate::error::CapabilityError;
use crate::types::{Capability, Entity, Evidence, ResolutionDecision, Sentiment, Tier};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub tier: Tier,
    pub intent: Option<String>,
    pub evidence: Option<Evidence>,
    pub sentiment: Option<Sentiment>,
    pub entities: Vec<Entity>,
    /// `(token, tag)` pairs in text order
    pub pos_tags: Vec<(String, String)>,
    pub keywords: Vec<String>,
    /// Capabilities whose calls failed at some point during the turn
    pub degraded: Vec<Capability>,
}

impl Diagnostics {
    /// Diagnostics built from the decision alone, no capability calls
    pub fn from_decision(decision: &ResolutionDecision) -> Self {
        Self {
            tier: decision.tier,
            intent: decision.intent.clone(),
            evidence: decision.evidence.clone(),
            sentiment: None,
            entities: Vec::new(),
            pos_tags: Vec::new(),
            keywords: Vec::new(),
            degraded: decision.degraded.clone(),
        }
    }

    fn record(&mut self, err: CapabilityError) {
        warn!("Diagnostics degraded: {}", err);
        let capability = err.capability();
        if !self.degraded.contains(&capability) {
            self.degraded.push(capability);
        }
    }
}

/// Run every available analysis capability over the utterance
pub fn analyze(decision: &ResolutionDecision, caps: &dyn LanguageCapabilities) -> Diagnostics {
    let mut diagnostics = Diagnostics::from_decision(decision);
    let text = decision.utterance.as_str();

    if caps.is_available(Capability::Sentiment) {
        match caps.sentiment(text) {
            Ok(sentiment) => diagnostics.sentiment = Some(sentiment),
            Err(e) => diagnostics.record(e),
        }
    }

    if caps.is_available(Capability::Ner) {
        match caps.extract_entities(text) {
            Ok(entities) => diagnostics.entities = entities,
            Err(e) => diagnostics.record(e),
        }
    }

    if caps.is_available(Capability::PosTag) {
        match caps.pos_tags(text) {
            Ok(tags) => diagnostics.pos_tags = tags,
            Err(e) => diagnostics.record(e),
        }
    }

    if caps.is_available(Capability::Tokenize) {
        match keywords(text, caps) {
            Ok(keywords) => diagnostics.keywords = keywords,
            Err(e) => diagnostics.record(e),
        }
    }

    diagnostics
}

/// Distinct content words, lemmatized when possible, in order of appearance
fn keywords(text: &str, caps: &dyn LanguageCapabilities) -> Result<Vec<String>, CapabilityError> {
    let tokens = remove_stopwords(&caps.tokenize(text)?);
    let normalized = if caps.is_available(Capability::Lemmatize) {
        caps.lemmatize(&tokens)?
    } else {
        tokens
    };

    let mut keywords: Vec<String> = Vec::new();
    for word in normalized {
        if word.chars().count() > 1 && !keywords.contains(&word) {
            keywords.push(word);
        }
        if keywords.len() == MAX_DIAGNOSTIC_KEYWORDS {
            break;
        }
    }
    Ok(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{LexicalCapabilities, NoCapabilities};

    #[test]
    fn test_analyze_with_all_capabilities() {
        let decision = ResolutionDecision::no_match("Merci beaucoup Marie pour les 3 réservations !");
        let diagnostics = analyze(&decision, &LexicalCapabilities::new());

        assert_eq!(diagnostics.tier, Tier::None);
        assert_eq!(diagnostics.sentiment.unwrap().label, "POSITIVE");
        assert!(diagnostics
            .entities
            .iter()
            .any(|e| e.text == "Marie" && e.label == "PROPER"));
        assert_eq!(
            diagnostics.keywords,
            vec!["merci", "beaucoup", "marie", "reservation"]
        );
        assert!(diagnostics
            .pos_tags
            .contains(&("3".to_string(), "NUM".to_string())));
        assert!(diagnostics.degraded.is_empty());
    }

    #[test]
    fn test_keywords_capped_and_deduplicated() {
        let decision =
            ResolutionDecision::no_match("train train bus avion bateau vélo voiture métro");
        let diagnostics = analyze(&decision, &LexicalCapabilities::new());
        assert_eq!(
            diagnostics.keywords,
            vec!["train", "bus", "avion", "bateau", "velo"]
        );
    }

    #[test]
    fn test_analyze_without_capabilities() {
        let decision = ResolutionDecision::no_match("Bonjour Paris");
        let diagnostics = analyze(&decision, &NoCapabilities::new());
        assert!(diagnostics.sentiment.is_none());
        assert!(diagnostics.entities.is_empty());
        assert!(diagnostics.pos_tags.is_empty());
        assert!(diagnostics.keywords.is_empty());
        assert!(diagnostics.degraded.is_empty());
    }
}
