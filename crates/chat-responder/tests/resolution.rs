//! Intent resolution across tiers, availability and failures

mod common;

use chat_responder::{
    Capability, CapabilityError, Evidence, ExactTier, IntentResolver, KnowledgeBase,
    LanguageCapabilities, MatchStrategy, NormalizedTier, RepresentativeMode, SemanticTier, Tier,
    TierMatch,
};
use common::{faq_kb, greet_kb, StubCapabilities};
use proptest::prelude::*;
use std::io::Write;

fn standard() -> IntentResolver {
    IntentResolver::standard(0.7, RepresentativeMode::Concatenated)
}

#[test]
fn exact_tier_matches_keyword_inside_utterance() {
    let decision = standard().resolve("Bonjour à tous", &greet_kb(), &StubCapabilities::none());
    assert_eq!(decision.intent.as_deref(), Some("greet"));
    assert_eq!(decision.tier, Tier::Exact);
    assert_eq!(
        decision.evidence,
        Some(Evidence::Keyword {
            pattern: "bonjour".to_string()
        })
    );
}

#[test]
fn exact_match_makes_no_capability_calls() {
    let caps = StubCapabilities::all().score("merci beaucoup", 0.99);
    standard().resolve("salut", &faq_kb(), &caps);
    for capability in Capability::ALL {
        assert_eq!(caps.calls(capability), 0, "{capability} was called");
    }
}

#[test]
fn knowledge_base_order_decides_overlapping_patterns() {
    let first = KnowledgeBase::builder()
        .intent("a", ["bon"], ["A"])
        .intent("b", ["bonjour"], ["B"])
        .build()
        .unwrap();
    let second = KnowledgeBase::builder()
        .intent("b", ["bonjour"], ["B"])
        .intent("a", ["bon"], ["A"])
        .build()
        .unwrap();

    let caps = StubCapabilities::none();
    assert_eq!(
        standard().resolve("bonjour", &first, &caps).intent.as_deref(),
        Some("a")
    );
    assert_eq!(
        standard().resolve("bonjour", &second, &caps).intent.as_deref(),
        Some("b")
    );
}

#[test]
fn semantic_tier_matches_above_threshold() {
    let kb = KnowledgeBase::builder()
        .intent("thanks", ["merci beaucoup"], ["De rien !"])
        .build()
        .unwrap();
    let caps = StubCapabilities::none()
        .with(Capability::Similarity)
        .score("merci beaucoup", 0.81);

    let decision = standard().resolve("je vous remercie énormément", &kb, &caps);
    assert_eq!(decision.intent.as_deref(), Some("thanks"));
    assert_eq!(decision.tier, Tier::Semantic);
    assert_eq!(
        decision.evidence,
        Some(Evidence::Similarity {
            representative: "merci beaucoup".to_string(),
            score: 0.81,
        })
    );
}

#[test]
fn semantic_tier_rejects_score_at_threshold() {
    let caps = StubCapabilities::none()
        .with(Capability::Similarity)
        .score("merci beaucoup", 0.7);
    let decision = standard().resolve("je vous remercie", &faq_kb(), &caps);
    assert_eq!(decision.tier, Tier::None);
}

#[test]
fn semantic_tier_picks_highest_and_earliest_on_ties() {
    let kb = KnowledgeBase::builder()
        .intent("first", ["alpha"], ["1"])
        .intent("second", ["beta"], ["2"])
        .intent("third", ["gamma"], ["3"])
        .build()
        .unwrap();

    let caps = StubCapabilities::none()
        .with(Capability::Similarity)
        .score("alpha", 0.75)
        .score("beta", 0.9)
        .score("gamma", 0.9);
    let decision = standard().resolve("zzz", &kb, &caps);
    assert_eq!(decision.intent.as_deref(), Some("second"));
    assert_eq!(caps.calls(Capability::Similarity), 3);
}

#[test]
fn unavailable_similarity_is_never_called() {
    let caps = StubCapabilities::all()
        .without(Capability::Similarity)
        .score("merci beaucoup", 0.99);

    let decision = standard().resolve("xyzzy quux", &faq_kb(), &caps);
    assert_eq!(decision.tier, Tier::None);
    assert!(decision.intent.is_none());
    assert_eq!(caps.calls(Capability::Similarity), 0);
    assert!(decision.degraded.is_empty());
}

#[test]
fn failing_capability_skips_tier_and_continues() {
    let caps = StubCapabilities::none()
        .with(Capability::Tokenize)
        .failing(Capability::Lemmatize)
        .with(Capability::Similarity)
        .score("horaires ouvert", 0.8);

    let decision = standard().resolve("à quelle heure ouvrez-vous", &faq_kb(), &caps);
    assert_eq!(decision.tier, Tier::Semantic);
    assert_eq!(decision.intent.as_deref(), Some("hours"));
    assert_eq!(decision.degraded, vec![Capability::Lemmatize]);
}

#[test]
fn out_of_range_similarity_degrades_instead_of_matching() {
    let caps = StubCapabilities::none()
        .with(Capability::Similarity)
        .score("merci beaucoup", 1.5);

    let decision = standard().resolve("je vous remercie", &faq_kb(), &caps);
    assert_eq!(decision.tier, Tier::None);
    assert!(decision.intent.is_none());
    assert_eq!(decision.degraded, vec![Capability::Similarity]);
}

#[test]
fn every_tier_failing_still_yields_a_decision() {
    let caps = StubCapabilities::none()
        .with(Capability::Tokenize)
        .failing(Capability::Lemmatize)
        .failing(Capability::Similarity);

    let decision = standard().resolve("rien à voir", &faq_kb(), &caps);
    assert_eq!(decision.tier, Tier::None);
    assert_eq!(
        decision.degraded,
        vec![Capability::Lemmatize, Capability::Similarity]
    );
}

#[test]
fn normalized_tier_uses_lemma_equality() {
    let caps = StubCapabilities::none()
        .with(Capability::Tokenize)
        .with(Capability::Lemmatize);
    // Exact containment fails on "merci  beaucoup" (double space); lemmas match
    let decision = standard().resolve("Merci  BEAUCOUP !", &faq_kb(), &caps);
    assert_eq!(decision.tier, Tier::Normalized);
    assert_eq!(decision.intent.as_deref(), Some("thanks"));
}

/// Matches anything mentioning a number, inserted after the standard tiers
struct DigitTier;

impl MatchStrategy for DigitTier {
    fn tier(&self) -> Tier {
        Tier::Exact
    }

    fn required_capabilities(&self) -> &[Capability] {
        &[]
    }

    fn try_match(
        &self,
        utterance: &str,
        _kb: &KnowledgeBase,
        _caps: &dyn LanguageCapabilities,
    ) -> Result<Option<TierMatch>, CapabilityError> {
        Ok(utterance
            .chars()
            .any(|c| c.is_ascii_digit())
            .then(|| TierMatch {
                intent: "hours".to_string(),
                evidence: Evidence::Keyword {
                    pattern: "<digit>".to_string(),
                },
            }))
    }
}

#[test]
fn custom_tiers_extend_the_cascade() {
    let mut resolver = IntentResolver::new(vec![
        Box::new(ExactTier),
        Box::new(NormalizedTier),
        Box::new(SemanticTier::default()),
    ]);
    resolver.push(Box::new(DigitTier));

    let decision = resolver.resolve("à 9h ?", &faq_kb(), &StubCapabilities::none());
    assert_eq!(decision.intent.as_deref(), Some("hours"));

    let decision = resolver.resolve("salut, à 9h ?", &faq_kb(), &StubCapabilities::none());
    assert_eq!(decision.intent.as_deref(), Some("greet"));
}

#[test]
fn loaded_knowledge_base_resolves_declared_keywords() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "greet": {{ "patterns": ["bonjour", "salut"], "responses": ["Salut !"] }},
            "bye": {{ "patterns": ["au revoir"], "responses": ["À bientôt !"] }}
        }}"#
    )
    .unwrap();

    let kb = KnowledgeBase::load(file.path()).unwrap();
    let caps = StubCapabilities::none();
    for (utterance, intent) in [("Bonjour", "greet"), ("SALUT", "greet"), ("Au Revoir", "bye")] {
        let decision = standard().resolve(utterance, &kb, &caps);
        assert_eq!(decision.intent.as_deref(), Some(intent), "{utterance}");
        assert_eq!(decision.tier, Tier::Exact);
    }
}

fn with_casing(word: &str, upper: &[bool]) -> String {
    word.chars()
        .zip(upper.iter().chain(std::iter::repeat(&false)))
        .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
        .collect()
}

proptest! {
    #[test]
    fn exact_tier_ignores_case(
        upper in prop::collection::vec(any::<bool>(), 7),
        prefix in "[0-9 ]{0,8}",
        suffix in "[0-9 ]{0,8}",
    ) {
        let utterance = format!("{}{}{}", prefix, with_casing("bonjour", &upper), suffix);
        let decision = IntentResolver::exact_only()
            .resolve(&utterance, &greet_kb(), &StubCapabilities::none());
        prop_assert_eq!(decision.intent.as_deref(), Some("greet"));
        prop_assert_eq!(decision.tier, Tier::Exact);
    }
}
