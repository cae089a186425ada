//! Built-in lexical capability provider
//!
//! Rule-based stand-ins for the model-backed capabilities: regex
//! tokenization, accent folding with plural stripping, capitalisation-based
//! entity spotting and tagging, a small polarity lexicon, and Sorensen-Dice
//! similarity.
//! Good enough to drive every tier of the resolver without downloads.
//! Generation is only available when a [`TextGenerator`] is attached.

use super::{LanguageCapabilities, TextGenerator};
use crate::config::{GenerationParams, SENTENCE_TERMINATORS, SENTIMENT_INPUT_LIMIT};
use crate::error::CapabilityError;
use crate::types::{Capability, CapabilitySet, Entity, Sentiment};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::info;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// =============================================================================
// PATTERNS AND LEXICONS
// =============================================================================

/// Word tokens (letters and digits; apostrophes and punctuation split)
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Runs of capitalised words
static PROPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Lu}[\p{L}\-]*(?:\s+\p{Lu}[\p{L}\-]*)*").unwrap()
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\b").unwrap());

const STOPWORDS: &[&str] = &[
    // French
    "a", "au", "aux", "avec", "ce", "ces", "dans", "de", "des", "du", "elle", "en", "et", "eux",
    "il", "je", "j", "la", "le", "les", "leur", "lui", "ma", "mais", "me", "mes", "moi", "mon",
    "ne", "nos", "notre", "nous", "on", "ou", "par", "pas", "pour", "qu", "que", "qui", "sa",
    "se", "ses", "son", "sur", "ta", "te", "tes", "toi", "ton", "tu", "un", "une", "vos",
    "votre", "vous", "c", "d", "l", "m", "n", "s", "t", "y", "est", "suis", "es",
    // English
    "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "i", "in", "is", "it",
    "its", "me", "my", "of", "on", "or", "so", "the", "this", "that", "to", "was", "we",
    "with", "you", "your",
];

const POSITIVE_WORDS: &[&str] = &[
    "bien", "bon", "bonne", "super", "genial", "excellent", "merci", "parfait", "content",
    "heureux", "heureuse", "aime", "adore", "top", "cool", "great", "good", "love", "happy",
    "nice", "beautiful", "wonderful", "thank", "thanks", "awesome", "sunny",
];

const NEGATIVE_WORDS: &[&str] = &[
    "mal", "mauvais", "mauvaise", "nul", "triste", "deteste", "horrible", "terrible", "decu",
    "decue", "probleme", "colere", "bad", "sad", "hate", "awful", "disappointed", "angry",
    "problem", "worst", "poor",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Drop stopwords from already lower-cased tokens
pub fn remove_stopwords(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !STOPWORD_SET.contains(t.as_str()))
        .cloned()
        .collect()
}

/// Strip diacritics: "réservé" → "reserve"
fn fold_accents(token: &str) -> String {
    token.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Whether the word at byte offset `start` opens a sentence
fn starts_sentence(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end();
    before.is_empty() || before.ends_with(SENTENCE_TERMINATORS)
}

/// Reduce a folded token to a crude lemma by stripping plural suffixes
fn strip_plural(token: &str) -> String {
    let len = token.chars().count();
    if len > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..token.len() - 3]);
    }
    if len > 3 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us") {
        return token[..token.len() - 1].to_string();
    }
    if len > 3 && token.ends_with("aux") {
        return format!("{}al", &token[..token.len() - 3]);
    }
    token.to_string()
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Rule-based provider for every capability except generation
pub struct LexicalCapabilities {
    caps: CapabilitySet,
    generator: Option<Box<dyn TextGenerator>>,
}

impl Default for LexicalCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalCapabilities {
    pub fn new() -> Self {
        Self {
            caps: CapabilitySet::all().without(Capability::Generate),
            generator: None,
        }
    }

    /// Attach a generation backend, making `generate` available
    pub fn with_generator(mut self, generator: Box<dyn TextGenerator>) -> Self {
        self.caps = self.caps.with(Capability::Generate);
        self.generator = Some(generator);
        self
    }

    /// Switch capabilities off for the lifetime of this provider
    pub fn without(mut self, disabled: &[Capability]) -> Self {
        for capability in disabled {
            self.caps = self.caps.without(*capability);
        }
        info!(
            "Lexical capabilities: {}",
            self.caps
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self
    }

    fn require(&self, capability: Capability) -> Result<(), CapabilityError> {
        if self.caps.is_available(capability) {
            Ok(())
        } else {
            Err(CapabilityError::Unavailable(capability))
        }
    }

    fn normalize(&self, text: &str) -> Vec<String> {
        WORD_RE
            .find_iter(&text.to_lowercase())
            .map(|m| strip_plural(&fold_accents(m.as_str())))
            .collect()
    }
}

impl LanguageCapabilities for LexicalCapabilities {
    fn capabilities(&self) -> &CapabilitySet {
        &self.caps
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, CapabilityError> {
        self.require(Capability::Tokenize)?;
        Ok(WORD_RE
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect())
    }

    fn lemmatize(&self, tokens: &[String]) -> Result<Vec<String>, CapabilityError> {
        self.require(Capability::Lemmatize)?;
        Ok(tokens
            .iter()
            .map(|t| strip_plural(&fold_accents(&t.to_lowercase())))
            .collect())
    }

    /// `NUM` for numbers, `FUNC` for stopwords, `PROPN` for capitalised
    /// words inside a sentence, `WORD` otherwise
    fn pos_tags(&self, text: &str) -> Result<Vec<(String, String)>, CapabilityError> {
        self.require(Capability::PosTag)?;

        Ok(WORD_RE
            .find_iter(text)
            .map(|m| {
                let word = m.as_str();
                let tag = if word.chars().all(char::is_numeric) {
                    "NUM"
                } else if STOPWORD_SET.contains(word.to_lowercase().as_str()) {
                    "FUNC"
                } else if word.chars().next().is_some_and(char::is_uppercase)
                    && !starts_sentence(text, m.start())
                {
                    "PROPN"
                } else {
                    "WORD"
                };
                (word.to_string(), tag.to_string())
            })
            .collect())
    }

    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, CapabilityError> {
        self.require(Capability::Ner)?;

        let mut found: Vec<(usize, Entity)> = Vec::new();
        for m in PROPER_RE.find_iter(text) {
            let single_word = !m.as_str().contains(char::is_whitespace);
            if single_word && starts_sentence(text, m.start()) {
                continue;
            }
            found.push((
                m.start(),
                Entity {
                    text: m.as_str().to_string(),
                    label: "PROPER".to_string(),
                },
            ));
        }
        for m in NUMBER_RE.find_iter(text) {
            found.push((
                m.start(),
                Entity {
                    text: m.as_str().to_string(),
                    label: "NUMBER".to_string(),
                },
            ));
        }

        found.sort_by_key(|(pos, _)| *pos);
        Ok(found.into_iter().map(|(_, e)| e).collect())
    }

    fn sentiment(&self, text: &str) -> Result<Sentiment, CapabilityError> {
        self.require(Capability::Sentiment)?;

        let truncated: String = text.chars().take(SENTIMENT_INPUT_LIMIT).collect();
        let words = self.normalize(&truncated);
        let positive = words
            .iter()
            .filter(|w| POSITIVE_WORDS.contains(&w.as_str()))
            .count();
        let negative = words
            .iter()
            .filter(|w| NEGATIVE_WORDS.contains(&w.as_str()))
            .count();

        let total = positive + negative;
        let (label, score) = if positive > negative {
            ("POSITIVE", positive as f32 / total as f32)
        } else if negative > positive {
            ("NEGATIVE", negative as f32 / total as f32)
        } else {
            ("NEUTRAL", 0.5)
        };

        Ok(Sentiment {
            label: label.to_string(),
            score,
        })
    }

    fn similarity(&self, a: &str, b: &str) -> Result<f32, CapabilityError> {
        self.require(Capability::Similarity)?;

        let a = self.normalize(a).join(" ");
        let b = self.normalize(b).join(" ");
        if a.is_empty() || b.is_empty() {
            return Ok(0.0);
        }
        Ok(strsim::sorensen_dice(&a, &b).clamp(0.0, 1.0) as f32)
    }

    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<String>, CapabilityError> {
        match &self.generator {
            Some(generator) if self.caps.is_available(Capability::Generate) => {
                generator.generate(prompt, params)
            }
            _ => Err(CapabilityError::Unavailable(Capability::Generate)),
        }
    }
}
