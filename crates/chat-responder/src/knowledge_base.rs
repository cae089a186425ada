//! Knowledge base of intents
//!
//! Loaded once from JSON and immutable afterwards. The file is an object keyed
//! by intent name:
//!
//! ```json
//! {
//!   "salutation": { "patterns": ["bonjour", "salut"], "responses": ["Salut !"] },
//!   "default":    { "responses": ["Je ne comprends pas."] }
//! }
//! ```
//!
//! Key order is the scan order of every matching tier, so it is preserved
//! exactly. The reserved `default` key is not an intent: its responses form
//! the fallback pool and it is never visible to the tiers.

use crate::error::KnowledgeBaseError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Reserved key holding the fallback response pool
pub const DEFAULT_INTENT_KEY: &str = "default";

/// A named request category with trigger patterns and candidate responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    name: String,
    patterns: Vec<String>,
    responses: Vec<String>,
}

impl Intent {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased, trimmed pattern keywords in declaration order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }
}

/// Ordered, validated collection of intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    intents: Vec<Intent>,
    index: HashMap<String, usize>,
    default_responses: Vec<String>,
}

impl KnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// Load and validate a knowledge base file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let path = path.as_ref();
        info!("Loading knowledge base from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, KnowledgeBaseError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeBaseError> {
        let RawEntries(entries) = serde_json::from_str(json)?;

        let mut builder = Self::builder();
        for (name, raw) in entries {
            if name == DEFAULT_INTENT_KEY {
                if builder.default_responses.is_some() {
                    return Err(KnowledgeBaseError::DuplicateIntent(name));
                }
                if !raw.patterns.is_empty() {
                    debug!("Ignoring patterns declared on the default entry");
                }
                builder = builder.default_responses(raw.responses);
            } else {
                builder = builder.intent(name, raw.patterns, raw.responses);
            }
        }

        let kb = builder.build()?;
        info!(
            "Knowledge base ready: {} intents, {} default responses",
            kb.len(),
            kb.default_responses.len()
        );
        Ok(kb)
    }

    /// Intents in scan order
    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn get(&self, name: &str) -> Option<&Intent> {
        self.index.get(name).map(|&i| &self.intents[i])
    }

    /// Responses of the `default` entry, empty when the file had none
    pub fn default_responses(&self) -> &[String] {
        &self.default_responses
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects intents and validates them on `build`
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    entries: Vec<(String, Vec<String>, Vec<String>)>,
    default_responses: Option<Vec<String>>,
}

impl KnowledgeBaseBuilder {
    pub fn intent<P, R>(mut self, name: impl Into<String>, patterns: P, responses: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.entries.push((
            name.into(),
            patterns.into_iter().map(Into::into).collect(),
            responses.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn default_responses<R>(mut self, responses: R) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.default_responses = Some(responses.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<KnowledgeBase, KnowledgeBaseError> {
        if self.entries.is_empty() {
            return Err(KnowledgeBaseError::Empty);
        }

        let mut intents = Vec::with_capacity(self.entries.len());
        let mut index = HashMap::with_capacity(self.entries.len());

        for (name, patterns, responses) in self.entries {
            if name == DEFAULT_INTENT_KEY || index.contains_key(&name) {
                return Err(KnowledgeBaseError::DuplicateIntent(name));
            }
            if patterns.is_empty() {
                return Err(KnowledgeBaseError::NoPatterns(name));
            }
            if responses.is_empty() {
                return Err(KnowledgeBaseError::NoResponses(name));
            }

            let mut normalized = Vec::with_capacity(patterns.len());
            for (i, pattern) in patterns.iter().enumerate() {
                let p = pattern.trim().to_lowercase();
                if p.is_empty() {
                    return Err(KnowledgeBaseError::BlankPattern {
                        intent: name,
                        index: i,
                    });
                }
                normalized.push(p);
            }
            check_responses(&name, &responses)?;

            index.insert(name.clone(), intents.len());
            intents.push(Intent {
                name,
                patterns: normalized,
                responses,
            });
        }

        let default_responses = match self.default_responses {
            Some(responses) => {
                if responses.is_empty() {
                    return Err(KnowledgeBaseError::NoResponses(
                        DEFAULT_INTENT_KEY.to_string(),
                    ));
                }
                check_responses(DEFAULT_INTENT_KEY, &responses)?;
                responses
            }
            None => Vec::new(),
        };

        Ok(KnowledgeBase {
            intents,
            index,
            default_responses,
        })
    }
}

fn check_responses(intent: &str, responses: &[String]) -> Result<(), KnowledgeBaseError> {
    match responses.iter().position(|r| r.trim().is_empty()) {
        Some(index) => Err(KnowledgeBaseError::BlankResponse {
            intent: intent.to_string(),
            index,
        }),
        None => Ok(()),
    }
}

// =============================================================================
// RAW JSON
// =============================================================================

#[derive(Deserialize)]
struct RawIntent {
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default)]
    responses: Vec<String>,
}

/// Map entries in file order, duplicates kept so they can be rejected
struct RawEntries(Vec<(String, RawIntent)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping intent names to patterns and responses")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, intent)) = map.next_entry::<String, RawIntent>()? {
                    entries.push((name, intent));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
