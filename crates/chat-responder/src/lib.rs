//! FAQ Chat Responder
//!
//! Maps a user utterance to one of the intents of a knowledge base and
//! answers with one of that intent's responses, optionally replacing it with
//! generated text. Matching degrades gracefully with the language
//! capabilities that happen to be available.
//!
//! # Architecture
//!
//! ```text
//! Utterance
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  IntentResolver                         │
//! │  Exact → Normalized → Semantic          │
//! │  (first tier with a match wins)         │
//! └─────────────────────────────────────────┘
//!       │ ResolutionDecision
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  ResponseSelector                       │
//! │  Generated → Intent → default → fixed   │
//! └─────────────────────────────────────────┘
//!       │
//!       ├─── verbose ───► Diagnostics (sentiment, entities, keywords)
//!       ▼
//! TurnOutput
//! ```
//!
//! Language capabilities (tokenize, lemmatize, NER, sentiment, similarity,
//! generation) are reached through [`LanguageCapabilities`] and each may be
//! unavailable independently. Missing or failing capabilities skip a tier or
//! a fallback link; they never fail a turn.

pub mod capabilities;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod knowledge_base;
pub mod resolver;
pub mod selector;
pub mod session;
pub mod tiers;
pub mod types;

pub use capabilities::{LanguageCapabilities, LexicalCapabilities, NoCapabilities, TextGenerator};
pub use config::{GenerationParams, RepresentativeMode, SessionConfig, SessionMode};
pub use diagnostics::Diagnostics;
pub use error::{CapabilityError, ConfigError, KnowledgeBaseError};
pub use knowledge_base::{Intent, KnowledgeBase};
pub use resolver::IntentResolver;
pub use selector::{ResponseSelector, DEFAULT_RESPONSE, EMPTY_INPUT_RESPONSE};
pub use session::DialogueSession;
pub use tiers::{ExactTier, MatchStrategy, NormalizedTier, SemanticTier, TierMatch};
pub use types::*;
