//! Session configuration
//!
//! Tunable constants live here rather than as literals in the matching code.
//! The semantic threshold and the sentence-boundary truncation are inherited
//! heuristics, kept configurable because nothing shows they are optimal.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Minimum similarity a semantic match must exceed
pub const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.7;

/// Characters that end a sentence when trimming generated text
pub const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '…'];

/// Keywords reported in diagnostics
pub const MAX_DIAGNOSTIC_KEYWORDS: usize = 5;

/// Characters of input passed to sentiment scoring
pub const SENTIMENT_INPUT_LIMIT: usize = 512;

pub const MAX_LENGTH_RANGE: (usize, usize) = (10, 200);
pub const NUM_VARIANTS_RANGE: (usize, usize) = (1, 5);
pub const TEMPERATURE_RANGE: (f32, f32) = (0.1, 2.0);
pub const THRESHOLD_RANGE: (f32, f32) = (0.0, 1.0);

// =============================================================================
// GENERATION PARAMETERS
// =============================================================================

/// Bounded parameters passed to the text generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Maximum generated length, in tokens
    pub max_length: usize,
    /// Number of continuations to request
    pub num_variants: usize,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 50,
            num_variants: 1,
            temperature: 0.7,
        }
    }
}

impl GenerationParams {
    pub fn new(
        max_length: usize,
        num_variants: usize,
        temperature: f32,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            max_length,
            num_variants,
            temperature,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "max_length",
            self.max_length as f64,
            MAX_LENGTH_RANGE.0 as f64,
            MAX_LENGTH_RANGE.1 as f64,
        )?;
        check_range(
            "num_variants",
            self.num_variants as f64,
            NUM_VARIANTS_RANGE.0 as f64,
            NUM_VARIANTS_RANGE.1 as f64,
        )?;
        check_range(
            "temperature",
            self.temperature as f64,
            TEMPERATURE_RANGE.0 as f64,
            TEMPERATURE_RANGE.1 as f64,
        )
    }
}

// =============================================================================
// SESSION CONFIG
// =============================================================================

/// Text compared against the utterance by the semantic tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativeMode {
    /// All patterns joined with spaces
    #[default]
    Concatenated,
    /// The first declared pattern only
    FirstPattern,
}

/// Preset configurations matching the shell modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    Plain,
    Nlp,
    NlpVerbose,
    Generation,
}

/// Per-session configuration. The only state a session holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Enables the normalized and semantic tiers
    pub nlp_enabled: bool,
    /// Attach diagnostics to every turn
    pub verbose_analysis: bool,
    /// Try generated replies before the rule-based ones
    pub generation_enabled: bool,
    pub generation: GenerationParams,
    pub semantic_threshold: f32,
    pub representative: RepresentativeMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            nlp_enabled: false,
            verbose_analysis: false,
            generation_enabled: false,
            generation: GenerationParams::default(),
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
            representative: RepresentativeMode::default(),
        }
    }
}

impl SessionConfig {
    pub fn for_mode(mode: SessionMode) -> Self {
        let base = Self::default();
        match mode {
            SessionMode::Plain => base,
            SessionMode::Nlp => Self {
                nlp_enabled: true,
                ..base
            },
            SessionMode::NlpVerbose => Self {
                nlp_enabled: true,
                verbose_analysis: true,
                ..base
            },
            SessionMode::Generation => Self {
                nlp_enabled: true,
                generation_enabled: true,
                ..base
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        check_range(
            "semantic_threshold",
            self.semantic_threshold as f64,
            THRESHOLD_RANGE.0 as f64,
            THRESHOLD_RANGE.1 as f64,
        )
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
