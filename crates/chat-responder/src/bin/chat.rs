//! Interactive FAQ chat shell
//!
//! # Usage
//!
//! Built with the `cli` feature: `cargo run --features cli --bin chat`.
//!
//! ```bash
//! # Keyword matching only, bundled French FAQ
//! chat
//!
//! # Lemma and similarity tiers, with per-turn diagnostics
//! chat --nlp --verbose
//!
//! # Custom knowledge base, reproducible replies, single question
//! chat --kb faq.json --seed 42 --once "Quels sont vos horaires ?"
//!
//! # Generated replies (build with --features openai, needs OPENAI_API_KEY)
//! chat --gpt
//! ```

use anyhow::{anyhow, Context, Result};
use chat_responder::{
    Capability, DialogueSession, Diagnostics, KnowledgeBase, LanguageCapabilities,
    LexicalCapabilities, SessionConfig, SessionMode, TurnOutput,
};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Knowledge base used when `--kb` is not given
const BUNDLED_FAQ: &str = include_str!("../../data/faq.json");

const QUIT_WORDS: &[&str] = &["quit", "exit", "quitter"];
const FAREWELL: &str = "Au revoir ! À bientôt !";

#[derive(Parser)]
#[command(name = "chat")]
#[command(version = "0.1.0")]
#[command(about = "FAQ chatbot with tiered intent matching")]
struct Cli {
    /// Knowledge base JSON file (bundled FAQ if omitted)
    #[arg(long, env = "CHAT_KB")]
    kb: Option<PathBuf>,

    /// Session mode
    #[arg(long, env = "CHAT_MODE", value_enum, default_value = "plain")]
    mode: ModeArg,

    /// Enable lemma and similarity matching (same as --mode nlp)
    #[arg(long)]
    nlp: bool,

    /// Show diagnostics after each reply (implies --nlp, combines with --gpt)
    #[arg(long, short)]
    verbose: bool,

    /// Generate replies with the language model (implies --nlp)
    #[arg(long)]
    gpt: bool,

    /// Seed for reproducible response choices
    #[arg(long, env = "CHAT_SEED")]
    seed: Option<u64>,

    /// Capabilities to switch off, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    disable: Vec<CapabilityArg>,

    /// Answer a single utterance and exit
    #[arg(long)]
    once: Option<String>,

    /// Print each turn as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Plain,
    Nlp,
    NlpVerbose,
    Generation,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CapabilityArg {
    Tokenize,
    Lemmatize,
    PosTag,
    Ner,
    Sentiment,
    Similarity,
    Generate,
}

impl From<CapabilityArg> for Capability {
    fn from(arg: CapabilityArg) -> Self {
        match arg {
            CapabilityArg::Tokenize => Capability::Tokenize,
            CapabilityArg::Lemmatize => Capability::Lemmatize,
            CapabilityArg::PosTag => Capability::PosTag,
            CapabilityArg::Ner => Capability::Ner,
            CapabilityArg::Sentiment => Capability::Sentiment,
            CapabilityArg::Similarity => Capability::Similarity,
            CapabilityArg::Generate => Capability::Generate,
        }
    }
}

impl From<ModeArg> for SessionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Plain => SessionMode::Plain,
            ModeArg::Nlp => SessionMode::Nlp,
            ModeArg::NlpVerbose => SessionMode::NlpVerbose,
            ModeArg::Generation => SessionMode::Generation,
        }
    }
}

impl Cli {
    /// The `--mode` preset with every shorthand flag switched on top of it
    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::for_mode(self.mode.into());
        config.nlp_enabled |= self.nlp || self.verbose || self.gpt;
        config.verbose_analysis |= self.verbose;
        config.generation_enabled |= self.gpt;
        config
    }
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_responder=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let kb = match &cli.kb {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("Failed to load knowledge base {}", path.display()))?,
        None => KnowledgeBase::from_json_str(BUNDLED_FAQ)
            .context("Bundled knowledge base is invalid")?,
    };

    let config = cli.session_config();
    let caps = build_capabilities(&cli.disable, config.generation_enabled);

    let kb = Arc::new(kb);
    let mut session = match cli.seed {
        Some(seed) => DialogueSession::seeded(kb, caps, config, seed)?,
        None => DialogueSession::new(kb, caps, config)?,
    };

    if let Some(utterance) = &cli.once {
        let output = session.turn(utterance);
        print_turn(&output, cli.json)?;
        return Ok(());
    }

    if session.config().generation_enabled
        && !session.capabilities().is_available(Capability::Generate)
    {
        println!(
            "{}",
            "Génération indisponible : réponses prédéfinies uniquement.".yellow()
        );
    }

    chat_loop(&mut session, cli.json)
}

#[cfg_attr(not(feature = "openai"), allow(unused_variables))]
fn build_capabilities(disable: &[CapabilityArg], generation: bool) -> LexicalCapabilities {
    let disabled: Vec<Capability> = disable.iter().map(|c| (*c).into()).collect();
    let caps = LexicalCapabilities::new();

    #[cfg(feature = "openai")]
    let caps = if generation {
        match chat_responder::capabilities::OpenAiGenerator::from_env() {
            Ok(generator) => caps.with_generator(Box::new(generator)),
            Err(e) => {
                tracing::warn!("OpenAI generator unavailable: {:#}", e);
                caps
            }
        }
    } else {
        caps
    };

    caps.without(&disabled)
}

fn chat_loop(session: &mut DialogueSession<LexicalCapabilities>, json: bool) -> Result<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| anyhow!("Failed to initialize line editor: {}", e))?;

    println!("{}", "=".repeat(50));
    println!("Chatbot FAQ - Tapez 'quit' ou 'exit' pour quitter");
    println!("{}", "=".repeat(50));
    println!();

    loop {
        match editor.readline("Vous: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if QUIT_WORDS.contains(&line.to_lowercase().as_str()) {
                    println!("{} {}", "Bot:".green().bold(), FAREWELL);
                    return Ok(());
                }
                let _ = editor.add_history_entry(line);

                let output = session.turn(line);
                print_turn(&output, json)?;
                println!();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{} {}", "Bot:".green().bold(), FAREWELL);
                return Ok(());
            }
            Err(e) => return Err(anyhow!("Failed to read input: {}", e)),
        }
    }
}

fn print_turn(output: &TurnOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    println!("{} {}", "Bot:".green().bold(), output.text);
    if let Some(diagnostics) = &output.diagnostics {
        print_diagnostics(diagnostics);
    }
    Ok(())
}

fn print_diagnostics(d: &Diagnostics) {
    let intent = d.intent.as_deref().unwrap_or("-");
    println!("  {} {} ({})", "intent:".dimmed(), intent, d.tier);
    if let Some(evidence) = &d.evidence {
        println!("  {} {}", "evidence:".dimmed(), evidence);
    }
    if let Some(sentiment) = &d.sentiment {
        println!(
            "  {} {} ({:.2})",
            "sentiment:".dimmed(),
            sentiment.label,
            sentiment.score
        );
    }
    if !d.entities.is_empty() {
        let entities: Vec<String> = d
            .entities
            .iter()
            .map(|e| format!("{} [{}]", e.text, e.label))
            .collect();
        println!("  {} {}", "entities:".dimmed(), entities.join(", "));
    }
    if !d.pos_tags.is_empty() {
        let tags: Vec<String> = d
            .pos_tags
            .iter()
            .map(|(token, tag)| format!("{}/{}", token, tag))
            .collect();
        println!("  {} {}", "pos:".dimmed(), tags.join(" "));
    }
    if !d.keywords.is_empty() {
        println!("  {} {}", "keywords:".dimmed(), d.keywords.join(", "));
    }
    if !d.degraded.is_empty() {
        let degraded: Vec<&str> = d.degraded.iter().map(|c| c.name()).collect();
        println!("  {} {}", "degraded:".yellow(), degraded.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(args: &[&str]) -> SessionConfig {
        let argv = std::iter::once("chat").chain(args.iter().copied());
        Cli::parse_from(argv).session_config()
    }

    #[test]
    fn test_plain_mode_is_default_config() {
        assert_eq!(config_from(&["--mode", "plain"]), SessionConfig::default());
    }

    #[test]
    fn test_gpt_and_verbose_combine() {
        let config = config_from(&["--mode", "plain", "--gpt", "--verbose"]);
        assert!(config.nlp_enabled);
        assert!(config.generation_enabled);
        assert!(config.verbose_analysis);
    }

    #[test]
    fn test_flags_add_to_mode_preset() {
        let config = config_from(&["--mode", "nlp-verbose", "--gpt"]);
        assert!(config.verbose_analysis);
        assert!(config.generation_enabled);

        let config = config_from(&["--mode", "plain", "--nlp"]);
        assert!(config.nlp_enabled);
        assert!(!config.verbose_analysis);
        assert!(!config.generation_enabled);
    }

    #[test]
    fn test_disable_list() {
        let cli = Cli::parse_from(["chat", "--disable", "similarity,pos-tag"]);
        let caps = build_capabilities(&cli.disable, false);
        assert!(!caps.is_available(Capability::Similarity));
        assert!(!caps.is_available(Capability::PosTag));
        assert!(caps.is_available(Capability::Tokenize));
    }
}
