//! CLI for converting between note files and token files
//!
//! Usage:
//!   notetok tokenize <notes.txt> [-o tokens.txt]
//!   notetok untokenize <tokens.txt> [-o notes.txt]
//!   notetok repair <tokens.txt> [-o fixed.txt]
//!   notetok vocab [-o vocab.json]
//!
//! Token files hold one sequence per line. Every command accepts
//! `--config <file.json>`, `--eps` and `--velocity-bins`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{info, LevelFilter};

use notetok::format::{parse_notes, parse_token_sequences, write_notes, write_token_line};
use notetok::{NoLossTokenizer, TokenizerConfig};

#[derive(Parser, Debug)]
#[command(name = "notetok", about = "Tokenize MIDI notes and decode tokens back into notes")]
struct Cli {
    #[command(flatten)]
    codec: CodecArgs,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// JSON file with `eps` and `n_velocity_bins`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal time step in seconds (overrides the config file)
    #[arg(long, global = true)]
    eps: Option<f64>,

    /// Number of velocity bins (overrides the config file)
    #[arg(long, global = true)]
    velocity_bins: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a note file into a single token line
    Tokenize {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode every token line into notes
    Untokenize {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Repair unmatched note-on/note-off tokens, line by line
    Repair {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the vocabulary as JSON
    Vocab {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };

    // RUST_LOG, when set, takes precedence over -v/-q
    let default_filter = level.to_string().to_lowercase();
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn load_config(args: &CodecArgs) -> Result<TokenizerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => TokenizerConfig::default(),
    };
    if let Some(eps) = args.eps {
        config.eps = eps;
    }
    if let Some(bins) = args.velocity_bins {
        config.n_velocity_bins = bins;
    }
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn run_tokenize(tokenizer: &NoLossTokenizer, input: &Path, output: Option<&Path>) -> Result<()> {
    let notes = parse_notes(&read_input(input)?)
        .with_context(|| format!("parsing notes in {}", input.display()))?;
    let tokens = tokenizer
        .tokenize(&notes)
        .with_context(|| format!("tokenizing {}", input.display()))?;
    info!("{} notes -> {} tokens", notes.len(), tokens.len());
    write_output(output, &write_token_line(&tokens))
}

fn run_untokenize(tokenizer: &NoLossTokenizer, input: &Path, output: Option<&Path>) -> Result<()> {
    let sequences = parse_token_sequences(&read_input(input)?, tokenizer.vocab())
        .with_context(|| format!("parsing tokens in {}", input.display()))?;

    let mut content = String::new();
    for (i, tokens) in sequences.iter().enumerate() {
        let notes = tokenizer
            .untokenize(tokens)
            .with_context(|| format!("decoding sequence {}", i + 1))?;
        if sequences.len() > 1 {
            content.push_str(&format!("# sequence {}\n", i + 1));
        }
        content.push_str(&write_notes(&notes));
    }
    info!("decoded {} sequences", sequences.len());
    write_output(output, &content)
}

fn run_repair(tokenizer: &NoLossTokenizer, input: &Path, output: Option<&Path>) -> Result<()> {
    let sequences = parse_token_sequences(&read_input(input)?, tokenizer.vocab())
        .with_context(|| format!("parsing tokens in {}", input.display()))?;

    let mut content = String::new();
    let mut changed = 0;
    for tokens in &sequences {
        let fixed = tokenizer.fix_token_sequences(tokens)?;
        if fixed.len() != tokens.len() {
            changed += 1;
        }
        content.push_str(&write_token_line(&fixed));
    }
    info!("repaired {changed} of {} sequences", sequences.len());
    write_output(output, &content)
}

fn run_vocab(tokenizer: &NoLossTokenizer, output: Option<&Path>) -> Result<()> {
    let mut json = serde_json::to_string_pretty(&tokenizer.export_vocab())?;
    json.push('\n');
    info!("vocabulary size: {}", tokenizer.vocab_size());
    write_output(output, &json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = load_config(&cli.codec)?;
    let tokenizer = NoLossTokenizer::new(config).context("building tokenizer")?;
    info!(
        "{}: eps={}, n_velocity_bins={}",
        tokenizer.name(),
        config.eps,
        config.n_velocity_bins
    );

    match &cli.command {
        Command::Tokenize { input, output } => run_tokenize(&tokenizer, input, output.as_deref()),
        Command::Untokenize { input, output } => {
            run_untokenize(&tokenizer, input, output.as_deref())
        }
        Command::Repair { input, output } => run_repair(&tokenizer, input, output.as_deref()),
        Command::Vocab { output } => run_vocab(&tokenizer, output.as_deref()),
    }
}
