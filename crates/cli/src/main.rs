// tqa - translation audit from the command line

mod check;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use transqa_audit::AuditError;

use exit_codes::{audit_exit_code, EXIT_AUDIT_INPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tqa")]
#[command(about = "Audit a translation for omissions, additions and drifted passages")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit TARGET as a translation of SOURCE (exit 1 with --strict-exit if issues are found)
    #[command(after_help = "\
Without --alignment, sentences are paired by position. Without --embeddings,
the embedder from --config (default: character n-gram hashing) is used.

Examples:
  tqa check source.txt target.txt
  tqa check source.txt target.txt --alignment groups.json --embeddings vectors.json
  tqa check source.txt target.txt --config audit.toml --csv report.csv
  tqa check source.txt target.txt --json --strict-exit > report.json
  tqa check en.txt zh.txt --target-lang zh --policy min-pairwise --auto-split")]
    Check(check::CheckArgs),

    /// Split a text file into sentences
    #[command(after_help = "\
Examples:
  tqa split source.txt
  tqa split target.txt --lang zh --json > target.sentences.json")]
    Split {
        /// Text file to split
        file: PathBuf,

        /// Language hint ("auto" or a code such as en, zh)
        #[arg(long, default_value = "auto")]
        lang: String,

        /// Print a JSON array instead of numbered lines
        #[arg(long)]
        json: bool,
    },

    /// Validate an audit config without running
    #[command(after_help = "\
Examples:
  tqa validate audit.toml")]
    Validate {
        /// Path to the audit TOML config
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  transqa-audit ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  transqa-audit ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false);
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => check::cmd_check(args),
        Commands::Split { file, lang, json } => check::cmd_split(file, lang, json),
        Commands::Validate { config } => check::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::new(EXIT_AUDIT_INPUT, msg)
    }

    /// Engine error with its registry exit code and, where useful, a hint.
    pub fn audit(err: AuditError) -> Self {
        let code = audit_exit_code(&err);
        let hint = match &err {
            AuditError::ContractViolation { .. } => {
                Some("each sentence index may appear in at most one group, in increasing order".to_string())
            }
            AuditError::EmptyInput { .. } => Some("both texts must contain at least one sentence".to_string()),
            AuditError::Encoding(msg) if msg.starts_with("no embedding for") => {
                Some("the --embeddings table must contain every sentence exactly as split".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<AuditError> for CliError {
    fn from(err: AuditError) -> Self {
        Self::audit(err)
    }
}
