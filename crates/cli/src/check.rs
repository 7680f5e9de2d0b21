//! `tqa check`, `tqa split`, `tqa validate`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use transqa_audit::config::{LabelPolicy, SimilarityPolicy};
use transqa_audit::embed::{self, Embedder};
use transqa_audit::report::write_csv;
use transqa_audit::{
    check_texts, AuditConfig, AuditReport, Auditor, CoarseAligner, FixedAligner, Issue,
    LanguageHint, LineSplitter, PositionalAligner, RuleSplitter, SentenceSplitter, TableEmbedder,
    TextHints,
};

use crate::exit_codes::{EXIT_AUDIT_INVALID_CONFIG, EXIT_ISSUES};
use crate::CliError;

/// Issues listed in the human summary before it is cut short.
const SUMMARY_ISSUE_LIMIT: usize = 20;

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Mean,
    MinPairwise,
}

impl From<PolicyArg> for SimilarityPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Mean => SimilarityPolicy::Mean,
            PolicyArg::MinPairwise => SimilarityPolicy::MinPairwise,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LabelPolicyArg {
    FirstRow,
    EveryRow,
}

impl From<LabelPolicyArg> for LabelPolicy {
    fn from(arg: LabelPolicyArg) -> Self {
        match arg {
            LabelPolicyArg::FirstRow => LabelPolicy::FirstRow,
            LabelPolicyArg::EveryRow => LabelPolicy::EveryRow,
        }
    }
}

#[derive(Args)]
pub struct CheckArgs {
    /// Source text file
    pub source: PathBuf,

    /// Target (translated) text file
    pub target: PathBuf,

    /// Audit config (TOML). Flags below override its values.
    #[arg(long, env = "TQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Precomputed alignment groups (JSON) instead of positional pairing
    #[arg(long)]
    pub alignment: Option<PathBuf>,

    /// Precomputed sentence embeddings (JSON object text -> vector)
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// Inputs are already split: one sentence per line
    #[arg(long)]
    pub presplit: bool,

    /// Source language hint ("auto" or a code such as en)
    #[arg(long, value_name = "LANG")]
    pub source_lang: Option<String>,

    /// Target language hint ("auto" or a code such as zh)
    #[arg(long, value_name = "LANG")]
    pub target_lang: Option<String>,

    /// Groups scoring below this are flagged as low similarity
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub similarity_threshold: Option<f32>,

    /// Groups scoring below this are dissolved into omissions and additions
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub force_split_threshold: Option<f32>,

    /// Similarity policy for multi-sentence groups
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Try splitting N:N groups into positional 1:1 pairs
    #[arg(long)]
    pub auto_split: bool,

    /// Attach similarity and label to the first row of a group or to every row
    #[arg(long, value_enum)]
    pub label_policy: Option<LabelPolicyArg>,

    /// Write the row table as CSV (file path, or - for stdout)
    #[arg(long, value_name = "FILE")]
    pub csv: Option<String>,

    /// Print the full JSON report to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the full JSON report to a file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit 1 when any issue is found
    #[arg(long)]
    pub strict_exit: bool,

    /// Suppress the human summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

// ============================================================================
// check
// ============================================================================

pub fn cmd_check(args: CheckArgs) -> Result<(), CliError> {
    if args.json && args.csv.as_deref() == Some("-") {
        return Err(CliError::usage("--json and --csv - both write to stdout")
            .with_hint("send one of them to a file, e.g. --csv report.csv"));
    }

    let (mut config, base_dir) = match &args.config {
        Some(path) => (load_config(path)?, config_dir(path)),
        None => (AuditConfig::default(), PathBuf::from(".")),
    };
    apply_overrides(&mut config, &args);
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_AUDIT_INVALID_CONFIG, e.to_string()))?;

    let embedder: Box<dyn Embedder> = match &args.embeddings {
        Some(path) => Box::new(TableEmbedder::load(path)?),
        None => embed::from_config(&config.embedder, &base_dir)?,
    };

    let mut hints = TextHints::from(&config.splitter);
    if let Some(lang) = &args.source_lang {
        hints.source = LanguageHint::parse(lang);
    }
    if let Some(lang) = &args.target_lang {
        hints.target = LanguageHint::parse(lang);
    }

    let splitter: &dyn SentenceSplitter = if args.presplit {
        &LineSplitter
    } else {
        &RuleSplitter
    };
    let aligner: Box<dyn CoarseAligner> = match &args.alignment {
        Some(path) => Box::new(FixedAligner::load(path)?),
        None => Box::new(PositionalAligner),
    };

    let source_text = read_text(&args.source)?;
    let target_text = read_text(&args.target)?;

    let auditor = Auditor::new(config, embedder)?;
    let report = check_texts(
        &auditor,
        splitter,
        aligner.as_ref(),
        &source_text,
        &target_text,
        &hints,
    )?;

    write_outputs(&report, &args)?;

    if !args.quiet {
        print_summary(&report);
    }

    let issues = report.summary.total_issues;
    if args.strict_exit && issues > 0 {
        return Err(CliError::new(EXIT_ISSUES, format!("{issues} issue(s) found")));
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<AuditConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(
            EXIT_AUDIT_INVALID_CONFIG,
            format!("cannot read config {}: {e}", path.display()),
        )
    })?;
    Ok(AuditConfig::from_toml(&text)?)
}

/// Relative paths inside a config resolve against the config's directory.
fn config_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn apply_overrides(config: &mut AuditConfig, args: &CheckArgs) {
    if let Some(x) = args.similarity_threshold {
        config.thresholds.similarity = x;
    }
    if let Some(x) = args.force_split_threshold {
        config.thresholds.force_split = x;
    }
    if let Some(policy) = args.policy {
        config.scoring.policy = policy.into();
    }
    if args.auto_split {
        config.scoring.auto_split = true;
    }
    if let Some(label_policy) = args.label_policy {
        config.report.label_policy = label_policy.into();
    }
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::input(format!("cannot read {}: {e}", path.display())))
}

fn write_outputs(report: &AuditReport, args: &CheckArgs) -> Result<(), CliError> {
    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(report)
            .map_err(|e| CliError::input(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::input(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    match args.csv.as_deref() {
        Some("-") => {
            let stdout = std::io::stdout();
            write_csv(&report.rows, stdout.lock())?;
        }
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| CliError::input(format!("cannot write {path}: {e}")))?;
            write_csv(&report.rows, file)?;
            eprintln!("wrote {path}");
        }
        None => {}
    }
    Ok(())
}

fn print_summary(report: &AuditReport) {
    let m = &report.meta;
    let s = &report.summary;
    eprintln!(
        "audit '{}': {} source / {} target sentences, {} group(s) kept",
        m.config_name, m.source_sentences, m.target_sentences, s.kept_groups
    );
    eprintln!(
        "issues: {} omission(s), {} addition(s), {} low similarity ({} force-split, {} auto-split)",
        s.omission_count, s.addition_count, s.low_similarity_count, s.force_split_count, s.auto_split_count
    );

    for issue in report.issues.iter().take(SUMMARY_ISSUE_LIMIT) {
        match issue {
            Issue::Omission { src_index, src_text } => {
                eprintln!("  omission  src {src_index}: {}", clip(src_text));
            }
            Issue::Addition { tgt_index, tgt_text } => {
                eprintln!("  addition  tgt {tgt_index}: {}", clip(tgt_text));
            }
            Issue::LowSimilarity {
                src_indices,
                tgt_indices,
                src_text,
                tgt_text,
                similarity,
            } => {
                eprintln!(
                    "  low {similarity:.4} src {src_indices:?} -> tgt {tgt_indices:?}: {} => {}",
                    clip(src_text),
                    clip(tgt_text)
                );
            }
        }
    }
    if report.issues.len() > SUMMARY_ISSUE_LIMIT {
        eprintln!("  ... and {} more", report.issues.len() - SUMMARY_ISSUE_LIMIT);
    }
}

fn clip(text: &str) -> String {
    const MAX: usize = 60;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}

// ============================================================================
// split
// ============================================================================

pub fn cmd_split(file: PathBuf, lang: String, json: bool) -> Result<(), CliError> {
    let text = read_text(&file)?;
    let sentences = RuleSplitter.split(&text, &LanguageHint::parse(&lang));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        let json_str = serde_json::to_string_pretty(&sentences)
            .map_err(|e| CliError::input(format!("JSON serialization error: {e}")))?;
        writeln!(out, "{json_str}").map_err(|e| CliError::input(e.to_string()))?;
    } else {
        for (i, sentence) in sentences.iter().enumerate() {
            writeln!(out, "{i}\t{sentence}").map_err(|e| CliError::input(e.to_string()))?;
        }
    }
    log::info!("{} sentence(s) from {}", sentences.len(), file.display());
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: audit '{}' (similarity {}, force_split {}, policy {}, auto_split {})",
        config.name,
        config.thresholds.similarity,
        config.thresholds.force_split,
        config.scoring.policy,
        config.scoring.auto_split,
    );
    Ok(())
}
