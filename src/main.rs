use phpdoc_checker::analyzer;
use phpdoc_checker::analyzer::config::AnalyzerConfig;
use serde_json::to_writer_pretty;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

/// Entry point for the PHPDoc annotation extractor CLI.
#[derive(Parser)]
#[command(author, version, about = "Extracts structured PHPDoc annotations from PHP sources.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract doc-comment annotations from a PHP file or directory.
    Extract {
        /// Path to a PHP file, directory, or glob pattern.
        path: PathBuf,
        /// Choose the CLI output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Parse a single doc comment read from a file or stdin and print
    /// the resulting model. Intended for debugging annotation issues.
    Comment {
        /// Path to a file holding one raw `/** ... */` comment; `-` reads
        /// from stdin.
        path: PathBuf,
        /// Declaration kind to parse the comment against.
        #[arg(long, value_enum, default_value_t = KindArg::Method)]
        kind: KindArg,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum KindArg {
    Class,
    Variable,
    Property,
    Const,
    Method,
    Function,
    Closure,
}

impl KindArg {
    fn to_kind(self) -> analyzer::comment::CommentKind {
        use analyzer::comment::CommentKind;
        match self {
            KindArg::Class => CommentKind::Class,
            KindArg::Variable => CommentKind::Variable,
            KindArg::Property => CommentKind::Property,
            KindArg::Const => CommentKind::Const,
            KindArg::Method => CommentKind::Method,
            KindArg::Function => CommentKind::Function,
            KindArg::Closure => CommentKind::Closure,
        }
    }
}

struct ExtractionTargets {
    canonical_targets: Vec<PathBuf>,
    analysis_root: PathBuf,
    config: Option<AnalyzerConfig>,
}

impl ExtractionTargets {
    fn new(path: &Path, config_path: Option<PathBuf>) -> Result<Self> {
        let requested_targets = resolve_targets(path)?;
        let canonical_targets = canonicalize_paths(requested_targets)?;
        let analysis_root = derive_analysis_root(&canonical_targets);

        let config_file = AnalyzerConfig::find_config(config_path, &analysis_root);
        let config = if let Some(path) = config_file {
            Some(AnalyzerConfig::load(path)?)
        } else {
            None
        };

        Ok(Self {
            canonical_targets,
            analysis_root,
            config,
        })
    }

    fn collect_php_files(&self) -> Result<Vec<PathBuf>> {
        analyzer::collect_php_files_from_roots(&self.canonical_targets)
    }
}

fn main() -> Result<()> {
    let Cli { command, config } = Cli::parse();

    match command {
        Commands::Extract { path, format } => run_extract(path, config, format),
        Commands::Comment { path, kind, format } => {
            run_single_comment(path, config, kind, format)
        }
    }
}

fn run_extract(path: PathBuf, config_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let targets = ExtractionTargets::new(&path, config_path)?;
    let php_files = targets.collect_php_files()?;

    if php_files.is_empty() {
        println!(
            "No PHP files found under {}",
            targets.analysis_root.display()
        );
        return Ok(());
    }

    let analyzer = analyzer::Analyzer::new(targets.config.clone());
    let show_progress = matches!(format, OutputFormat::Text);

    let progress = if show_progress {
        let pb = ProgressBar::new(php_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                .expect("valid progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let reports = analyzer.extract_files_with_progress(&php_files, progress.as_ref())?;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let comment_count: usize = reports.iter().map(|report| report.comments.len()).sum();

    match format {
        OutputFormat::Text => {
            for report in &reports {
                print!("{report}");
            }
            println!(
                "Extracted {} doc comment(s) from {} PHP file(s) in {:.2}s",
                comment_count,
                php_files.len(),
                start.elapsed().as_secs_f64()
            );
        }
        OutputFormat::Json => {
            let output: Vec<_> = reports.iter().map(|report| report.to_json()).collect();
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            to_writer_pretty(&mut handle, &output)?;
            handle.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn run_single_comment(
    path: PathBuf,
    config_path: Option<PathBuf>,
    kind: KindArg,
    format: OutputFormat,
) -> Result<()> {
    use analyzer::comment::{Comment, Context as PhpContext};
    use analyzer::extract::ExtractedComment;

    let text = if path == Path::new("-") {
        io::read_to_string(io::stdin()).context("failed to read comment from stdin")?
    } else {
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    let config = match config_path {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    let kind = kind.to_kind();
    let comment =
        Comment::from_str_in_context(&text, 1, kind, &PhpContext::new(), &config);
    let report = analyzer::FileReport {
        file: path,
        comments: vec![ExtractedComment {
            line: 1,
            kind,
            comment,
        }],
    };

    match format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            to_writer_pretty(&mut handle, &report.to_json())?;
            handle.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn resolve_targets(path: &Path) -> Result<Vec<PathBuf>> {
    if path_contains_glob(path) {
        let pattern = path.as_os_str().to_string_lossy().into_owned();
        let matches = glob(&pattern)
            .with_context(|| format!("invalid glob pattern \"{pattern}\""))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to read entries for pattern \"{pattern}\""))?;

        if matches.is_empty() {
            bail!("no files matched \"{pattern}\"");
        }

        Ok(matches)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn path_contains_glob(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .contains(['*', '?', '['])
}

fn canonicalize_paths(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut canonical_paths = Vec::new();
    for path in paths {
        let canonical_path = path
            .canonicalize()
            .with_context(|| format!("failed to access {}", path.display()))?;
        canonical_paths.push(canonical_path);
    }
    canonical_paths.sort();
    canonical_paths.dedup();
    Ok(canonical_paths)
}

fn derive_analysis_root(targets: &[PathBuf]) -> PathBuf {
    let directories: Vec<PathBuf> = targets
        .iter()
        .map(|target| {
            if target.is_file() {
                target
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| target.clone())
            } else {
                target.clone()
            }
        })
        .collect();

    directories
        .first()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}
