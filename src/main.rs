mod address;
mod diagnostics;
mod error;
mod grammar;
mod parser;
mod settings;
mod sink;
mod source;
mod text;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use diagnostics::{Diagnostics, NullDiagnostics, TraceFile};
use grammar::{FieldGrammar, GrammarVariant};
use settings::Settings;
use sink::Format;
use source::Source;

#[derive(Parser)]
#[command(
    name = "accession_converter",
    about = "Convert accession record documents into tabular rows"
)]
struct Cli {
    /// Settings file (default: ./accession.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from one .docx or .txt document
    Convert {
        input: PathBuf,
        /// Output file (default: output.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<Format>,
        /// Grammar preset
        #[arg(long, value_enum)]
        variant: Option<GrammarVariant>,
        /// Trace file for per-paragraph decisions
        #[arg(long, conflicts_with = "no_trace")]
        trace: Option<PathBuf>,
        #[arg(long)]
        no_trace: bool,
    },
    /// Convert every document in a directory, one output per document
    Batch {
        dir: PathBuf,
        /// Output directory (default: the input directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<Format>,
        #[arg(long, value_enum)]
        variant: Option<GrammarVariant>,
    },
    /// Print raw paragraphs for debugging document structure
    Dump {
        input: PathBuf,
        /// Also print every character with its code point
        #[arg(long)]
        chars: bool,
    },
    /// Show the output columns and title-case fields of a preset
    Labels {
        #[arg(long, value_enum)]
        variant: Option<GrammarVariant>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            variant,
            trace,
            no_trace,
        } => {
            apply_overrides(&mut settings, format, variant);
            if let Some(path) = trace {
                settings.trace_path = path;
            }
            if no_trace {
                settings.trace = false;
            }
            let output = output.unwrap_or_else(|| settings.format.default_output());
            let grammar = checked_grammar(&settings)?;
            let diagnostics: Box<dyn Diagnostics + Send> = if settings.trace {
                TraceFile::open_or_tracing(&settings.trace_path)
            } else {
                Box::new(NullDiagnostics)
            };

            let count = convert_document(&input, &output, &grammar, &settings, diagnostics)?;
            if count == 0 {
                println!("No records found");
            } else {
                println!("Processed {} records and saved to {}", count, output.display());
            }
            Ok(())
        }
        Commands::Batch {
            dir,
            output,
            format,
            variant,
        } => {
            apply_overrides(&mut settings, format, variant);
            let out_dir = output.unwrap_or_else(|| dir.clone());
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;
            let grammar = checked_grammar(&settings)?;
            let documents = list_documents(&dir)?;
            if documents.is_empty() {
                println!("No .docx or .txt documents in {}", dir.display());
                return Ok(());
            }
            println!("Converting {} documents...", documents.len());
            let counts = convert_batch(&documents, &out_dir, &grammar, &settings);
            counts.print();
            Ok(())
        }
        Commands::Dump { input, chars } => {
            let paragraphs = Source::from_path(&input)?
                .paragraphs()
                .with_context(|| format!("reading {}", input.display()))?;
            for (i, p) in paragraphs.iter().enumerate() {
                println!("Paragraph {}:", i + 1);
                println!("{:?}", p);
                println!("Length: {}", p.chars().count());
                if chars {
                    for (pos, c) in p.chars().enumerate() {
                        println!("  [{:>3}] {:?} U+{:04X}", pos, c, c as u32);
                    }
                }
                println!();
            }
            Ok(())
        }
        Commands::Labels { variant } => {
            apply_overrides(&mut settings, None, variant);
            let grammar = settings.grammar();
            println!(
                "{:?}: {} labels, {} address strategy",
                settings.variant,
                grammar.labels().len(),
                format!("{:?}", grammar.address_split()).to_lowercase(),
            );
            println!("\nColumns:");
            for (i, column) in grammar.columns().iter().enumerate() {
                println!("{:>3}  {}", i + 1, column);
            }
            let title_case: Vec<&str> = grammar.title_case_fields().collect();
            if title_case.is_empty() {
                println!("\nTitle-case fields: none");
            } else {
                println!("\nTitle-case fields: {}", title_case.join(", "));
            }
            let shadowed = grammar.shadowed_labels();
            for (earlier, later) in &shadowed {
                warn!(earlier = %earlier, later = %later, "label can never match");
                println!("Shadowed: '{}' hides '{}'", earlier, later);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_elapsed(elapsed));
    }

    result
}

fn apply_overrides(settings: &mut Settings, format: Option<Format>, variant: Option<GrammarVariant>) {
    if let Some(format) = format {
        settings.format = format;
    }
    if let Some(variant) = variant {
        settings.variant = variant;
    }
}

fn checked_grammar(settings: &Settings) -> anyhow::Result<FieldGrammar> {
    settings
        .validated_grammar()
        .with_context(|| format!("invalid {:?} grammar", settings.variant))
}

/// Read, extract and write one document. Nothing is written when no
/// record was found.
fn convert_document<D: Diagnostics>(
    input: &Path,
    output: &Path,
    grammar: &FieldGrammar,
    settings: &Settings,
    diagnostics: D,
) -> anyhow::Result<usize> {
    let paragraphs = Source::from_path(input)?
        .paragraphs()
        .with_context(|| format!("reading {}", input.display()))?;
    let records = parser::process_document(&paragraphs, grammar, diagnostics);
    if records.is_empty() {
        info!(input = %input.display(), "no records found");
        return Ok(0);
    }

    let document = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let written = sink::write_to_path(
        settings.format,
        output,
        &settings.table,
        &document,
        &grammar.columns(),
        &records,
    )
    .with_context(|| format!("writing {}", output.display()))?;
    Ok(written)
}

fn list_documents(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let wanted = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("docx") || e.eq_ignore_ascii_case("txt"));
        if wanted {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

struct BatchCounts {
    documents: usize,
    records: usize,
    empty: usize,
    errors: usize,
}

impl BatchCounts {
    fn print(&self) {
        println!(
            "Converted {} documents: {} records, {} without records, {} errors.",
            self.documents, self.records, self.empty, self.errors,
        );
    }
}

fn convert_batch(
    documents: &[PathBuf],
    out_dir: &Path,
    grammar: &FieldGrammar,
    settings: &Settings,
) -> BatchCounts {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let style = ProgressStyle::with_template("{bar:32.green/white} {pos}/{len} documents [{elapsed}] {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let pb = ProgressBar::new(documents.len() as u64).with_style(style);

    let results: Vec<anyhow::Result<usize>> = documents
        .par_iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".into());
            let output = out_dir.join(format!("{}.{}", stem, settings.format.extension()));
            let diagnostics: Box<dyn Diagnostics + Send> = if settings.trace {
                TraceFile::open_or_tracing(&out_dir.join(format!("{}.trace.txt", stem)))
            } else {
                Box::new(NullDiagnostics)
            };
            let result = convert_document(input, &output, grammar, settings, diagnostics);
            pb.set_message(stem);
            pb.inc(1);
            result
        })
        .collect();
    pb.finish_and_clear();

    let mut counts = BatchCounts {
        documents: documents.len(),
        records: 0,
        empty: 0,
        errors: 0,
    };
    for (input, result) in documents.iter().zip(results) {
        match result {
            Ok(0) => counts.empty += 1,
            Ok(n) => counts.records += n,
            Err(e) => {
                warn!(input = %input.display(), error = %format!("{:#}", e), "conversion failed");
                counts.errors += 1;
            }
        }
    }
    counts
}

/// Wall-clock summary: tenths of a second under a minute, then
/// zero-padded minutes and seconds.
fn format_elapsed(d: std::time::Duration) -> String {
    let total = d.as_secs();
    match (total / 3600, total % 3600 / 60, total % 60) {
        (0, 0, _) => format!("{:.1}s", d.as_secs_f64()),
        (0, m, s) => format!("{}m{:02}s", m, s),
        (h, m, s) => format!("{}h{:02}m{:02}s", h, m, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed(Duration::from_secs(65)), "1m05s");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 7)), "3h00m07s");
    }

    #[test]
    fn batch_lists_only_documents() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.DOCX", "notes.md"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();
        let names: Vec<String> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.DOCX", "b.txt"]);
    }
}
