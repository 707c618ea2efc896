//! scopesheet CLI - Word scope-of-work to task spreadsheet

use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use scopesheet::{
    suggested_file_name, DocxReader, JsonFormat, Pipeline, PipelineOptions, ReadOptions,
    Vocabulary, WorkbookOptions,
};

type CliResult = Result<(), Box<dyn StdError>>;

#[derive(Parser)]
#[command(name = "scopesheet")]
#[command(version)]
#[command(about = "Turn Word scope-of-work documents into task spreadsheets", long_about = None)]
struct Cli {
    /// Input Word document
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output workbook path or directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to an .xlsx workbook
    Convert {
        /// Input Word document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output workbook path or directory
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Print the grouped tasks as JSON
    Json {
        /// Input Word document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        settings: Settings,
    },

    /// Show document information
    Info {
        /// Input Word document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Convert several documents
    Batch {
        /// Input Word documents
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Print the default classifier vocabulary as TOML
    Vocab {
        /// Print the renovation preset with keyword categories
        #[arg(long)]
        renovation: bool,
    },

    /// Show version information
    Version,
}

/// Flags shared by the converting commands.
#[derive(clap::Args)]
struct Settings {
    /// Classifier vocabulary (TOML)
    #[arg(long, value_name = "FILE", env = "SCOPESHEET_VOCAB")]
    vocab: Option<PathBuf>,

    /// Add a subtotal row after each category
    #[arg(long)]
    subtotals: bool,

    /// Treat short all-bold paragraphs as headings
    #[arg(long)]
    bold_headings: bool,

    /// Ignore table content
    #[arg(long)]
    no_tables: bool,
}

impl Settings {
    fn pipeline_options(&self) -> Result<PipelineOptions, scopesheet::Error> {
        let vocabulary = match &self.vocab {
            Some(path) => Vocabulary::load(path)?,
            None => Vocabulary::default(),
        };
        let read = ReadOptions::new()
            .with_bold_headings(self.bold_headings)
            .with_tables(!self.no_tables);
        let workbook = WorkbookOptions::new().with_subtotal_rows(self.subtotals);

        Ok(PipelineOptions::new()
            .with_vocabulary(vocabulary)
            .with_read_options(read)
            .with_workbook_options(workbook))
    }

    fn pipeline(&self) -> Result<Pipeline, scopesheet::Error> {
        Pipeline::new(self.pipeline_options()?)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            settings,
        }) => cmd_convert(&input, output.as_deref(), &settings),
        Some(Commands::Json {
            input,
            output,
            compact,
            settings,
        }) => cmd_json(&input, output.as_deref(), compact, &settings),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Batch {
            inputs,
            output,
            settings,
        }) => cmd_batch(&inputs, output.as_deref(), &settings),
        Some(Commands::Vocab { renovation }) => cmd_vocab(renovation),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &cli.settings)
            } else {
                println!("{}", "Usage: scopesheet <FILE> [OUTPUT]".yellow());
                println!("       scopesheet --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(exit_code(&*e));
    }
}

/// Exit code for a command failure; library errors carry their own.
fn exit_code(err: &(dyn StdError + 'static)) -> i32 {
    err.downcast_ref::<scopesheet::Error>()
        .map(scopesheet::Error::exit_code)
        .unwrap_or(1)
}

/// Where to write the workbook for `input`.
///
/// An existing directory (or none) receives the suggested file name.
fn output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    let name = suggested_file_name(input.file_name().and_then(|n| n.to_str()));
    match output {
        Some(path) if path.is_dir() => path.join(name),
        Some(path) => path.to_path_buf(),
        None => input
            .parent()
            .map(|dir| dir.join(&name))
            .unwrap_or_else(|| PathBuf::from(&name)),
    }
}

fn cmd_convert(input: &Path, output: Option<&Path>, settings: &Settings) -> CliResult {
    let pipeline = settings.pipeline()?;
    let processed = pipeline.process_file(input)?;

    let path = output_path(input, output);
    processed.save(&path)?;

    // stdout carries only the path so callers can capture it
    println!("{}", path.display());
    Ok(())
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool, settings: &Settings) -> CliResult {
    let pipeline = settings.pipeline()?;
    let data = fs::read(input)?;
    let result = pipeline.extract(&data)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = scopesheet::render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> CliResult {
    let reader = DocxReader::open(input)?;
    let metadata = reader.metadata();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), reader.format());

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Author".bold(), creator);
    }
    if let Some(ref subject) = metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Extraction".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let pipeline = Pipeline::new(PipelineOptions::default())?;
    match pipeline.extract_from_reader(&reader) {
        Ok(result) => {
            let stats = &result.stats;
            println!("{}: {}", "Blocks".bold(), stats.block_count);
            println!("{}: {}", "Headings".bold(), stats.heading_count);
            println!("{}: {}", "Table rows".bold(), stats.table_row_count);
            println!("{}: {}", "Sentences".bold(), stats.sentence_count);
            println!("{}: {}", "Tasks".bold(), result.record_count());
            println!("{}: {}", "Duplicates".bold(), stats.duplicate_count);
            for group in &result.groups {
                println!(
                    "  {} {} ({} tasks, {})",
                    "├─".dimmed(),
                    group.category,
                    group.len(),
                    group.subtotal
                );
            }
            println!("{}: {}", "Total".bold(), result.grand_total);
        }
        Err(scopesheet::Error::ExtractionEmpty) => {
            println!("{}", "No tasks found".yellow());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn cmd_batch(inputs: &[PathBuf], output: Option<&Path>, settings: &Settings) -> CliResult {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pipeline = settings.pipeline()?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let items = pipeline.process_batch_with(inputs, |item| {
        pb.set_message(item.path.display().to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let total = items.len();
    let mut first_error = None;
    for item in items {
        match item.output {
            Ok(processed) => {
                let path = output_dir.join(&processed.file_name);
                processed.save(&path)?;
                println!("{}", path.display());
            }
            Err(e) => {
                eprintln!("{} {}: {}", "Failed".red(), item.path.display(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => {
            eprintln!("{} of {} documents failed", "Some".yellow(), total);
            Err(e.into())
        }
        None => Ok(()),
    }
}

fn cmd_vocab(renovation: bool) -> CliResult {
    let vocabulary = if renovation {
        Vocabulary::renovation()
    } else {
        Vocabulary::default()
    };
    print!("{}", vocabulary.to_toml_string()?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "scopesheet".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word scope-of-work to task spreadsheet converter");
    println!();
    println!("License: MIT");
}
