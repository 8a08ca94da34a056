//! pdfscrape CLI - structured extraction from decoded PDF pages

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfscrape::render::{to_json, JsonFormat};
use pdfscrape::{
    AnyExtractor, BatchProcessor, DocumentParser, Extractor, ExtractorKind, PageSelection,
    ParseOptions,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdfscrape")]
#[command(version)]
#[command(about = "Extract structured records from decoded PDF pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a record from one decoded document
    Extract {
        /// Decoded page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Extractor variant
        #[arg(long, value_enum, default_value = "general")]
        variant: Variant,

        /// Extractor tables (JSON) replacing the built-in ones
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Use the first row of every table as its header
        #[arg(long)]
        table_headers: bool,
    },

    /// Extract records from every document in a directory
    Batch {
        /// Directory of decoded page dumps
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Extractor variant
        #[arg(long, value_enum, default_value = "general")]
        variant: Variant,

        /// Extractor tables (JSON) replacing the built-in ones
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// File extension to pick up
        #[arg(long, default_value = pdfscrape::batch::DEFAULT_EXTENSION)]
        extension: String,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show one reconstructed page
    Page {
        /// Decoded page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (1-indexed)
        #[arg(value_name = "N")]
        number: u32,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Decoded page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Clinical reports: vitals, labs, diagnoses, medications
    Medical,
    /// Any document: dates, contacts, headings, lists, references
    General,
}

impl From<Variant> for ExtractorKind {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Medical => ExtractorKind::Medical,
            Variant::General => ExtractorKind::General,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            variant,
            config,
            output,
            compact,
            pages,
            table_headers,
        } => cmd_extract(
            &input,
            variant,
            config.as_deref(),
            output.as_deref(),
            compact,
            pages.as_deref(),
            table_headers,
        ),
        Commands::Batch {
            dir,
            variant,
            config,
            recursive,
            extension,
            output,
        } => cmd_batch(
            &dir,
            variant,
            config.as_deref(),
            recursive,
            &extension,
            output.as_deref(),
        ),
        Commands::Page {
            input,
            number,
            json,
        } => cmd_page(&input, number, json),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_extractor(variant: Variant, config: Option<&Path>) -> CliResult<AnyExtractor> {
    let kind = ExtractorKind::from(variant);
    let extractor = match config {
        Some(path) => AnyExtractor::from_config_json(kind, &fs::read_to_string(path)?)?,
        None => AnyExtractor::new(kind)?,
    };
    Ok(extractor)
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_extract(
    input: &Path,
    variant: Variant,
    config: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
    pages: Option<&str>,
    table_headers: bool,
) -> CliResult {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };
    let mut options = ParseOptions::new().with_pages(page_selection);
    if table_headers {
        options = options.with_table_headers();
    }

    let extractor = load_extractor(variant, config)?;
    let doc = pdfscrape::parse_file_with_options(input, options)?;
    let record = extractor.extract(&doc);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    write_output(output, &to_json(&record, format)?)
}

fn cmd_batch(
    dir: &Path,
    variant: Variant,
    config: Option<&Path>,
    recursive: bool,
    extension: &str,
    output: Option<&Path>,
) -> CliResult {
    let processor = BatchProcessor::with_extractor(load_extractor(variant, config)?)
        .with_extension(extension)
        .recursive(recursive);
    let files = processor.collect_files(dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = processor.process_files(&files, |path, _| {
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        pb.inc(1);
    });
    pb.finish_and_clear();

    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "path": f.path.display().to_string(),
                "error": f.error.to_string(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "successes": &report.successes,
        "failures": failures,
    });
    write_output(output, &to_json(&summary, JsonFormat::Pretty)?)?;

    eprintln!(
        "\n{} {} of {} documents",
        "Extracted".green().bold(),
        report.successes.len(),
        report.total()
    );
    if !report.is_complete() {
        eprintln!("{}", "Failures:".red().bold());
        for failure in &report.failures {
            eprintln!(
                "  {} {}: {}",
                "└─".dimmed(),
                failure.path.display(),
                failure.error
            );
        }
    }

    Ok(())
}

fn cmd_page(input: &Path, number: u32, json: bool) -> CliResult {
    let parser = DocumentParser::open(input)?;
    let page = parser.extract_page(number)?;

    if json {
        println!("{}", to_json(&page, JsonFormat::Pretty)?);
        return Ok(());
    }

    println!(
        "{} {} / {}",
        "Page".cyan().bold(),
        page.page_number,
        parser.page_count()
    );
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", page.sectioned_text());

    if !page.tables.is_empty() {
        println!();
        for (i, table) in page.tables.iter().enumerate() {
            println!(
                "{} {} ({} x {})",
                "Table".bold(),
                i + 1,
                table.row_count(),
                table.column_count()
            );
            println!("{}", table.plain_text());
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> CliResult {
    let doc = DocumentParser::open(input)?.parse()?;
    let meta = &doc.metadata;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());

    let fields = [
        ("Title", &meta.title),
        ("Author", &meta.author),
        ("Subject", &meta.subject),
        ("Keywords", &meta.keywords),
        ("Creator", &meta.creator),
        ("Producer", &meta.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }
    if let Some(created) = meta.created() {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(modified) = meta.modified() {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!(
        "{}: {}",
        "Words".bold(),
        doc.full_text.split_whitespace().count()
    );
    println!("{}: {}", "Characters".bold(), doc.full_text.chars().count());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Images".bold(), doc.images().count());

    Ok(())
}
