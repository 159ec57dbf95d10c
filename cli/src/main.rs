//! transpdf CLI - PDF translation tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use transpdf::{ExtractOptions, PdfExtractor, Transpdf, DEFAULT_PROVIDER_URL};

#[derive(Parser)]
#[command(name = "transpdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Translate PDF documents while preserving layout", long_about = None)]
struct Cli {
    /// LibreTranslate-compatible provider URL
    #[arg(
        long,
        global = true,
        env = "TRANSPDF_PROVIDER_URL",
        default_value = DEFAULT_PROVIDER_URL
    )]
    provider_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a PDF into a target language
    #[command(alias = "tr")]
    Translate {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target language code (e.g., es, fr, de)
        #[arg(short, long, value_name = "LANG")]
        target: String,

        /// Output file (default: <stem>_<lang>_<timestamp>.pdf beside input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Extract raw text only, skipping geometry recovery
        #[arg(long)]
        text_only: bool,

        /// Translate lines concurrently
        #[arg(long)]
        parallel: bool,

        /// Print the job report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List supported target languages
    #[command(alias = "langs")]
    Languages,

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Translate {
            input,
            target,
            output,
            text_only,
            parallel,
            json,
        } => cmd_translate(
            &cli.provider_url,
            &input,
            &target,
            output.as_deref(),
            text_only,
            parallel,
            json,
        ),
        Commands::Languages => cmd_languages(&cli.provider_url),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_translate(
    provider_url: &str,
    input: &Path,
    target: &str,
    output: Option<&Path>,
    text_only: bool,
    parallel: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Transpdf::new()
        .with_provider_url(provider_url)
        .parallel(parallel);
    if text_only {
        builder = builder.text_only();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Connecting to translation provider...");
    let pipeline = builder.build()?;

    pb.set_message(format!(
        "Translating {} to {}...",
        input.display(),
        pipeline.service().languages().display_or_code(target)
    ));
    let report = pipeline.run(input, target, output);
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    if !report.success {
        return Err(report.message.into());
    }

    println!("{}", "Translation completed".green().bold());
    println!(
        "  {}: {}",
        "Source language".bold(),
        report.source_language
    );
    println!(
        "  {}: {}",
        "Target language".bold(),
        report.target_language
    );
    if let Some(ref path) = report.output_file {
        println!("  {}: {}", "Output".bold(), path.display());
    }
    println!(
        "  {}: {} pages, {} lines",
        "Translated".bold(),
        report.stats.pages,
        report.stats.lines
    );
    if report.stats.translation_fallbacks > 0 {
        println!(
            "  {}: {} lines kept original text",
            "Warning".yellow().bold(),
            report.stats.translation_fallbacks
        );
    }
    if report.stats.placement_fallbacks > 0 {
        println!(
            "  {}: {} lines placed at fallback anchor",
            "Warning".yellow().bold(),
            report.stats.placement_fallbacks
        );
    }

    Ok(())
}

fn cmd_languages(provider_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Transpdf::new().with_provider_url(provider_url).build()?;
    let languages = pipeline.service().languages();

    println!("{}", "Supported languages".cyan().bold());
    println!("{}", "─".repeat(32).dimmed());
    for (code, name) in languages.iter() {
        println!("  {}  {}", code.cyan(), name);
    }
    println!("{}", "─".repeat(32).dimmed());
    println!("{} languages", languages.len());

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions::new().lenient();
    let extractor = PdfExtractor::open_with_options(input, options)?;
    let doc = extractor.extract()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    println!(
        "{}: {}",
        "Extraction".bold(),
        if doc.geometry { "geometry" } else { "text-only" }
    );

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }

    let text = doc.plain_text();
    let words: usize = text.split_whitespace().count();
    println!("{}: {}", "Lines".bold(), doc.line_count());
    println!("{}: {}", "Words".bold(), words);
    println!(
        "{}: {}",
        "Detected language".bold(),
        transpdf::detect_language(&text)
    );

    Ok(())
}
