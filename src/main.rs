//! raven-factory CLI: raw documents in, learning modules and library index out.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use raven_factory::config::{DEFAULT_CONFIG_FILE, FactoryConfig};
use raven_factory::library::catalog::{LibraryCatalog, Upsert};
use raven_factory::library::parser;
use raven_factory::pipeline::{FileStatus, Pipeline, RunReport};
use raven_factory::transform::GeminiClient;

#[derive(Parser)]
#[command(
    name = "raven-factory",
    version,
    about = "Turn raw lecture material into structured learning modules"
)]
struct Cli {
    /// Config file (defaults to ./raven.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for the input, output and index paths.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Directory with raw documents.
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Directory for module artifacts.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Library index file.
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every supported file in the input directory.
    Run,

    /// Create the input/output directories and a default config file.
    Init,

    /// Extract and print the text of a single document.
    Extract {
        /// Path to a .txt, .pdf or .pptx file.
        file: PathBuf,
    },

    /// List the library index.
    Catalog,
}

impl Cli {
    fn load_config(&self) -> Result<FactoryConfig> {
        let mut config = FactoryConfig::discover(self.config.as_deref())?;
        if let Some(root) = &self.root {
            config.paths.root = root.clone();
        }
        if let Some(input) = &self.input {
            config.paths.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.paths.output_dir = output.clone();
        }
        if let Some(index) = &self.index {
            config.paths.index_file = index.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command {
        Commands::Run => {
            let client = GeminiClient::new(config.model.clone())?;
            let report = Pipeline::new(&config, &client).run()?;
            print_report(&report, &config);
            if report.has_failures() {
                miette::bail!(
                    "{} of {} files failed",
                    report.failed(),
                    report.outcomes.len()
                );
            }
        }

        Commands::Init => {
            config.ensure_dirs()?;
            let path = cli
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            if path.exists() {
                println!("Config already present at {}", path.display());
            } else {
                config.save(&path)?;
                println!("Wrote {}", path.display());
            }
            println!("Input:  {}", config.input_path().display());
            println!("Output: {}", config.output_path().display());
            println!("Index:  {}", config.index_path().display());
        }

        Commands::Extract { file } => {
            let text = parser::extract_file(&file)?;
            println!("{text}");
            let chars = text.chars().count();
            let verdict = if chars > config.ingest.min_text_chars {
                "eligible"
            } else {
                "too short"
            };
            eprintln!("{chars} characters ({verdict})");
        }

        Commands::Catalog => {
            let catalog = LibraryCatalog::open(&config.index_path())?;
            if catalog.was_reset() {
                eprintln!(
                    "warning: {} is corrupt; it will be replaced on the next run",
                    catalog.path().display()
                );
            }
            if catalog.is_empty() {
                println!("Library is empty.");
            } else {
                println!("Library ({}):", catalog.len());
                for (i, entry) in catalog.list().into_iter().enumerate() {
                    println!(
                        "  {}. [{}] {} / {} (class {}, {}) {}",
                        i + 1,
                        entry.code,
                        entry.display_title(),
                        entry.tag.as_deref().unwrap_or("-"),
                        entry.class,
                        entry.block,
                        entry.url
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &RunReport, config: &FactoryConfig) {
    if report.is_empty() {
        println!(
            "No supported files (txt, pdf, pptx) in {}",
            config.input_path().display()
        );
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.status {
            FileStatus::Ingested {
                entry,
                upsert,
                catalog_reset,
                ..
            } => {
                let action = match upsert {
                    Upsert::Inserted { .. } => "added",
                    Upsert::Replaced { .. } => "updated",
                };
                println!(
                    "  ok    {} -> {} ({action}: {})",
                    outcome.file,
                    entry.url,
                    entry.display_title()
                );
                if *catalog_reset {
                    println!("        library index was corrupt and has been rebuilt");
                }
            }
            FileStatus::NoModules => {
                println!("  empty {} (model returned no modules)", outcome.file)
            }
            FileStatus::Skipped(reason) => println!("  skip  {} ({reason})", outcome.file),
            FileStatus::Failed { stage, message } => {
                println!("  FAIL  {} ({stage}: {message})", outcome.file)
            }
        }
    }

    println!(
        "\nDone: {} ingested, {} empty, {} skipped, {} failed.",
        report.ingested(),
        report.no_modules(),
        report.skipped(),
        report.failed()
    );
}
