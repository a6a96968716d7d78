//! corpus-curate CLI: submit, classify, and curate a topical text corpus.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use corpus_curate::classify::FilterMethod;
use corpus_curate::config::CurateConfig;
use corpus_curate::paths::CuratePaths;
use corpus_curate::policy::Curator;
use corpus_curate::record::{CorpusRecord, SeedChange, TrainingSample};
use corpus_curate::store::{CorpusStore, DurableCorpus, MemCorpus};

#[derive(Parser)]
#[command(name = "curate", version, about = "Topical text corpus curation")]
struct Cli {
    /// Data directory holding the corpus database.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to the XDG config file, then the bundled config).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a throwaway in-memory corpus instead of the database.
    #[arg(long, global = true)]
    memory: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config and create the data directory.
    Init,

    /// Submit and manage samples.
    Loader {
        #[command(subcommand)]
        action: LoaderAction,
    },

    /// Review the corpus and curate the seed set.
    Accepter {
        #[command(subcommand)]
        action: AccepterAction,
    },
}

#[derive(Subcommand)]
enum LoaderAction {
    /// Show corpus statistics.
    Stats,
    /// Classify a sample and store it if it fits a category.
    Submit {
        /// Sample text. Read from --file or stdin when omitted.
        text: Option<String>,

        /// Read the sample from a file.
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Classification method: seeds or keywords.
        #[arg(long, default_value = "keywords")]
        method: FilterMethod,

        /// Override the configured acceptance threshold.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Delete a record.
    Delete {
        /// Record id.
        id: u64,
    },
}

#[derive(Subcommand)]
enum AccepterAction {
    /// Show corpus statistics.
    Stats,
    /// Show a record with all of its scores.
    Info {
        /// Record id.
        id: u64,
    },
    /// Show a record as a training sample (content plus category flags).
    Training {
        /// Record id.
        id: u64,
    },
    /// List records whose selected-category score is at or above the threshold.
    High {
        /// Defaults to `quality.high_threshold`.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// List records whose selected-category score is below the threshold.
    Low {
        /// Defaults to `quality.low_threshold`.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Add a record to the seed set.
    Promote {
        /// Record id.
        id: u64,
    },
    /// Remove a record from the seed set.
    Demote {
        /// Record id.
        id: u64,
    },
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

    let mut paths = CuratePaths::resolve()?;
    if let Some(dir) = cli.data_dir.clone() {
        paths = paths.with_data_dir(dir);
    }

    if let Commands::Init = cli.command {
        return init(&paths, cli.config.as_deref());
    }

    let config = CurateConfig::resolve(cli.config.as_deref(), &paths)?;
    let store: Box<dyn CorpusStore> = if cli.memory {
        Box::new(MemCorpus::new())
    } else {
        Box::new(DurableCorpus::open(&paths.database_file())?)
    };
    let curator = Curator::new(store, config);

    match cli.command {
        Commands::Init => unreachable!("handled above"),

        Commands::Loader { action } => match action {
            LoaderAction::Stats => print_stats(&curator, cli.json)?,
            LoaderAction::Submit {
                text,
                file,
                method,
                threshold,
            } => {
                let content = match (text, file) {
                    (Some(text), _) => text,
                    (None, Some(path)) => std::fs::read_to_string(&path).into_diagnostic()?,
                    (None, None) => std::io::read_to_string(std::io::stdin()).into_diagnostic()?,
                };
                let outcome = match threshold {
                    Some(t) => curator.submit_with_threshold(&content, method, t)?,
                    None => curator.submit(&content, method)?,
                };
                if cli.json {
                    print_json(&outcome)?;
                } else {
                    println!("{outcome}");
                }
            }
            LoaderAction::Delete { id } => {
                curator.delete_record(id)?;
                println!("Record {id} deleted.");
            }
        },

        Commands::Accepter { action } => match action {
            AccepterAction::Stats => print_stats(&curator, cli.json)?,
            AccepterAction::Info { id } => match curator.record_info(id)? {
                Some(record) if cli.json => print_json(&record)?,
                Some(record) => print_record(&record),
                None => println!("Record {id} not found."),
            },
            AccepterAction::Training { id } => match curator.training_sample(id)? {
                Some(sample) if cli.json => print_json(&sample)?,
                Some(sample) => print_sample(&sample),
                None => println!("Record {id} not found."),
            },
            AccepterAction::High { threshold } => {
                let samples = curator.high_quality(threshold)?;
                print_samples(&samples, "high-quality", cli.json)?;
            }
            AccepterAction::Low { threshold } => {
                let samples = curator.low_quality(threshold)?;
                print_samples(&samples, "low-quality", cli.json)?;
            }
            AccepterAction::Promote { id } => {
                let change = curator.promote_to_seed(id)?;
                print_seed_change(&change, "added to", cli.json)?;
            }
            AccepterAction::Demote { id } => {
                let change = curator.demote_from_seed(id)?;
                print_seed_change(&change, "removed from", cli.json)?;
            }
        },
    }

    Ok(())
}

fn init(paths: &CuratePaths, explicit: Option<&std::path::Path>) -> Result<()> {
    paths.ensure_dirs()?;
    let config_path = explicit
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| paths.config_file());
    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
    } else {
        CurateConfig::write_default(&config_path)?;
        println!("Wrote default config: {}", config_path.display());
    }
    println!("Data directory: {}", paths.data_dir.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn print_stats<S: CorpusStore>(curator: &Curator<S>, json: bool) -> Result<()> {
    let stats = curator.statistics()?;
    if json {
        print_json(&stats)
    } else {
        print!("{stats}");
        Ok(())
    }
}

fn print_record(record: &CorpusRecord) {
    println!("Record:        {}", record.id);
    println!("Content:       {}", record.content);
    println!("Fingerprint:   {}", record.fingerprint);
    println!("Category:      {}", record.category);
    println!("Filter method: {}", record.filter_method);
    for s in record.scores.iter() {
        println!("  {:<12} {:.4}", s.category, s.score);
    }
}

fn print_sample(sample: &TrainingSample) {
    println!("Record:      {}", sample.id);
    println!("Content:     {}", sample.content);
    println!("Fingerprint: {}", sample.fingerprint);
    for f in &sample.flags {
        println!("  {:<12} {}", f.category, f.flag);
    }
}

fn print_samples(samples: &[TrainingSample], label: &str, json: bool) -> Result<()> {
    if json {
        return print_json(&samples);
    }
    if samples.is_empty() {
        println!("No {label} records.");
        return Ok(());
    }
    println!("{} {label} record(s):", samples.len());
    for s in samples {
        println!("  [{}] {}", s.id, s.content);
    }
    Ok(())
}

fn print_seed_change(change: &SeedChange, verb: &str, json: bool) -> Result<()> {
    if json {
        return print_json(change);
    }
    if change.changed {
        println!("Record {} {verb} the seed set.", change.id);
    } else {
        println!("Record {} is already a seed.", change.id);
    }
    println!("Current number of seeds: {}", change.seed_count);
    Ok(())
}
