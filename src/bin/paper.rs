use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use paperlib::{
    config::Config,
    gateway::{CompletionProvider, InferenceGateway},
    ingest,
    library::{CatalogEntry, EnergyFilter, EntryUpdate, JsonFileStore, Library},
    logging,
    models::Energy,
    utils, ClassificationPipeline, ContentParser, HeuristicClassifier,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "paper")]
#[command(about = "Paper Library: catalog code files by energy and glyph signature")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Data directory (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Inference service endpoint (overrides config and PAPER_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze files, directories or ZIP archives and add them to the library
    #[command(name = "add")]
    Add {
        /// Files, directories or .zip archives
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
        /// Skip AI enrichment even if the inference service is online
        #[arg(long)]
        no_ai: bool,
        /// Send a larger excerpt and allow a longer answer
        #[arg(long)]
        deep: bool,
        /// Add files even if identical content is already cataloged
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// List cataloged apps
    #[command(name = "list")]
    List {
        /// Only show one energy (energetic, flowing, calm, focused, spiral or all)
        #[arg(long, default_value = "all")]
        energy: EnergyFilter,
    },
    /// Search by name, description, filename or tag
    #[command(name = "search")]
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },
    /// Show one entry in full
    #[command(name = "show")]
    Show {
        #[arg(value_name = "ID")]
        id: String,
        /// Also print the file content
        #[arg(long)]
        content: bool,
    },
    /// Edit an entry
    #[command(name = "edit")]
    Edit {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        energy: Option<Energy>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        #[arg(long)]
        best_for: Option<String>,
    },
    /// Delete an entry
    #[command(name = "delete")]
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Show counts per energy
    #[command(name = "stats")]
    Stats,
    /// Write the library to a JSON bundle
    #[command(name = "export")]
    Export {
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },
    /// Replace the library with a JSON bundle
    #[command(name = "import")]
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Remove every entry
    #[command(name = "clear")]
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check whether the inference service is reachable
    #[command(name = "status")]
    Status,
}

fn build_gateway(config: &Config, endpoint: Option<String>) -> Arc<InferenceGateway> {
    let mut gateway_config = config.gateway.clone();
    if let Some(endpoint) = endpoint {
        gateway_config.endpoint = endpoint;
    }
    Arc::new(InferenceGateway::from_config(&gateway_config))
}

fn print_entry_line(entry: &CatalogEntry) {
    let a = &entry.analysis;
    println!("{} {} ({})", a.energy.icon(), a.name, a.filename);
    println!("   id: {}  energy: {}  tags: {}", entry.id, a.energy, a.tags.join(", "));
}

fn print_entries<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) {
    let mut count = 0;
    for entry in entries {
        print_entry_line(entry);
        count += 1;
    }
    if count == 0 {
        println!("No apps found.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.storage.data_dir_path());
    let store = Arc::new(JsonFileStore::new(&data_dir));
    let mut library = Library::open(store);

    match cli.command {
        Commands::Add {
            paths,
            no_ai,
            deep,
            allow_duplicates,
        } => {
            let gateway = build_gateway(&config, cli.endpoint);
            let use_ai = !no_ai && config.analysis.use_ai;
            let deep = deep || config.analysis.deep;

            if use_ai {
                if gateway.check_status().await {
                    println!("✓ Inference service online at {}", gateway.endpoint());
                } else {
                    println!("⚠️  Inference service offline, using quick detection only");
                }
            }

            let parser = ContentParser::new();
            let pipeline = ClassificationPipeline::new(HeuristicClassifier::new())
                .with_gateway(gateway.clone())
                .with_temperature(config.gateway.analysis_temperature);

            let mut sources = Vec::new();
            for path in &paths {
                match ingest::read_sources(path) {
                    Ok(found) => sources.extend(found),
                    Err(e) => eprintln!("Warning: {:#}", e),
                }
            }

            if sources.is_empty() {
                println!("No supported files found.");
                return Ok(());
            }

            let pb = ProgressBar::new(sources.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files analyzed ({msg})")?
                    .progress_chars("#>-"),
            );

            let mut added = 0;
            let mut skipped = 0;
            let mut enriched = 0;
            for source in sources {
                pb.set_message(source.filename.clone());

                if !allow_duplicates && library.contains_hash(&utils::content_hash(&source.content)) {
                    skipped += 1;
                    pb.inc(1);
                    continue;
                }

                let parsed = parser.parse(&source.filename, &source.content);
                let report = pipeline.analyze_with_report(&parsed, use_ai, deep).await;
                if report.enrichment.is_applied() {
                    enriched += 1;
                }
                library
                    .add(report.analysis)
                    .with_context(|| format!("Failed to save {}", source.filename))?;
                added += 1;
                pb.inc(1);
            }
            pb.finish_with_message("done");

            println!("\n✓ Added {} apps ({} AI-enriched)", added, enriched);
            if skipped > 0 {
                println!("  Skipped {} already cataloged files", skipped);
            }
        }
        Commands::List { energy } => {
            print_entries(library.filter(energy));
        }
        Commands::Search { query } => {
            let results = library.search(&query);
            println!("Found {} results for \"{}\":\n", results.len(), query);
            print_entries(results);
        }
        Commands::Show { id, content } => {
            let Some(entry) = library.get(&id) else {
                bail!("No app with id {}", id);
            };
            let a = &entry.analysis;
            println!("{} {}", a.energy.icon(), a.name);
            println!("  File:         {} ({})", a.filename, a.file_type);
            println!("  Added:        {}", entry.timestamp);
            println!("  Energy:       {} - {}", a.energy, a.energy.description());
            println!(
                "  Glyphs:       energy {:?}, flow {:?}, mood {:?}, rhythm {:?}",
                a.glyphs.energy, a.glyphs.flow, a.glyphs.mood, a.glyphs.rhythm
            );
            println!("  Complexity:   {}", a.complexity.as_str());
            if !a.description.is_empty() {
                println!("  Description:  {}", a.description);
            }
            if !a.best_for.is_empty() {
                println!("  Best for:     {}", a.best_for);
            }
            println!("  Tags:         {}", a.tags.join(", "));
            if !a.dependencies.is_empty() {
                println!("  Dependencies: {}", a.dependencies.join(", "));
            }
            if content {
                println!("\n{}", a.content);
            }
        }
        Commands::Edit {
            id,
            name,
            description,
            energy,
            tags,
            best_for,
        } => {
            let update = EntryUpdate {
                name,
                description,
                energy,
                tags,
                best_for,
            };
            if update.is_empty() {
                bail!("Nothing to update: pass at least one field");
            }
            if !library.update(&id, update)? {
                bail!("No app with id {}", id);
            }
            println!("✓ Updated {}", id);
        }
        Commands::Delete { id } => {
            if !library.delete(&id)? {
                bail!("No app with id {}", id);
            }
            println!("✓ Deleted {}", id);
        }
        Commands::Stats => {
            let stats = library.stats();
            println!("Total apps: {}", stats.total);
            for energy in Energy::ALL {
                println!("  {} {:<10} {}", energy.icon(), energy.as_str(), stats.count(energy));
            }
        }
        Commands::Export { output } => {
            let bundle = library.export();
            let json = serde_json::to_string_pretty(&bundle).context("Failed to serialize library")?;
            std::fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✓ Exported {} apps to {}", bundle.apps.len(), output.display());
        }
        Commands::Import { input } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let data: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", input.display()))?;
            let count = library.import(data)?;
            println!("✓ Imported {} apps", count);
        }
        Commands::Clear { yes } => {
            if library.is_empty() {
                println!("Library is already empty.");
                return Ok(());
            }
            let proceed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete all {} apps from the library?", library.len()))
                    .default(false)
                    .interact()
                    .context("Failed to read user input")?;
            if !proceed {
                println!("Cancelled.");
                return Ok(());
            }
            library.clear()?;
            println!("✓ Library cleared");
        }
        Commands::Status => {
            let gateway = build_gateway(&config, cli.endpoint);
            if gateway.check_status().await {
                println!("✓ Inference service online at {}", gateway.endpoint());
            } else {
                println!("✗ Inference service offline at {}", gateway.endpoint());
            }
        }
    }

    Ok(())
}
