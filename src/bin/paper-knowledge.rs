use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use paperlib::{
    config::Config,
    gateway::{CompletionProvider, InferenceGateway},
    ingest,
    insight::{parse_book, ExtractionOptions, InsightExtractor},
    library::{JsonFileStore, KnowledgeLibrary, StoredInsight},
    logging,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "paper-knowledge")]
#[command(about = "Extract and browse insights from books")]
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
    /// Parse books and extract their insights
    #[command(name = "add")]
    Add {
        /// Text files, directories or .zip archives
        #[arg(value_name = "BOOK", required = true)]
        paths: Vec<PathBuf>,
        /// Do not ask for gate and line references
        #[arg(long)]
        no_gates: bool,
        /// Do not ask for quantum mechanics concepts
        #[arg(long)]
        no_quantum: bool,
        /// Do not ask for dimensional references
        #[arg(long)]
        no_dimensions: bool,
        /// Pattern matching only, no inference service
        #[arg(long)]
        quick: bool,
    },
    /// List gates that have insights
    #[command(name = "gates")]
    Gates,
    /// Show insights for a gate
    #[command(name = "gate")]
    Gate {
        #[arg(value_name = "N", value_parser = clap::value_parser!(u8).range(1..=64))]
        gate: u8,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
        line: Option<u8>,
    },
    /// Show insights tagged with a concept, or list concepts
    #[command(name = "concept")]
    Concept {
        #[arg(value_name = "CONCEPT")]
        concept: Option<String>,
    },
    /// Search insight text, book titles and concepts
    #[command(name = "search")]
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },
    /// Show totals
    #[command(name = "stats")]
    Stats,
    /// Write books and insights to a JSON bundle
    #[command(name = "export")]
    Export {
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },
    /// Replace all knowledge with a JSON bundle
    #[command(name = "import")]
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Remove all books and insights
    #[command(name = "clear")]
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn print_insights(insights: &[&StoredInsight]) {
    if insights.is_empty() {
        println!("No insights found.");
        return;
    }

    for stored in insights {
        let insight = &stored.insight;
        let mut reference = String::new();
        if let Some(gate) = insight.gate {
            reference.push_str(&format!("[Gate {}", gate));
            if let Some(line) = insight.line {
                reference.push_str(&format!(".{}", line));
            }
            reference.push_str("] ");
        }
        println!("• {}{}", reference, insight.text);

        let source = match (&insight.book_title, &insight.book_author) {
            (Some(title), Some(author)) => format!("{} by {}", title, author),
            (Some(title), None) => title.clone(),
            _ => String::new(),
        };
        if !source.is_empty() {
            println!("  from {}", source);
        }
        if !insight.concepts.is_empty() {
            println!("  concepts: {}", insight.concepts.join(", "));
        }
        if let Some(dimension) = &insight.dimension {
            println!("  dimension: {}", dimension);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.storage.data_dir_path());
    let mut knowledge = KnowledgeLibrary::open(Arc::new(JsonFileStore::new(&data_dir)));

    match cli.command {
        Commands::Add {
            paths,
            no_gates,
            no_quantum,
            no_dimensions,
            quick,
        } => {
            let mut gateway_config = config.gateway.clone();
            if let Some(endpoint) = cli.endpoint {
                gateway_config.endpoint = endpoint;
            }
            let gateway = Arc::new(InferenceGateway::from_config(&gateway_config));

            if !quick {
                if gateway.check_status().await {
                    println!("✓ Inference service online at {}", gateway.endpoint());
                } else {
                    println!("⚠️  Inference service offline, using pattern matching");
                }
            }

            let defaults = ExtractionOptions::from(&config.extraction);
            let options = ExtractionOptions {
                gates: defaults.gates && !no_gates,
                quantum: defaults.quantum && !no_quantum,
                dimensions: defaults.dimensions && !no_dimensions,
            };
            let extractor = InsightExtractor::new()
                .with_gateway(gateway.clone())
                .with_temperature(config.gateway.extraction_temperature);

            let mut documents = Vec::new();
            for path in &paths {
                match ingest::read_documents(path) {
                    Ok(found) => documents.extend(found),
                    Err(e) => eprintln!("Warning: {:#}", e),
                }
            }
            if documents.is_empty() {
                println!("No readable books found.");
                return Ok(());
            }

            let use_ai = !quick && gateway.is_online();
            for document in documents {
                let book = parse_book(&document.filename, &document.content);
                println!("\n📖 {} by {} ({} words)", book.title, book.author, book.word_count);

                let insights = if use_ai {
                    let total = extractor.chunks(&book).len() as u64;
                    let pb = ProgressBar::new(total);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} chunks")?
                            .progress_chars("#>-"),
                    );
                    let insights = extractor
                        .extract_ai_with_progress(&book, options, |done, _| pb.set_position(done as u64))
                        .await;
                    pb.finish_and_clear();
                    insights
                } else {
                    extractor.extract_heuristic(&book)
                };

                knowledge
                    .add_book(book)
                    .with_context(|| format!("Failed to save book {}", document.filename))?;
                let count = insights.len();
                knowledge.add_insights(insights).context("Failed to save insights")?;
                println!("  ✓ {} insights", count);
            }
        }
        Commands::Gates => {
            let gates = knowledge.gates();
            if gates.is_empty() {
                println!("No gate references yet.");
            }
            for gate in gates {
                println!("Gate {:>2}: {} insights", gate, knowledge.by_gate(gate).len());
            }
        }
        Commands::Gate { gate, line } => {
            print_insights(&knowledge.by_gate_line(gate, line));
        }
        Commands::Concept { concept } => match concept {
            Some(concept) => print_insights(&knowledge.by_concept(&concept)),
            None => {
                for concept in knowledge.concepts() {
                    println!("{} ({})", concept, knowledge.by_concept(concept).len());
                }
            }
        },
        Commands::Search { query } => {
            let results = knowledge.search(&query);
            println!("Found {} insights for \"{}\":\n", results.len(), query);
            print_insights(&results);
        }
        Commands::Stats => {
            let stats = knowledge.stats();
            println!("Books:    {}", stats.total_books);
            println!("Insights: {}", stats.total_insights);
            println!("Gates:    {}", stats.total_gates);
            println!("Concepts: {}", stats.total_concepts);
        }
        Commands::Export { output } => {
            let bundle = knowledge.export();
            let json = serde_json::to_string_pretty(&bundle).context("Failed to serialize knowledge")?;
            std::fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "✓ Exported {} books and {} insights to {}",
                bundle.books.len(),
                bundle.insights.len(),
                output.display()
            );
        }
        Commands::Import { input } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let data: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", input.display()))?;
            let count = knowledge.import(data)?;
            println!("✓ Imported {} insights", count);
        }
        Commands::Clear { yes } => {
            let stats = knowledge.stats();
            if stats.total_books == 0 && stats.total_insights == 0 {
                println!("Knowledge library is already empty.");
                return Ok(());
            }
            let proceed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete {} books and {} insights?",
                        stats.total_books, stats.total_insights
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read user input")?;
            if !proceed {
                println!("Cancelled.");
                return Ok(());
            }
            knowledge.clear()?;
            println!("✓ Knowledge library cleared");
        }
    }

    Ok(())
}
