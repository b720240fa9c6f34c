//! Graphwise CLI: ask questions of a graph, or build one from text
//!
//! Collaborators (model, database) are chosen by the config file and the
//! `GRAPHWISE_*` / `NEO4J_*` environment variables; the default is fully
//! offline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use graphwise::builder::{chunk_text, DEFAULT_CHUNK_SIZE};
use graphwise::{AssistantConfig, GraphBuilder, NLQPipeline, QueryAnswer, Record};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "graphwise", version, about = "Natural-language graph assistant")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true, env = "GRAPHWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a question into a read-only query and run it
    Ask {
        /// The question, in plain words
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Extract entities from a text file and generate graph statements
    Build {
        /// Text file to read
        file: PathBuf,

        /// Execute the statements against the configured database
        #[arg(long)]
        ingest: bool,

        /// Chunk size in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Show database statistics and the discovered schema
    Schema,
    /// Start an interactive question loop
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AssistantConfig> {
    let config = match path {
        Some(path) => AssistantConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AssistantConfig::default(),
    };
    Ok(config.with_env_overrides(|key| std::env::var(key).ok())?)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Ask { question } => {
            let pipeline = NLQPipeline::from_config(&config)?;
            let answer = pipeline.ask(&question.join(" ")).await;
            print_answer(&answer, &cli.format)
        }
        Commands::Build { file, ingest, chunk_size } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            run_build(&config, &text, ingest, chunk_size, &cli.format).await
        }
        Commands::Schema => run_schema(&config, &cli.format).await,
        Commands::Shell => run_shell(&config, &cli.format).await,
    }
}

async fn run_build(
    config: &AssistantConfig,
    text: &str,
    ingest: bool,
    chunk_size: usize,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let builder = GraphBuilder::from_config(config)?;
    let chunks = chunk_text(text, chunk_size);
    let output = builder.build(&chunks).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        _ => {
            for statement in &output.batch.statements {
                println!("{}", statement);
            }
            println!(
                "-- {} statements ({} nodes, {} relationships) from {} chunks",
                output.batch.len(),
                output.batch.node_count(),
                output.batch.edge_count(),
                chunks.len()
            );
            if output.batch.skipped_relationships > 0 {
                println!("-- {} relationships skipped", output.batch.skipped_relationships);
            }
            if output.batch.truncated > 0 {
                println!("-- {} statements truncated", output.batch.truncated);
            }
        }
    }

    if ingest {
        let report = builder.ingest(&output.batch).await;
        println!("Ingested {} statements", report.executed);
        for failure in &report.failed {
            eprintln!("Failed: {} ({})", failure.statement, failure.error);
        }
        if !report.is_complete() {
            anyhow::bail!("{} statements failed to ingest", report.failed.len());
        }
    }
    Ok(())
}

async fn run_schema(config: &AssistantConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let pipeline = NLQPipeline::from_config(config)?;
    let stats = pipeline.discovery().stats().await?;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "total_nodes": stats.total_nodes,
                "total_relationships": stats.total_relationships,
                "schema": stats.schema.render(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            println!("Nodes:         {}", stats.total_nodes);
            println!("Relationships: {}", stats.total_relationships);
            println!();
            print!("{}", stats.schema.render());
        }
    }
    Ok(())
}

async fn run_shell(config: &AssistantConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let pipeline = NLQPipeline::from_config(config)?;
    println!("Graphwise Interactive Shell");
    println!("Ask a question, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("graphwise> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :schema    Show the discovered schema");
                println!("  :quit      Exit shell");
                println!("  <question> Ask a question");
            }
            ":schema" => print!("{}", pipeline.discovery().describe_schema().await.render()),
            question => {
                let answer = pipeline.ask(question).await;
                if let Err(e) = print_answer(&answer, format) {
                    eprintln!("Error: {}", e);
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}

fn print_answer(answer: &QueryAnswer, format: &OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = format {
        let value = serde_json::json!({
            "question": answer.question,
            "query": answer.query.as_str(),
            "records": answer.records,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", answer.query);
    if answer.is_refusal() {
        return Ok(());
    }
    if let Some(error) = answer.error() {
        anyhow::bail!(
            "database error ({}): {}",
            error.get("error_type").and_then(|v| v.as_str()).unwrap_or("unknown"),
            error.get("message").and_then(|v| v.as_str()).unwrap_or_default()
        );
    }
    print_records(&answer.records, format);
    Ok(())
}

fn columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in records.iter().flat_map(|r| r.keys()) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

fn print_records(records: &[Record], format: &OutputFormat) {
    let columns = columns(records);
    if columns.is_empty() {
        println!("(no results)");
        return;
    }

    match format {
        OutputFormat::Csv => {
            println!("{}", columns.join(","));
            for record in records {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| format_csv_value(record.get(c).unwrap_or(&serde_json::Value::Null)))
                    .collect();
                println!("{}", cells.join(","));
            }
        }
        _ => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&columns);

            for record in records {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| format_table_value(record.get(c).unwrap_or(&serde_json::Value::Null)))
                    .collect();
                table.add_row(cells);
            }

            println!("{}", table);
            println!("{} row(s)", records.len());
        }
    }
}

fn format_table_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Object(map) => {
            // node-shaped values print as (Label {props})
            if let (Some(labels), Some(props)) = (map.get("labels"), map.get("properties")) {
                let labels: Vec<&str> = labels
                    .as_array()
                    .map(|l| l.iter().filter_map(|v| v.as_str()).collect())
                    .unwrap_or_default();
                return format!(":{} {}", labels.join(":"), props);
            }
            serde_json::to_string(v).unwrap_or_default()
        }
        serde_json::Value::Array(_) => serde_json::to_string(v).unwrap_or_default(),
    }
}

fn format_csv_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "".to_string(),
        serde_json::Value::String(s) => {
            if s.contains(',') || s.contains('"') || s.contains('\n') {
                format!("\"{}\"", s.replace('"', "\"\""))
            } else {
                s.clone()
            }
        }
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => {
            let json = serde_json::to_string(v).unwrap_or_default();
            format!("\"{}\"", json.replace('"', "\"\""))
        }
    }
}
