// TaskAI CLI - tool-calling assistant + log QA

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use taskai_agent::Agent;
use taskai_llm::{ApiBackend, CliBackend, LlmBackend, LlmGateway};
use taskai_rag::{FastEmbedder, Ingestor, QaChain, SharedIndex, VectorIndex};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_INDEX_PATH: &str = "embeddings.json";

#[derive(Parser)]
#[command(name = "taskai")]
#[command(version = "0.1.0")]
#[command(about = "AI tool-calling assistant with log Q&A", long_about = None)]
struct Cli {
    /// LLM backend to use
    #[arg(short, long, value_enum, default_value_t = Backend::Cli)]
    backend: Backend,

    /// Path of the persisted log index
    #[arg(short, long, default_value = DEFAULT_INDEX_PATH, env = "TASKAI_INDEX")]
    index_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Hosted messages API (needs ANTHROPIC_API_KEY)
    Api,
    /// Local model CLI over stdin/stdout
    Cli,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive assistant session
    Chat,

    /// One-shot assistant query
    Ask {
        /// Your request in natural language
        query: String,
    },

    /// Build the log index from a directory of .log files
    Ingest {
        /// Directory containing the log corpus
        dir: PathBuf,
    },

    /// Ask a question about the ingested logs
    Logs {
        /// Your question in natural language
        question: String,
    },
}

fn build_gateway(backend: Backend) -> Result<LlmGateway, String> {
    let backend: Arc<dyn LlmBackend> = match backend {
        Backend::Api => Arc::new(ApiBackend::from_env().map_err(|e| e.to_string())?),
        Backend::Cli => Arc::new(CliBackend::new()),
    };
    info!(provider = backend.provider(), model = backend.model(), "LLM backend ready");
    Ok(LlmGateway::new(backend))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat => run_chat(cli.backend).await,
        Commands::Ask { query } => run_ask(cli.backend, &query).await,
        Commands::Ingest { dir } => run_ingest(&dir, &cli.index_path),
        Commands::Logs { question } => run_logs(cli.backend, &cli.index_path, &question).await,
    };

    if let Err(message) = result {
        eprintln!("{} {}", "error:".red().bold(), message);
        std::process::exit(1);
    }
}

async fn run_chat(backend: Backend) -> Result<(), String> {
    let agent = Agent::new(build_gateway(backend)?);

    println!("{}", "TaskAI assistant. Type 'exit' to leave.".bold());
    let stdin = io::stdin();
    loop {
        print!("{} ", "you:".cyan().bold());
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).map_err(|e| e.to_string())? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let reply = agent.process(query).await;
        println!("{} {}", "taskai:".green().bold(), reply);
    }
    Ok(())
}

async fn run_ask(backend: Backend, query: &str) -> Result<(), String> {
    let agent = Agent::new(build_gateway(backend)?);
    println!("{}", agent.process(query).await);
    Ok(())
}

fn run_ingest(dir: &PathBuf, index_path: &PathBuf) -> Result<(), String> {
    let embedder = Arc::new(FastEmbedder::new().map_err(|e| e.to_string())?);
    let ingestor = Ingestor::new(embedder);

    let index = ingestor.ingest_dir(dir).map_err(|e| e.to_string())?;
    index.save(index_path).map_err(|e| e.to_string())?;

    println!(
        "{} {} chunks indexed into {}",
        "ok:".green().bold(),
        index.len(),
        index_path.display()
    );
    Ok(())
}

async fn run_logs(backend: Backend, index_path: &PathBuf, question: &str) -> Result<(), String> {
    let index = VectorIndex::load(index_path).map_err(|e| {
        format!(
            "could not load index from {} ({e}); run 'taskai ingest <dir>' first",
            index_path.display()
        )
    })?;
    let shared = Arc::new(SharedIndex::new(index));
    let embedder = Arc::new(FastEmbedder::new().map_err(|e| e.to_string())?);

    let chain = QaChain::new(embedder, shared, build_gateway(backend)?);
    let answer = chain.answer(question).await.map_err(|e| e.to_string())?;
    println!("{}", answer);
    Ok(())
}
