use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cookery_core::config::{AppConfig, Config};
use cookery_core::types::{BoostMap, FilterMap, SearchHit, SearchQuery};
use cookery_core::Error;
use cookery_rag::{build_prompt, OpenAiClient, RagPipeline};
use cookery_text::{load_index, Index};

mod chat;
mod parse;

const EMPTY_QUESTION: &str = "Please type in a question before you ask for the question to be answered...";

#[derive(Debug, Parser)]
#[command(name = "cookery", version, about = "Ask cooking questions answered from a knowledge base")]
struct Cli {
    /// Directory holding config.toml (defaults to the current directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Knowledge-base CSV, overrides data.knowledge_base
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the knowledge-base entries ranked for a query
    Search(QueryArgs),
    /// Print the prompt that would be sent to the model
    Prompt(QueryArgs),
    /// Answer a question with the language model
    Ask {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Interactive question loop
    Chat {
        #[command(flatten)]
        llm: LlmArgs,
    },
}

#[derive(Debug, Args)]
struct QueryArgs {
    query: String,

    /// Exact keyword filter, repeatable: --filter ID=3
    #[arg(short, long = "filter", value_parser = parse::filter)]
    filters: Vec<(String, serde_json::Value)>,

    /// Field boost, repeatable: --boost question=3
    #[arg(short, long = "boost", value_parser = parse::boost)]
    boosts: Vec<(String, f64)>,

    /// Maximum number of entries to retrieve
    #[arg(short = 'n', long)]
    num_results: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct LlmArgs {
    /// API key for the completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name, overrides llm.model
    #[arg(long)]
    model: Option<String>,
}

impl QueryArgs {
    fn to_query(&self, app: &AppConfig) -> SearchQuery {
        let mut boosts: BoostMap = app.search.boost.clone();
        boosts.extend(self.boosts.iter().cloned());
        let filters: FilterMap = self.filters.iter().cloned().collect();
        SearchQuery::new(self.query.clone())
            .with_filters(filters)
            .with_boosts(boosts)
            .with_num_results(self.num_results.unwrap_or(app.search.num_results))
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn,cookery=info",
        1 => "info,cookery=debug",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config_dir {
        Some(dir) => Config::load_from(dir),
        None => Config::load(),
    }
    .context("Error loading config")?;
    let mut app = config.app().context("Invalid configuration")?;
    debug!(base_dir = %config.base_dir().display(), model = %app.llm.model, "Configuration loaded");
    let data = knowledge_base(cli.data.as_deref(), &app, config.base_dir());

    let index = load_index(&data, &app.index)
        .with_context(|| format!("Failed to load knowledge base {}", data.display()))?;

    match cli.command {
        Command::Search(args) => {
            let hits = index.search_scored(&args.to_query(&app))?;
            print_hits(&args.query, &hits, args.json)?;
        }
        Command::Prompt(args) => {
            let query = args.to_query(&app);
            let documents = index.search(&query)?;
            println!("{}", build_prompt(&query.text, &documents));
        }
        Command::Ask { query, llm } => {
            if query.query.trim().is_empty() {
                eprintln!("{EMPTY_QUESTION}");
                std::process::exit(2);
            }
            let search = query.to_query(&app);
            let rag = pipeline(index, &mut app, llm)?;
            let answer = rag.ask_with(&search)?;
            if query.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.answer);
            }
        }
        Command::Chat { llm } => {
            let rag = pipeline(index, &mut app, llm)?;
            chat::run(&rag)?;
        }
    }
    Ok(())
}

/// `--data` wins over `data.knowledge_base`, which resolves against the config directory.
fn knowledge_base(cli_data: Option<&Path>, app: &AppConfig, base_dir: &Path) -> PathBuf {
    let path = match cli_data {
        Some(path) => path.to_path_buf(),
        None => app.knowledge_base_path(base_dir),
    };
    info!(path = %path.display(), from_flag = cli_data.is_some(), "Using knowledge base");
    path
}

fn pipeline(index: Index, app: &mut AppConfig, llm: LlmArgs) -> Result<RagPipeline<Index>> {
    if let Some(model) = llm.model { app.llm.model = model; }
    if llm.api_key.is_some() { app.llm.api_key = llm.api_key; }
    let client = OpenAiClient::from_config(&app.llm).map_err(|e| match e {
        Error::InvalidConfig(msg) => anyhow::anyhow!("{msg} (or pass --api-key)"),
        other => other.into(),
    })?;
    Ok(RagPipeline::new(index, Box::new(client)).with_search_config(&app.search))
}

fn print_hits(query: &str, hits: &[SearchHit], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hits)?);
        return Ok(());
    }
    println!("🔍 Found {} results for: \"{}\"", hits.len(), query);
    for (i, hit) in hits.iter().enumerate() {
        let doc = &hit.document;
        println!("\n  {}. score={:.4}  ID={}  type={}", i + 1, hit.score, doc.text("ID"), doc.text("type"));
        println!("     ❓ {}", doc.text("question"));
        println!("     💬 {}", doc.text("response"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_base_flag_overrides_config() {
        let app = AppConfig::default();
        let base = Path::new("/srv/cookery");
        assert_eq!(knowledge_base(None, &app, base), PathBuf::from("/srv/cookery/data/cooking_knowledge.csv"));
        assert_eq!(knowledge_base(Some(Path::new("kb.csv")), &app, base), PathBuf::from("kb.csv"));
    }
}
