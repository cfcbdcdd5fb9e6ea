//! Stock newsletter CLI
//!
//! # Usage
//!
//! ```bash
//! # Secrets come from .secrets.toml or the environment
//! export OPENAI_API_KEY="sk-..."
//!
//! # Web form on http://127.0.0.1:8501
//! cargo run --bin newsletter -- serve
//!
//! # One newsletter printed to stdout
//! cargo run --bin newsletter -- run --ticker AAPL
//! ```

use agent_newsletter::web::{self, AppState};
use agent_newsletter::{NewsletterConfig, NewsletterCrew, SearchBackend, Ticker};
use agent_utils::{LoggingOptions, SecretStore, init_tracing_with};
use agent_workflow::Process;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "warn,agent_newsletter=info,agent_workflow=info";

#[derive(Parser, Debug)]
#[command(name = "newsletter")]
#[command(about = "Research a stock with an LLM crew and write a newsletter", long_about = None)]
struct Cli {
    /// Log JSON lines instead of text
    #[arg(long, global = true)]
    log_json: bool,

    /// Secrets file (TOML); defaults to .secrets.toml when present
    #[arg(long, env = "NEWSLETTER_SECRETS", global = true)]
    secrets: Option<PathBuf>,

    /// Chat model for the agents
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat model for the crew manager
    #[arg(long, global = true)]
    manager_model: Option<String>,

    /// hierarchical or sequential
    #[arg(long, global = true, value_parser = parse_process)]
    process: Option<Process>,

    /// DuckDuckGo backend: news or html
    #[arg(long, global = true)]
    backend: Option<SearchBackend>,

    /// Results per news search
    #[arg(long, global = true)]
    news_results: Option<usize>,

    /// Only log agent steps at debug level
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the research form
    Serve {
        /// Address to listen on
        #[arg(long, env = "NEWSLETTER_BIND")]
        bind: Option<SocketAddr>,
    },
    /// Write one newsletter and print it
    Run {
        /// Stock ticker, e.g. AAPL
        #[arg(long)]
        ticker: String,
    },
}

fn parse_process(s: &str) -> Result<Process, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "hierarchical" => Ok(Process::Hierarchical),
        "sequential" => Ok(Process::Sequential),
        other => Err(format!(
            "unknown process '{other}', expected 'hierarchical' or 'sequential'"
        )),
    }
}

fn build_config(cli: &Cli, secrets: &SecretStore) -> anyhow::Result<NewsletterConfig> {
    let mut builder = NewsletterConfig::builder().verbose(!cli.quiet);
    if let Some(model) = &cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(model) = &cli.manager_model {
        builder = builder.manager_model(model.clone());
    }
    if let Some(process) = cli.process {
        builder = builder.process(process);
    }
    if let Some(backend) = cli.backend {
        builder = builder.search_backend(backend);
    }
    if let Some(count) = cli.news_results {
        builder = builder.news_results(count);
    }
    if let Command::Serve { bind: Some(addr) } = &cli.command {
        builder = builder.bind_addr(*addr);
    }

    builder
        .with_secrets(secrets)
        .build()
        .context("Invalid configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing_with(&LoggingOptions::with_filter(DEFAULT_LOG_FILTER).json(cli.log_json))
        .context("Failed to initialize logging")?;

    let secrets = SecretStore::load(cli.secrets.as_deref()).context("Failed to load secrets")?;
    let config = build_config(&cli, &secrets)?;

    match &cli.command {
        Command::Run { ticker } => {
            // Validate before any client is created
            let ticker = Ticker::parse(ticker)?;
            let crew = NewsletterCrew::connect(&secrets, config)
                .context("Failed to set up the newsletter crew")?;

            let newsletter = crew
                .run(&ticker)
                .await
                .with_context(|| format!("Research for {ticker} failed"))?;
            println!("{newsletter}");
        }
        Command::Serve { .. } => {
            let addr = config.bind_addr;
            let crew = NewsletterCrew::connect(&secrets, config)
                .context("Failed to set up the newsletter crew")?;
            let state = AppState::new(Arc::new(crew)).context("Failed to load page templates")?;

            info!(%addr, "Starting newsletter UI");
            web::serve(addr, state)
                .await
                .with_context(|| format!("Server on {addr} stopped"))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("newsletter").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_process() {
        assert_eq!(parse_process("hierarchical").unwrap(), Process::Hierarchical);
        assert_eq!(parse_process(" Sequential ").unwrap(), Process::Sequential);
        assert!(parse_process("parallel").unwrap_err().contains("parallel"));
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = cli(&["run", "--ticker", "AAPL"]);
        let config = build_config(&cli, &SecretStore::new()).unwrap();

        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.process, Process::Hierarchical);
        assert_eq!(config.news_results, 10);
        assert!(config.verbose);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = cli(&[
            "--model",
            "gpt-4o",
            "--manager-model",
            "gpt-4o-mini",
            "--process",
            "sequential",
            "--backend",
            "html",
            "--news-results",
            "5",
            "--quiet",
            "serve",
            "--bind",
            "0.0.0.0:9000",
        ]);
        let config = build_config(&cli, &SecretStore::new()).unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.manager_model(), "gpt-4o-mini");
        assert_eq!(config.process, Process::Sequential);
        assert_eq!(config.search_backend, SearchBackend::Html);
        assert_eq!(config.news_results, 5);
        assert!(!config.verbose);
        assert_eq!(config.bind_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_model_from_secrets() {
        let mut secrets = SecretStore::new();
        secrets.overlay([("OPENAI_MODEL", "gpt-4o")]);

        let config = build_config(&cli(&["run", "--ticker", "AAPL"]), &secrets).unwrap();
        assert_eq!(config.model, "gpt-4o");

        let flagged = cli(&["--model", "gpt-4-turbo", "run", "--ticker", "AAPL"]);
        assert_eq!(build_config(&flagged, &secrets).unwrap().model, "gpt-4-turbo");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cli = cli(&["--news-results", "0", "run", "--ticker", "AAPL"]);
        assert!(build_config(&cli, &SecretStore::new()).is_err());
    }

    #[test]
    fn test_unknown_process_flag() {
        let args = ["newsletter", "--process", "parallel", "run", "--ticker", "AAPL"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
