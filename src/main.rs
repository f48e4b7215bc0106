use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gavel_core::config::{Config, ProviderKind};
use gavel_core::pipeline::Pipeline;
use gavel_llm::any::AnyProvider;
use gavel_llm::claude::ClaudeProvider;
use gavel_llm::openai::OpenAiProvider;
use gavel_rag::KnowledgeBase;

#[derive(Parser)]
#[command(name = "gavel", version, about = "ADGM corporate document compliance review")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a set of corporate documents for ADGM compliance.
    Analyze {
        /// Document files to analyze.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Path to the TOML configuration file.
        #[arg(long, default_value = "gavel.toml")]
        config: PathBuf,
        /// Where to write the JSON report.
        #[arg(long, short, default_value = "compliance_report.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            paths,
            config,
            output,
        } => analyze(&paths, &config, &output).await,
    }
}

async fn analyze(paths: &[PathBuf], config_path: &Path, output: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let provider = Arc::new(build_provider(&config)?);
    let knowledge = Arc::new(KnowledgeBase::new(Arc::clone(&provider)));
    knowledge.seed().await;

    let pipeline = Pipeline::new(provider, knowledge, &config);
    let analysis = pipeline.run(paths).await?;

    let json = serde_json::to_string_pretty(&analysis.report)?;
    std::fs::write(output, json)
        .with_context(|| format!("failed to write report to {}", output.display()))?;
    tracing::info!("report written to {}", output.display());

    println!("{}", analysis.checklist_message);
    println!("{}", analysis.summary_message);

    let reviewed: Vec<_> = analysis
        .reviewed
        .iter()
        .filter(|r| {
            r.reviewed_path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("reviewed_"))
        })
        .collect();
    if !reviewed.is_empty() {
        println!("\nReviewed copies:");
        for item in reviewed {
            println!("  {} -> {}", item.original, item.reviewed_path.display());
        }
    }

    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    match config.llm.provider {
        ProviderKind::Claude => {
            let api_key = std::env::var("GAVEL_CLAUDE_API_KEY")
                .context("GAVEL_CLAUDE_API_KEY is not set")?;
            Ok(AnyProvider::Claude(ClaudeProvider::new(
                api_key,
                config.llm.model.clone(),
                config.llm.max_tokens,
            )))
        }
        ProviderKind::OpenAi => {
            let api_key = std::env::var("GAVEL_OPENAI_API_KEY")
                .context("GAVEL_OPENAI_API_KEY is not set")?;
            Ok(AnyProvider::OpenAi(OpenAiProvider::new(
                api_key,
                config.llm.base_url.clone(),
                config.llm.model.clone(),
                config.llm.max_tokens,
                config.llm.embedding_model.clone(),
            )))
        }
    }
}
