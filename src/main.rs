use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use sowdoc::Config;
use sowdoc::server::{AppState, router};

#[derive(Parser)]
#[command(name = "sowdoc")]
#[command(about = "Convert assistant chat Markdown to Word documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a local Markdown file to a .docx file
    Convert {
        /// Input Markdown file
        input: PathBuf,

        /// Output file (defaults to input name with .docx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the HTTP conversion service
    Serve {
        /// TOML config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert { input, output } => convert(input, output),
        Command::Serve { config } => serve(config).await,
    }
}

fn convert(input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let markdown =
        fs::read_to_string(&input).with_context(|| format!("read {}", input.display()))?;

    let bytes = sowdoc::markdown_to_docx(&markdown)?;

    let output = output.unwrap_or_else(|| input.with_extension("docx"));
    fs::write(&output, bytes).with_context(|| format!("write {}", output.display()))?;

    println!("Created {}", output.display());
    Ok(())
}

async fn serve(config_path: PathBuf) -> anyhow::Result<()> {
    let mut config = Config::load(&config_path);
    config.apply_env();

    let state = Arc::new(AppState::new(&config)?);
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("conversion service listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
