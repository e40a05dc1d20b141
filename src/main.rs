use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use supportchat::connector::api::{Container, ContainerConfig, Router};
use supportchat::Commands;

#[derive(Parser)]
#[command(name = "supportchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reply with canned text instead of calling the completion provider
    #[arg(long, global = true)]
    mock_provider: bool,

    /// Read the relay's system instruction from this file
    #[arg(long, global = true)]
    system_prompt_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    // Logs go to stderr so they never interleave with a streamed chat reply.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        mock_provider: cli.mock_provider,
        system_prompt_file: cli.system_prompt_file,
    });

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}
