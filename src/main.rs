//! ikuai-ipgroup - iKuai IP group and ACL generator
//!
//! Turns a country IPv4 CIDR list into router import files.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ikuai_ipgroup::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command.unwrap_or_else(|| Commands::Generate(Default::default())) {
        Commands::Generate(args) => ikuai_ipgroup::commands::generate::run(args, &cli.config).await,
        Commands::Validate { file } => ikuai_ipgroup::commands::validate::run(&file).await,
        Commands::InitConfig { output } => {
            ikuai_ipgroup::commands::init_config::run(output.as_deref()).await
        }
        Commands::Version => {
            println!("ikuai-ipgroup {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
