//! Generate command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::fetcher::{FeedSource, FileSource, HttpSource};
use crate::fs_abstraction::real_fs;
use crate::pipeline;
use crate::run_date::RunDate;

/// Run the generate command
pub async fn run(args: GenerateArgs, config_path: &Path) -> Result<()> {
    let mut config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let run_date = match args.date {
        Some(date) => date,
        None => RunDate::today_with_offset(config.date_offset_days)?,
    };

    let source: Box<dyn FeedSource> = match args.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new(
            config.source_url.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )?),
    };

    let summary = pipeline::run(source.as_ref(), &config, run_date, real_fs(), args.dry_run)
        .await
        .context("Generation aborted")?;

    println!();
    println!("{}", summary);

    Ok(())
}
