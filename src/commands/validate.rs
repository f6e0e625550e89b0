//! Validate command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::IpGroupError;
use crate::summary::{address_count, format_count};
use crate::validation::extract;

/// Run the validate command
pub async fn run(file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {:?}", file))?;

    let extraction = extract(&content);

    println!();
    println!(
        "{}: {} valid CIDRs ({} addresses), {} invalid lines",
        file.display(),
        format_count(extraction.cidrs.len() as u64),
        format_count(address_count(&extraction.cidrs)),
        extraction.skipped.len()
    );
    for skipped in &extraction.skipped {
        println!("  line {}: {}", skipped.line_number, skipped.content);
    }
    println!();

    if extraction.is_empty() {
        return Err(IpGroupError::EmptyFeed.into());
    }

    Ok(())
}
