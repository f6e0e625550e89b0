//! Init-config command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::fs_abstraction::{real_fs, FileSystem};

/// Print the default configuration, or write it to `output`.
pub async fn run(output: Option<&Path>) -> Result<()> {
    let template = Config::generate_default_yaml();

    match output {
        None => print!("{}", template),
        Some(path) => {
            if path.exists() {
                bail!("{:?} already exists, not overwriting", path);
            }
            real_fs()
                .write_atomic(path, template.as_bytes())
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("[OK] Default configuration written to {}", path.display());
        }
    }

    Ok(())
}
