//! One generation run: fetch, extract, partition, render.

use tracing::{error, info};

use crate::config::Config;
use crate::error::IpGroupError;
use crate::fetcher::FeedSource;
use crate::fs_abstraction::FileSystem;
use crate::partition::{partition, GroupLayout};
use crate::render::{partition_and_render, ArtifactPaths};
use crate::run_date::RunDate;
use crate::summary::{address_count, RunSummary};
use crate::validation::extract;

/// Run the whole pipeline against `source`.
///
/// Fails on transport errors, on a feed with no valid CIDR (before any file
/// is touched), and when no group could be built (before the ACL file is
/// written). With `dry_run` the groups are computed and logged but nothing
/// is written.
pub async fn run(
    source: &dyn FeedSource,
    config: &Config,
    run_date: RunDate,
    fs: &dyn FileSystem,
    dry_run: bool,
) -> Result<RunSummary, IpGroupError> {
    info!("Processing IP list | date stamp: {}", run_date);

    let raw = source.fetch().await?;
    let extraction = extract(&raw);

    if extraction.is_empty() {
        error!("No valid IPv4 CIDR in {}", source.describe());
        return Err(IpGroupError::EmptyFeed);
    }

    let layout = GroupLayout::from_config(config)?;
    let cidrs = &extraction.cidrs;

    let (group_count, id_range, group_file, acl_file) = if dry_run {
        let groups = partition(cidrs, &layout);
        let paths = ArtifactPaths::new(config, run_date);
        info!(
            "Dry run: would write {} groups to {} and {}",
            groups.len(),
            paths.group_file.display(),
            paths.acl_file.display()
        );
        let id_range = groups.first().zip(groups.last()).map(|(f, l)| (f.id, l.id));
        (groups.len(), id_range, None, None)
    } else {
        let outcome = partition_and_render(cidrs, run_date, config, fs)?;
        (
            outcome.group_count,
            outcome.id_range,
            outcome.group_file,
            outcome.acl_file,
        )
    };

    if group_count == 0 {
        error!("No IP group was generated");
        return Err(IpGroupError::NoGroups);
    }

    Ok(RunSummary {
        run_date,
        source: source.describe(),
        cidr_count: cidrs.len(),
        group_names: Some((layout.group_name(1), layout.group_name(group_count))),
        address_count: address_count(cidrs),
        skipped: extraction.skipped,
        group_count,
        id_range,
        group_file,
        acl_file,
        dry_run,
    })
}
