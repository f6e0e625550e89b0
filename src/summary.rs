//! End-of-run report.

use ipnet::Ipv4Net;
use std::fmt;
use std::path::PathBuf;

use crate::run_date::RunDate;
use crate::validation::SkippedLine;

/// Everything a finished run has to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_date: RunDate,
    pub source: String,
    pub cidr_count: usize,
    pub skipped: Vec<SkippedLine>,
    pub group_count: usize,
    pub group_names: Option<(String, String)>,
    pub id_range: Option<(u64, u64)>,
    pub group_file: Option<PathBuf>,
    pub acl_file: Option<PathBuf>,
    pub address_count: u64,
    pub dry_run: bool,
}

/// Number of IPv4 addresses covered by `cidrs`.
///
/// Overlapping ranges are counted once per entry. Entries that `ipnet`
/// refuses (leading zeros, for instance) are left out.
pub fn address_count(cidrs: &[String]) -> u64 {
    cidrs
        .iter()
        .filter_map(|c| c.parse::<Ipv4Net>().ok())
        .map(|net| 1u64 << (32 - u32::from(net.prefix_len())))
        .fold(0u64, u64::saturating_add)
}

/// Format a number with thousands separators (commas).
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{}", rule)?;
        if self.dry_run {
            writeln!(f, "[DRY-RUN] No files written")?;
        } else {
            writeln!(f, "[OK] All done")?;
        }
        writeln!(f, "Date stamp:    {}", self.run_date)?;
        writeln!(f, "Source:        {}", self.source)?;
        if let Some(ref path) = self.group_file {
            writeln!(f, "IP group file: {}", path.display())?;
        }
        if let Some(ref path) = self.acl_file {
            writeln!(f, "ACL rule file: {}", path.display())?;
        }
        writeln!(
            f,
            "Total:         {} CIDRs in {} groups ({} addresses)",
            format_count(self.cidr_count as u64),
            self.group_count,
            format_count(self.address_count)
        )?;
        if let Some((ref first, ref last)) = self.group_names {
            writeln!(f, "Group names:   {} ~ {}", first, last)?;
        }
        if let Some((first, last)) = self.id_range {
            writeln!(f, "Group ids:     {} ~ {}", first, last)?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped:       {} invalid lines", self.skipped.len())?;
        }
        if let (Some(groups), Some(acl)) = (&self.group_file, &self.acl_file) {
            writeln!(f, "Next steps:")?;
            writeln!(
                f,
                "  1. Import {} as IP groups on the router",
                file_name(groups)
            )?;
            writeln!(f, "  2. Import {} as access control rules", file_name(acl))?;
            writeln!(f, "  3. Make sure this rule has priority over any deny-all rule")?;
        }
        write!(f, "{}", rule)
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
