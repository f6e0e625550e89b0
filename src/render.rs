//! Rendering of iKuai import files.
//!
//! Two artifacts are produced per run, both stamped with the [`RunDate`]:
//!
//! - the address-group file, one `key=value` record per [`AddressGroup`]
//! - the ACL rule file, a single record accepting forwarded traffic whose
//!   source matches any of the groups
//!
//! Existing files at the target paths are removed first, then the new content
//! is written atomically, so a rerun on the same day fully replaces the
//! previous output.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::IpGroupError;
use crate::fs_abstraction::FileSystem;
use crate::partition::{partition, AddressGroup, GroupLayout};
use crate::run_date::RunDate;

/// Type tag of an IPv4 address group in the iKuai import format
const GROUP_TYPE_IPV4: u8 = 0;

/// Output locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub group_file: PathBuf,
    pub acl_file: PathBuf,
}

impl ArtifactPaths {
    pub fn new(config: &Config, run_date: RunDate) -> Self {
        let output_dir = &config.output_dir;
        Self {
            group_file: output_dir.join(format!("{}-{}.txt", config.group_file_prefix, run_date)),
            acl_file: output_dir.join(format!("{}-{}.txt", config.acl_file_prefix, run_date)),
        }
    }
}

/// Render one address-group record (without the trailing newline).
pub fn render_group_line(group: &AddressGroup) -> String {
    format!(
        "id={} comment= type={} group_name={} addr_pool={}",
        group.id,
        GROUP_TYPE_IPV4,
        group.name,
        group.members.join(",")
    )
}

/// Render the whole address-group file.
pub fn render_group_file(groups: &[AddressGroup]) -> String {
    let mut content = String::new();
    for group in groups {
        content.push_str(&render_group_line(group));
        content.push('\n');
    }
    content
}

/// The single ACL rule referencing every generated group.
///
/// Everything but the id, comment and source groups is fixed: accept
/// forwarded IPv4 traffic at any time on any interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclRule {
    pub id: u32,
    pub comment: String,
    pub src_groups: Vec<String>,
}

impl AclRule {
    pub fn new(config: &Config, src_groups: Vec<String>) -> Self {
        Self {
            id: config.acl_id,
            comment: config.acl_comment.clone(),
            src_groups,
        }
    }

    /// Render the record (without the trailing newline).
    pub fn render(&self) -> String {
        format!(
            "id={} enabled=yes comment={} action=accept dir=forward ctdir=1 \
             iinterface=any ointerface=any src_addr={} dst_addr= \
             src6_addr= dst6_addr= src6_mode=0 dst6_mode=0 src6_suffix= dst6_suffix= \
             src6_mac= dst6_mac= protocol=any src_port= dst_port= week=1234567 \
             time=00:00-23:59 ip_type=4",
            self.id,
            self.comment,
            self.src_groups.join(",")
        )
    }
}

/// Replace whatever is at `path` with `contents`.
fn publish(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<(), IpGroupError> {
    if fs.exists(path) {
        fs.remove_file(path).map_err(|e| IpGroupError::fs(path, e))?;
        info!("Removed old file: {}", path.display());
    }

    fs.write_atomic(path, contents.as_bytes())
        .map_err(|e| IpGroupError::fs(path, e))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());

    Ok(())
}

/// Write the address-group file for `groups`.
pub fn write_group_file(
    fs: &dyn FileSystem,
    path: &Path,
    groups: &[AddressGroup],
) -> Result<(), IpGroupError> {
    publish(fs, path, &render_group_file(groups))?;
    info!(
        "Generated IP group file: {} ({} groups)",
        path.display(),
        groups.len()
    );
    Ok(())
}

/// Write the ACL rule file referencing `rule.src_groups`.
pub fn write_acl_file(
    fs: &dyn FileSystem,
    path: &Path,
    rule: &AclRule,
) -> Result<(), IpGroupError> {
    let mut content = rule.render();
    content.push('\n');
    publish(fs, path, &content)?;
    info!(
        "Generated ACL rule file: {} (accepting {} groups)",
        path.display(),
        rule.src_groups.len()
    );
    Ok(())
}

/// What [`partition_and_render`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub group_file: Option<PathBuf>,
    pub acl_file: Option<PathBuf>,
    pub group_count: usize,
    pub entry_count: usize,
    /// First and last group id, when any group was written
    pub id_range: Option<(u64, u64)>,
}

impl RenderOutcome {
    fn empty() -> Self {
        Self {
            group_file: None,
            acl_file: None,
            group_count: 0,
            entry_count: 0,
            id_range: None,
        }
    }
}

/// Partition `cidrs` and write both artifacts.
///
/// With no input nothing is written and the outcome reports zero groups; the
/// caller decides that this is a failed run.
pub fn partition_and_render(
    cidrs: &[String],
    run_date: RunDate,
    config: &Config,
    fs: &dyn FileSystem,
) -> Result<RenderOutcome, IpGroupError> {
    let layout = GroupLayout::from_config(config)?;
    let groups = partition(cidrs, &layout);
    if groups.is_empty() {
        return Ok(RenderOutcome::empty());
    }

    let paths = ArtifactPaths::new(config, run_date);
    if !fs.exists(&config.output_dir) {
        fs.create_dir_all(&config.output_dir)
            .map_err(|e| IpGroupError::fs(&config.output_dir, e))?;
    }

    let group_count = groups.len();
    write_group_file(fs, &paths.group_file, &groups)?;
    let rule = AclRule::new(config, layout.group_names(group_count));
    write_acl_file(fs, &paths.acl_file, &rule)?;

    Ok(RenderOutcome {
        group_file: Some(paths.group_file),
        acl_file: Some(paths.acl_file),
        group_count,
        entry_count: cidrs.len(),
        id_range: groups.first().zip(groups.last()).map(|(f, l)| (f.id, l.id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_abstraction::{real_fs, MockFileSystem};
    use chrono::NaiveDate;
    use mockall::Sequence;
    use std::io;
    use tempfile::TempDir;

    fn run_date() -> RunDate {
        RunDate::from_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    fn config_in(dir: &Path) -> Config {
        Config {
            output_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn cidrs(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("{}.{}.{}.0/24", 1 + i / 65536, (i / 256) % 256, i % 256))
            .collect()
    }

    fn field<'a>(line: &'a str, key: &str) -> &'a str {
        let prefix = format!("{}=", key);
        line.split(' ')
            .find_map(|kv| kv.strip_prefix(prefix.as_str()))
            .unwrap_or_else(|| panic!("missing field {} in {}", key, line))
    }

    #[test]
    fn test_render_group_line() {
        let group = AddressGroup {
            sequence_number: 1,
            id: 60,
            name: "国内IP-1".to_string(),
            members: vec!["1.0.1.0/24".to_string(), "1.0.2.0/23".to_string()],
        };
        assert_eq!(
            render_group_line(&group),
            "id=60 comment= type=0 group_name=国内IP-1 addr_pool=1.0.1.0/24,1.0.2.0/23"
        );
    }

    #[test]
    fn test_render_acl_rule_exact() {
        let rule = AclRule::new(
            &Config::default(),
            vec!["国内IP-1".to_string(), "国内IP-2".to_string()],
        );
        assert_eq!(
            rule.render(),
            "id=60 enabled=yes comment=允许国内IP访问 action=accept dir=forward ctdir=1 \
             iinterface=any ointerface=any src_addr=国内IP-1,国内IP-2 dst_addr= src6_addr= \
             dst6_addr= src6_mode=0 dst6_mode=0 src6_suffix= dst6_suffix= src6_mac= dst6_mac= \
             protocol=any src_port= dst_port= week=1234567 time=00:00-23:59 ip_type=4"
        );
    }

    #[test]
    fn test_artifact_paths() {
        let config = config_in(Path::new("/out"));
        let paths = ArtifactPaths::new(&config, run_date());
        assert_eq!(
            paths.group_file,
            PathBuf::from("/out/domestic_ikuai_ipgroup-20240501.txt")
        );
        assert_eq!(paths.acl_file, PathBuf::from("/out/domestic_ikuai_acl-20240501.txt"));
    }

    #[test]
    fn test_write_group_file_writes_rendered_groups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groups.txt");
        let layout = GroupLayout::new("国内IP", 60, 2).unwrap();
        let groups = partition(&cidrs(3), &layout);

        write_group_file(real_fs(), &path, &groups).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            render_group_file(&groups)
        );
    }

    #[test]
    fn test_partition_and_render_2500() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let input = cidrs(2500);

        let outcome = partition_and_render(&input, run_date(), &config, real_fs()).unwrap();
        assert_eq!(outcome.group_count, 3);
        assert_eq!(outcome.entry_count, 2500);
        assert_eq!(outcome.id_range, Some((60, 62)));

        let groups = std::fs::read_to_string(outcome.group_file.unwrap()).unwrap();
        let lines: Vec<&str> = groups.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(groups.ends_with('\n'));
        assert_eq!(field(lines[2], "id"), "62");
        assert_eq!(field(lines[2], "group_name"), "国内IP-3");

        // Concatenated addr_pool fields give back the input
        let pooled: Vec<String> = lines
            .iter()
            .flat_map(|l| field(l, "addr_pool").split(','))
            .map(str::to_string)
            .collect();
        assert_eq!(pooled, input);

        let acl = std::fs::read_to_string(outcome.acl_file.unwrap()).unwrap();
        assert_eq!(acl.lines().count(), 1);
        assert_eq!(field(&acl, "src_addr"), "国内IP-1,国内IP-2,国内IP-3");
        assert_eq!(field(&acl, "id"), "60");
    }

    #[test]
    fn test_partition_and_render_empty_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());

        let outcome = partition_and_render(&[], run_date(), &config, real_fs()).unwrap();
        assert_eq!(outcome.group_count, 0);
        assert_eq!(outcome.entry_count, 0);
        assert!(outcome.acl_file.is_none());

        let paths = ArtifactPaths::new(&config, run_date());
        assert!(!paths.group_file.exists());
        assert!(!paths.acl_file.exists());
    }

    #[test]
    fn test_rerun_replaces_previous_output() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            group_capacity: 2,
            ..config_in(dir.path())
        };

        partition_and_render(&cidrs(5), run_date(), &config, real_fs()).unwrap();
        let outcome =
            partition_and_render(&["9.9.9.0/24".to_string()], run_date(), &config, real_fs())
                .unwrap();

        let groups = std::fs::read_to_string(outcome.group_file.unwrap()).unwrap();
        assert_eq!(
            groups,
            "id=60 comment= type=0 group_name=国内IP-1 addr_pool=9.9.9.0/24\n"
        );
        let acl = std::fs::read_to_string(outcome.acl_file.unwrap()).unwrap();
        assert_eq!(field(&acl, "src_addr"), "国内IP-1");
    }

    #[test]
    fn test_partition_and_render_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir.path().join("nested"));

        let outcome = partition_and_render(&cidrs(3), run_date(), &config, real_fs()).unwrap();
        assert!(outcome.group_file.unwrap().exists());
    }

    #[test]
    fn test_publish_removes_before_writing() {
        let path = PathBuf::from("/out/domestic_ikuai_acl-20240501.txt");
        let mut seq = Sequence::new();
        let mut mock = MockFileSystem::new();

        mock.expect_exists()
            .withf(|p| p == Path::new("/out/domestic_ikuai_acl-20240501.txt"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| true);
        mock.expect_remove_file()
            .withf(|p| p == Path::new("/out/domestic_ikuai_acl-20240501.txt"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_write_atomic()
            .withf(|p, c| p == Path::new("/out/domestic_ikuai_acl-20240501.txt") && c == b"x\n")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        publish(&mock, &path, "x\n").unwrap();
    }

    #[test]
    fn test_publish_skips_remove_when_absent() {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|_| false);
        mock.expect_remove_file().never();
        mock.expect_write_atomic().times(1).returning(|_, _| Ok(()));

        publish(&mock, Path::new("/out/a.txt"), "x\n").unwrap();
    }

    #[test]
    fn test_group_write_failure_skips_acl() {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|_| false);
        mock.expect_create_dir_all().returning(|_| Ok(()));
        mock.expect_write_atomic()
            .times(1)
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::Other, "disk full")));

        let config = config_in(Path::new("/out"));
        let err = partition_and_render(&cidrs(3), run_date(), &config, &mock).unwrap_err();
        assert!(matches!(err, IpGroupError::FileSystem { .. }));
    }
}
