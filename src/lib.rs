//! # ikuai-ipgroup - iKuai IP group and ACL generator
//!
//! Downloads a country IPv4 CIDR list (by default the mainland China list
//! published by Loyalsoldier/geoip), validates it, splits it into
//! size-capped address groups and renders two files ready for import on an
//! iKuai router:
//!
//! - `domestic_ikuai_ipgroup-YYYYMMDD.txt`: one address group per line
//! - `domestic_ikuai_acl-YYYYMMDD.txt`: one ACL rule accepting forwarded
//!   traffic from every generated group
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ikuai-ipgroup                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: generate, validate, init-config, version   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls, single attempt)                 │
//! │    ├── HttpSource                                           │
//! │    └── FileSource                                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Validation (regex)                                         │
//! │    └── Strict IPv4 CIDR grammar, invalid lines reported     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Partition                                                  │
//! │    └── Fixed-size groups, stable names <prefix>-<n>         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Render (FileSystem trait)                                  │
//! │    └── Group file + ACL file, replaced atomically           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use ikuai_ipgroup::config::Config;
//! use ikuai_ipgroup::fetcher::HttpSource;
//! use ikuai_ipgroup::fs_abstraction::real_fs;
//! use ikuai_ipgroup::pipeline;
//! use ikuai_ipgroup::run_date::RunDate;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let source = HttpSource::new(
//!         config.source_url.clone(),
//!         Duration::from_secs(config.fetch_timeout_secs),
//!     )?;
//!     let run_date = RunDate::today_with_offset(config.date_offset_days)?;
//!
//!     let summary = pipeline::run(&source, &config, run_date, real_fs(), false).await?;
//!     println!("{}", summary);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Error taxonomy
//! - [`fetcher`] - Feed sources (HTTP, local file)
//! - [`fs_abstraction`] - Filesystem seam for atomic output
//! - [`partition`] - Address group partitioning and naming
//! - [`pipeline`] - One end-to-end generation run
//! - [`render`] - iKuai import file rendering
//! - [`run_date`] - File name date stamp
//! - [`summary`] - End-of-run report
//! - [`validation`] - CIDR grammar and feed extraction

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod partition;
pub mod pipeline;
pub mod render;
pub mod run_date;
pub mod summary;
pub mod validation;

pub use config::Config;
pub use error::IpGroupError;
