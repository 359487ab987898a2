//! pcp-cli library
//!
//! Core of the `pcp-cli` binary: searches the Portal de Compras Públicas for open
//! tenders in a set of regions, reads each listing's detail page, estimates the
//! contract value from its item tables and appends new opportunities to a
//! spreadsheet.
//!
//! ## Overview
//!
//! - [`planner`] - Expands keywords and regions into the ordered query plan
//! - [`search`] - Opens the results page of one query and reads its listing cards
//! - [`classifier`] - Rejects listings whose object matches an exclusion entry
//! - [`detail`] - Reads the proposal deadline and sums the paginated item tables
//! - [`normalizer`] - Canonical object phrases and organization name cleanup
//! - [`dedup`] - Links already seen in this run or stored in the ledger
//! - [`ledger`] - Tabular store: Google Sheets or in memory
//! - [`browser`] - Headless Chromium session behind the [`browser::Browser`] trait
//! - [`pipeline`] - The crawl loop and the ledger normalization pass
//! - [`cli`] - Command-line interface
//! - [`config`] - Run configuration and TOML loading
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use pcp_cli::{config::ResolvedConfig, errors::AppResult, pipeline};
//!
//! # async fn example() -> AppResult<()> {
//! let mut config = ResolvedConfig::default();
//! config.keywords = vec!["vigilancia".into()];
//! config.regions = vec!["SP".into()];
//!
//! let summary = pipeline::run_crawl(&config, true).await?;
//! println!("{} new listings", summary.persisted);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod detail;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod planner;
pub mod search;
pub mod ui;
pub mod utils;
