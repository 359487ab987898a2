use crate::config::{ResolvedConfig, ResolvedConfigFile};
use crate::errors::{AppError, AppResult};
use crate::models::SyncMode;
use crate::pipeline::{run_crawl, run_normalize};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Builds the `pcp-cli` command tree.
///
/// - `crawl`: search with the built-in defaults, tweaked by flags
/// - `toml`: search with a TOML configuration file
/// - `normalize`: clean up object and organization columns already in the sheet
pub fn build_command() -> Command<'static> {
    Command::new("pcp-cli")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("crawl")
                .about("Search the portal and record new opportunities")
                .after_help("Example:\n  pcp-cli crawl -k vigilancia -k monitoramento -r SP -r RJ --incremental")
                .arg(
                    Arg::new("keyword")
                        .short('k')
                        .long("keyword")
                        .help("Search keyword, repeatable (replaces the default list)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("region")
                        .short('r')
                        .long("region")
                        .help("Region code such as SP, repeatable (replaces the default list)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("visible")
                        .long("visible")
                        .help("Show the browser window instead of running headless")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("incremental")
                        .long("incremental")
                        .help("Keep existing rows and skip links already in the sheet")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .help("Log records instead of writing them to the spreadsheet")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("max_item_pages")
                        .long("max-item-pages")
                        .help("Upper bound on item table pages visited per listing")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run the search using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Normalize object and organization columns of the spreadsheet")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Optional TOML config file (spreadsheet, phrases, prefixes)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

/// Parses the process arguments and runs the chosen subcommand.
///
/// # Errors
///
/// Returns configuration errors and setup failures. Failures inside a running crawl
/// are logged and counted rather than returned.
pub async fn cli() -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("crawl", sub)) => {
            let mut config = ResolvedConfig::default();
            apply_crawl_flags(&mut config, sub);
            let summary = run_crawl(&config, sub.get_flag("dry_run")).await?;
            info!(new_listings = summary.persisted, "Crawl completed");
        }
        Some(("toml", sub)) => {
            let path = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| AppError::InvalidInput("Config path is required".into()))?;
            let file_config = ResolvedConfigFile::from_toml_file(path)?;
            let summary = run_crawl(&file_config.resolved, file_config.dry_run).await?;
            info!(new_listings = summary.persisted, "Crawl completed");
        }
        Some(("normalize", sub)) => {
            let config = match sub.get_one::<PathBuf>("config") {
                Some(path) => ResolvedConfigFile::from_toml_file(path)?.resolved,
                None => ResolvedConfig::default(),
            };
            let summary = run_normalize(&config).await?;
            info!(rows = summary.rows, "Normalization completed");
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
        }
    }

    Ok(())
}

/// Applies `crawl` flags on top of the defaults. Repeated keywords and regions
/// replace the default lists rather than extending them.
pub fn apply_crawl_flags(config: &mut ResolvedConfig, sub: &ArgMatches) {
    if let Some(keywords) = sub.get_many::<String>("keyword") {
        config.keywords = keywords.cloned().collect();
    }
    if let Some(regions) = sub.get_many::<String>("region") {
        config.regions = regions.map(|r| r.trim().to_uppercase()).collect();
    }
    if sub.get_flag("visible") {
        config.headless = false;
    }
    if sub.get_flag("incremental") {
        config.sync_mode = SyncMode::Incremental;
    }
    if let Some(&pages) = sub.get_one::<u32>("max_item_pages") {
        config.max_item_pages = pages;
    }
}
