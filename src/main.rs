use pcp_cli::{cli, errors};
use tracing_subscriber::EnvFilter;

fn main() -> errors::AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pcp_cli=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt =
        tokio::runtime::Runtime::new().map_err(|e| errors::AppError::IoError(e.to_string()))?;
    rt.block_on(cli::cli())
}
