use crate::errors::{AppError, AppResult};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for the query plan, one tick per keyword/region query.
///
/// The message slot shows the query currently running.
///
/// ```no_run
/// use pcp_cli::ui;
///
/// # fn main() -> Result<(), pcp_cli::errors::AppError> {
/// let pb = ui::create_progress_bar(4)?;
/// pb.set_message("alarme / SP");
/// pb.inc(1);
/// pb.finish_with_message("search finished");
/// # Ok(())
/// # }
/// ```
pub fn create_progress_bar(total: u64) -> AppResult<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} queries {msg}")
            .map_err(|e| AppError::IoError(format!("Invalid progress bar template: {e}")))?
            .progress_chars("=> "),
    );
    Ok(pb)
}
