use indicatif::{ProgressBar, ProgressStyle};

use crate::types::HarnessResult;

/// A progress bar that advances once per completed case.
///
/// Returns a hidden bar when `hidden` is set so that callers don't need to branch.
pub(crate) fn start_progress(total_cases: usize, hidden: bool) -> HarnessResult<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(total_cases as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} cases [{elapsed_precise}]",
        )?
        .progress_chars("#>-"),
    );

    Ok(pb)
}
