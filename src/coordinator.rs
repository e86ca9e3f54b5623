use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::board::ProgressBoard;
use crate::downloader::{TransferReport, TransferWorker};
use crate::error::TransferError;
use crate::fetch::Fetcher;
use crate::utils::assign_filenames;

pub type Outcome = Result<TransferReport, TransferError>;

/// Runs one worker per URL, all at once, and waits for every one of them.
pub struct DownloadCoordinator<F, W: Write + Send> {
    fetcher: Arc<F>,
    board: Arc<ProgressBoard<W>>,
    dest_dir: PathBuf,
}

impl<F: Fetcher, W: Write + Send + 'static> DownloadCoordinator<F, W> {
    pub fn new(fetcher: F, sink: W, dest_dir: PathBuf) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            board: Arc::new(ProgressBoard::new(sink)),
            dest_dir,
        }
    }

    /// Outcomes come back in the same order as `urls`.
    ///
    /// Every log event of the batch is emitted after `Download Done`, since
    /// anything written to the terminal while the block is live would tear it.
    pub async fn run(&self, urls: &[String]) -> Vec<Outcome> {
        let filenames = assign_filenames(urls);

        self.board.banner("Download Started");
        self.board.initialize(urls.len());

        let handles: Vec<_> = urls
            .iter()
            .zip(filenames)
            .enumerate()
            .map(|(index, (url, filename))| {
                let worker = TransferWorker::new(
                    index,
                    url.clone(),
                    self.dest_dir.clone(),
                    filename,
                    self.fetcher.clone(),
                    self.board.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        let mut join_errors = Vec::new();
        for (handle, url) in handles.into_iter().zip(urls) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    join_errors.push((url, e));
                    Err(TransferError::WorkerPanicked { url: url.clone() })
                }
            };
            outcomes.push(outcome);
        }

        // Repaint once more so the final snapshot is what stays on screen.
        self.board.redraw();
        self.board.banner("Download Done");

        for (url, e) in join_errors {
            tracing::debug!("Worker for {} did not complete: {}", url, e);
        }
        for outcome in &outcomes {
            match outcome {
                Ok(report) => tracing::debug!(
                    "Finished {} -> {} ({} bytes)",
                    report.url,
                    report.path.display(),
                    report.bytes
                ),
                Err(err) => tracing::error!("{}", err),
            }
        }

        outcomes
    }

    #[cfg(test)]
    fn board(&self) -> &ProgressBoard<W> {
        &self.board
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes
            .iter()
            .fold(BatchSummary::default(), |mut summary, outcome| {
                match outcome {
                    Ok(report) => {
                        summary.succeeded += 1;
                        summary.bytes += report.bytes;
                    }
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }
}
