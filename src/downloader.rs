use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

use crate::board::ProgressBoard;
use crate::error::TransferError;
use crate::fetch::Fetcher;
use crate::progress::TransferMonitor;

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Moves one URL into one local file, reporting on line `index` of the board.
pub struct TransferWorker<F, W: Write + Send> {
    index: usize,
    url: String,
    dest_dir: PathBuf,
    filename: String,
    fetcher: Arc<F>,
    board: Arc<ProgressBoard<W>>,
}

impl<F: Fetcher, W: Write + Send + 'static> TransferWorker<F, W> {
    pub fn new(
        index: usize,
        url: String,
        dest_dir: PathBuf,
        filename: String,
        fetcher: Arc<F>,
        board: Arc<ProgressBoard<W>>,
    ) -> Self {
        Self {
            index,
            url,
            dest_dir,
            filename,
            fetcher,
            board,
        }
    }

    /// Nothing is logged from here: stderr shares the terminal with the live
    /// block, so lifecycle events are left to the coordinator after the join.
    pub async fn run(self) -> Result<TransferReport, TransferError> {
        let result = self.transfer().await;
        if let Err(e) = &result {
            self.board.set_line(
                self.index,
                format!("Failed {}: {}", self.filename, e.reason()),
            );
        }
        result
    }

    async fn transfer(&self) -> Result<TransferReport, TransferError> {
        let filename = self.filename.as_str();
        let body = self
            .fetcher
            .fetch(&self.url)
            .await
            .map_err(|source| TransferError::RemoteFetch {
                url: self.url.clone(),
                source,
            })?;

        let path = self.dest_dir.join(filename);
        let mut file = File::create(&path)
            .await
            .map_err(|source| TransferError::OutputCreate {
                filename: filename.to_string(),
                source,
            })?;

        let copy_failed = |source| TransferError::StreamCopy {
            url: self.url.clone(),
            source,
        };

        let mut monitor = TransferMonitor::new(
            self.index,
            filename.to_string(),
            body.total_size,
            self.board.clone(),
        );

        let bytes = {
            let tapped = body.stream.inspect(|chunk| {
                if let Ok(chunk) = chunk {
                    monitor.observe(chunk);
                }
            });
            let mut reader = StreamReader::new(tapped);
            tokio::io::copy(&mut reader, &mut file)
                .await
                .map_err(copy_failed)?
        };
        file.flush().await.map_err(copy_failed)?;
        monitor.finish();

        Ok(TransferReport {
            url: self.url.clone(),
            path,
            bytes,
        })
    }
}
