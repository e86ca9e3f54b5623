use anyhow::{bail, Context, Result};
use indicatif::HumanBytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::coordinator::{BatchSummary, DownloadCoordinator};
use crate::fetch::HttpFetcher;
use crate::utils::destination_dir;

pub async fn run_downloads(mut urls: Vec<String>, tasks_file: Option<PathBuf>) -> Result<()> {
    if let Some(path) = tasks_file {
        urls.extend(load_urls(&path).await?);
    }
    if urls.is_empty() {
        bail!("No URLs given; pass them as arguments or list them in a tasks file");
    }

    let dest_dir = destination_dir()?;
    tracing::debug!("Saving {} files to {}", urls.len(), dest_dir.display());

    let coordinator = DownloadCoordinator::new(HttpFetcher::new(), std::io::stdout(), dest_dir);
    let outcomes = coordinator.run(&urls).await;

    for report in outcomes.iter().flatten() {
        tracing::info!("Saved {} to {}", report.url, report.path.display());
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    println!(
        "{}/{} files, {} downloaded",
        summary.succeeded,
        outcomes.len(),
        HumanBytes(summary.bytes)
    );

    if summary.failed > 0 {
        bail!("{} of {} downloads failed", summary.failed, outcomes.len());
    }
    Ok(())
}

async fn load_urls(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to open tasks file: {:?}", path))?;
    Ok(parse_url_list(&content))
}

/// One URL per line; blank lines and `#` comments are skipped.
fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
