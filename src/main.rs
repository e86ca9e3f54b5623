mod board;
mod commands;
mod coordinator;
mod downloader;
mod error;
mod fetch;
mod logging;
mod progress;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URLs to download; each gets its own progress line, in this order
    #[arg(index = 1)]
    urls: Vec<String>,

    /// Path to a file containing more URLs (one per line)
    #[arg(short = 't', long = "tasks-file")]
    tasks_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(crate::commands::run_downloads(args.urls, args.tasks_file))
}
