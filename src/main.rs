mod cli;
mod downloader;
mod error;
mod lister;
mod store;
mod types;


use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use log::{error, info};
use store::{S3Store, StoreConfig};
use types::Selector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting Clay NAIP embeddings downloader");

    let cli = Cli::parse();
    let selector = Selector::new(cli.state, cli.year);
    info!(
        "CLI arguments parsed: state={} year={} dest={}",
        selector.state,
        selector.year.as_deref().unwrap_or("all"),
        cli.dest.display()
    );

    let config = StoreConfig::default();
    let store = S3Store::connect(&config).await;

    println!("Listing all files...");
    let pending = match lister::list_pending(&store, &config.dataset_root, &cli.dest, &selector).await {
        Ok(pending) => pending,
        Err(e) => {
            error!("Failed to list remote files: {}", e);
            eprintln!("{}", "Failed to list remote files".red());
            return Err(e).context(format!("listing s3://{}", config.bucket));
        }
    };
    println!("{} files to download.", pending.len());

    let bar = downloader::progress_bar(pending.len() as u64);
    let downloader = downloader::Downloader::new(&store, bar);
    match downloader.download_all(pending).await {
        Ok(summary) => {
            println!(
                "{} {} files, {:.2} MB in {:.2?}",
                "Downloaded".green().bold(),
                summary.files,
                summary.bytes as f64 / 1_048_576.0,
                summary.duration
            );
            Ok(())
        }
        Err(e) => {
            error!("Download process failed: {}", e);
            eprintln!("{}", "Download process failed, rerun to fetch the remaining files".red());
            Err(e).context("downloading pending files")
        }
    }
}
