//! Example downloading a few files with resumable transfers
//!
//! Interrupt it half way and run it again: the partial files are continued.

use color_eyre::Result;
use multibar::{DownloadTasks, MultiBar};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let tasks = DownloadTasks::builder()
        .directory(PathBuf::from("downloads"))
        .retries(3)
        .build(MultiBar::new())?;

    for (i, ver) in ["1.21.13", "1.22.12", "1.23.8"].iter().enumerate() {
        let url = format!("https://dl.google.com/go/go{ver}.src.tar.gz");
        tasks.add_with(&url, "", |bar| bar.stepper(i))?;
    }

    tasks.wait();
    tasks.close();
    println!("Downloads finished.");

    Ok(())
}
