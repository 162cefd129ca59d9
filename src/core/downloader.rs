//! Streaming asset download with progress reporting
//!
//! Downloads go to a `.partial` file in the staging directory and are
//! renamed only once the stream completes, so an interrupted download
//! never masquerades as a finished one. Progress is reported over an
//! `mpsc` channel; dropping the receiver cancels the download
//! cooperatively at the next chunk boundary.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;

use crate::error::{Result, StoreError};

/// A progress update emitted once per received chunk
#[derive(Debug, Clone, Copy)]
pub struct DownloadProgress {
    pub downloaded: u64,
    /// Total size from Content-Length, when the server reports one
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Completion ratio in 0..=1, if the total is known
    pub fn fraction(&self) -> Option<f64> {
        self.total
            .filter(|t| *t > 0)
            .map(|t| self.downloaded as f64 / t as f64)
    }
}

/// Asset downloader
pub struct Downloader {
    http: Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        // No overall timeout: large artifacts legitimately take minutes
        let http = Client::builder()
            .user_agent(format!("ghstore/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    /// Download `url` into `dest_dir/file_name`, streaming chunks to disk.
    ///
    /// When `progress` is given, one update is sent per chunk; a closed
    /// channel means the consumer lost interest and the download is
    /// abandoned with [`StoreError::Cancelled`], leaving no partial file
    /// behind.
    pub async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        file_name: &str,
        progress: Option<mpsc::Sender<DownloadProgress>>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir)?;

        let final_path = dest_dir.join(file_name);
        let partial_path = dest_dir.join(format!("{file_name}.partial"));

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Download(format!(
                "Server answered {} for '{}'",
                response.status(),
                url
            )));
        }

        let total = response.content_length();
        let mut downloaded: u64 = 0;

        let mut file = File::create(&partial_path)?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    drop(file);
                    let _ = fs::remove_file(&partial_path);
                    return Err(e.into());
                }
            };

            if let Err(e) = file.write_all(&chunk) {
                drop(file);
                let _ = fs::remove_file(&partial_path);
                return Err(e.into());
            }
            downloaded += chunk.len() as u64;

            if let Some(tx) = &progress {
                let update = DownloadProgress { downloaded, total };
                if tx.send(update).await.is_err() {
                    drop(file);
                    let _ = fs::remove_file(&partial_path);
                    return Err(StoreError::Cancelled);
                }
            }
        }

        file.sync_all()?;
        drop(file);

        fs::rename(&partial_path, &final_path)?;
        tracing::debug!(url, bytes = downloaded, path = %final_path.display(), "download complete");

        Ok(final_path)
    }
}
