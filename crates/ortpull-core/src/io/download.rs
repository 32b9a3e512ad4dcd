//! Streaming archive download.
//!
//! Release archives run to hundreds of megabytes, so the body is streamed to
//! disk through a fixed-size write buffer instead of being held in memory.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use ortpull_schema::PlatformTarget;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::Reporter;

/// Errors raised while fetching an archive.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Connection, timeout, body or non-success status failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Writing the archive to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the HTTP client shared by every job in a run.
///
/// `timeout` bounds connecting and each individual read, not the whole
/// transfer: a slow download that keeps receiving data is never cut off.
pub fn build_client(timeout: Duration) -> Result<Client, DownloadError> {
    let client = Client::builder()
        .user_agent(crate::USER_AGENT)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()?;
    Ok(client)
}

/// Request for a single archive download.
pub struct DownloadRequest<'a, R: Reporter> {
    /// Shared HTTP client.
    pub client: &'a Client,
    /// Platform the archive belongs to, for progress reporting.
    pub target: &'a PlatformTarget,
    /// Archive URL.
    pub url: &'a str,
    /// File the body is written to.
    pub dest: &'a Path,
    /// Write buffer size.
    pub chunk_size: usize,
    /// Progress sink.
    pub reporter: &'a R,
}

impl<R: Reporter> std::fmt::Debug for DownloadRequest<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("target", self.target)
            .field("url", &self.url)
            .field("dest", &self.dest)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl<R: Reporter> DownloadRequest<'_, R> {
    /// Execute the download, returning the number of bytes written.
    pub async fn execute(self) -> Result<u64, DownloadError> {
        download_to_file(self).await
    }
}

/// Stream `req.url` into `req.dest`, creating or truncating it.
///
/// A non-success status is an error. On failure the destination may hold a
/// partial body.
pub async fn download_to_file<R: Reporter>(
    req: DownloadRequest<'_, R>,
) -> Result<u64, DownloadError> {
    tracing::debug!(url = req.url, dest = %req.dest.display(), "starting download");

    let response = req.client.get(req.url).send().await?.error_for_status()?;
    let total_size = response.content_length();

    let file = File::create(req.dest).await?;
    let mut writer = BufWriter::with_capacity(req.chunk_size.max(1), file);
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    req.reporter.downloading(req.target, 0, total_size);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        req.reporter.downloading(req.target, downloaded, total_size);
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;

    tracing::debug!(url = req.url, bytes = downloaded, "download complete");
    Ok(downloaded)
}
