//! Streaming download of mirror files.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download `url` into a newly created file at `dest`.
///
/// Single attempt, fail-fast: a non-success status or a body-copy error
/// aborts immediately, no retry and no backoff. The response body is
/// streamed to disk chunk by chunk rather than buffered whole.
pub async fn download_file(client: &Client, url: &str, dest: &Path) -> Result<(), FetchError> {
    let response = client.get(url).send().await?.error_for_status()?;

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(())
}
