//! Streaming a resolved file to disk

use crate::{DlError, FetchError};
use futures::StreamExt;
use reqwest::header::REFERER;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Characters stripped from generated file names
const UNSAFE_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Builds `<item>_<quality>.mp4` with filesystem-safe components
///
/// # Examples
///
/// ```
/// use egydead_dl::pipeline::safe_file_name;
///
/// assert_eq!(
///     safe_file_name("Show: Part 1", "Full HD (Constructed)"),
///     "Show_Part_1_Full_HD.mp4"
/// );
/// ```
pub fn safe_file_name(item_name: &str, quality_name: &str) -> String {
    let quality = sanitize(&quality_name.replace(" (Constructed)", ""));
    format!("{}_{}.mp4", sanitize(item_name), quality)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| !UNSAFE_CHARS.contains(c))
        .collect::<String>()
        .replace(' ', "_")
}

/// Download folder for a search query
pub fn folder_for_query(download_dir: &str, query: &str) -> PathBuf {
    Path::new(download_dir).join(query.replace(' ', "_"))
}

/// Streams `url` into `destination`, returning the number of bytes written
///
/// # Arguments
///
/// * `client` - Client without a total timeout (see `build_download_client`)
/// * `url` - Direct media URL
/// * `referer` - Optional `Referer` header
/// * `destination` - File to create
/// * `read_timeout` - Longest allowed wait for the response or the next chunk
///
/// A partially written file is removed when the transfer fails.
pub async fn download_file(
    client: &Client,
    url: &str,
    referer: Option<&str>,
    destination: &Path,
    read_timeout: Duration,
) -> Result<u64, DlError> {
    tracing::info!("Downloading: {}", destination.display());
    tracing::debug!("URL: {}", url);

    let mut request = client.get(url);
    if let Some(referer) = referer {
        request = request.header(REFERER, referer);
    }
    let response = tokio::time::timeout(read_timeout, request.send())
        .await
        .map_err(|_| stalled(url, read_timeout))??
        .error_for_status()?;

    let mut file = tokio::fs::File::create(destination).await?;
    match write_stream(response, &mut file, url, read_timeout).await {
        Ok(written) => {
            tracing::info!("Download complete ({} bytes)", written);
            Ok(written)
        }
        Err(e) => {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(destination).await {
                tracing::debug!("Could not remove partial file: {}", remove_err);
            }
            Err(e)
        }
    }
}

async fn write_stream(
    response: reqwest::Response,
    file: &mut tokio::fs::File,
    url: &str,
    read_timeout: Duration,
) -> Result<u64, DlError> {
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        let next = tokio::time::timeout(read_timeout, stream.next())
            .await
            .map_err(|_| stalled(url, read_timeout))?;
        let chunk = match next {
            Some(chunk) => chunk?,
            None => break,
        };
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn stalled(url: &str, read_timeout: Duration) -> DlError {
    FetchError::Network {
        url: url.to_string(),
        message: format!("no data received for {}s", read_timeout.as_secs_f32()),
    }
    .into()
}
