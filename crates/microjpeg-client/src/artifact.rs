//! Retrieval of processed artifacts by download URL.
//!
//! Download URLs are pre-authorized by the service, so these are plain GETs
//! without credentials. Download failures, including a body that breaks off
//! mid-stream, surface as `TransportError`; local file failures as IO errors.
//! There is no structured error body to normalize here.

use std::path::Path;
use std::time::Instant;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{ClientResult, TransportError};
use crate::transport::{ByteStream, Transport};

pub async fn fetch_bytes(transport: &dyn Transport, url: &str) -> ClientResult<Bytes> {
    Ok(transport.fetch_bytes(url).await?)
}

/// The returned stream belongs to the caller.
pub async fn fetch_stream(transport: &dyn Transport, url: &str) -> ClientResult<ByteStream> {
    Ok(transport.fetch_stream(url).await?)
}

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stream an artifact into `output_path`, creating or truncating it.
///
/// Nothing is buffered beyond the copy buffer. Both the download stream and the
/// file are closed when this returns, on success and on error. Returns the
/// number of bytes written.
pub async fn fetch_to_file(
    transport: &dyn Transport,
    url: &str,
    output_path: impl AsRef<Path>,
) -> ClientResult<u64> {
    let path = output_path.as_ref();
    let start = Instant::now();

    let mut source = transport.fetch_stream(url).await?;
    let mut file = tokio::fs::File::create(path).await?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut bytes_copied = 0u64;
    loop {
        let read = source
            .read(&mut buffer)
            .await
            .map_err(TransportError::Io)?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read]).await?;
        bytes_copied += read as u64;
    }
    file.flush().await?;

    tracing::info!(
        path = %path.display(),
        size_bytes = bytes_copied,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Artifact saved"
    );

    Ok(bytes_copied)
}
