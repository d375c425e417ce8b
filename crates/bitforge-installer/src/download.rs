use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use bitforge_core::PackageError;

use crate::fix::filesystem_error;

const CHUNK_SIZE: usize = 64 * 1024;

/// One streaming download. Opening issues the GET immediately; a
/// non-success status fails fast here, before any byte reaches disk, and
/// drops the connection.
#[derive(Debug)]
pub struct DownloadSession {
    url: String,
    response: reqwest::blocking::Response,
    content_length: u64,
}

impl DownloadSession {
    pub fn open(url: &str) -> Result<Self> {
        let response =
            reqwest::blocking::get(url).map_err(|err| network_error(url, &err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(network_error(url, &format!("unexpected HTTP status {status}")));
        }
        let content_length = response.content_length().unwrap_or(0);
        Ok(Self {
            url: url.to_string(),
            response,
            content_length,
        })
    }

    /// Declared content length, or 0 when the server did not send one.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Streams the body to `dest` in fixed-size chunks, reporting
    /// `(bytes_written, content_length)` after each one. Checks the shared
    /// interrupt flag between chunks; an interrupt surfaces as
    /// `PackageError::UserInterrupt`. The caller owns deletion of the
    /// partial file on any failure.
    pub fn stream_to_file(
        mut self,
        dest: &Path,
        interrupt: &AtomicBool,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> Result<()> {
        let mut out = File::create(dest).map_err(|err| filesystem_error(dest, &err))?;
        let mut buf = [0u8; CHUNK_SIZE];
        let mut written: u64 = 0;

        loop {
            if interrupt.load(Ordering::SeqCst) {
                return Err(anyhow::Error::new(PackageError::UserInterrupt));
            }
            let read = self
                .response
                .read(&mut buf)
                .map_err(|err| network_error(&self.url, &err.to_string()))?;
            if read == 0 {
                break;
            }
            out.write_all(&buf[..read])
                .map_err(|err| filesystem_error(dest, &err))?;
            written += read as u64;
            on_progress(written, self.content_length);
        }

        if self.content_length > 0 && written != self.content_length {
            return Err(network_error(
                &self.url,
                &format!(
                    "truncated response: received {written} of {} bytes",
                    self.content_length
                ),
            ));
        }

        out.flush().map_err(|err| filesystem_error(dest, &err))?;
        Ok(())
    }
}

fn network_error(url: &str, detail: &str) -> anyhow::Error {
    anyhow::Error::new(PackageError::Network {
        url: url.to_string(),
        detail: detail.to_string(),
    })
}
