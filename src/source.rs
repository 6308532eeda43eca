//! Source archive retrieval and extraction.
//!
//! The pipeline's Fetch and Extract stages delegate to these collaborators.
//! Both are traits so builders can be tested without network access:
//!
//! - **[`Downloader`]**: fully retrieves a URL into a local file.
//!   [`HttpDownloader`] streams with a blocking `reqwest` client and reports
//!   progress per chunk through `indicatif`.
//! - **[`Extractor`]**: fully unpacks an archive into a directory.
//!   [`TarGzExtractor`] handles `.tar.gz` archives with `flate2` and `tar`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Size of each chunk read from the network.
const CHUNK_SIZE: usize = 8 * 1024;

/// Trait for retrieving source archives - allows mocking in tests
pub trait Downloader {
    /// Retrieve `url` into `dest`, creating or truncating it.
    fn download(&self, url: &Url, dest: &Path) -> Result<()>;
}

/// Trait for unpacking source archives - allows mocking in tests
pub trait Extractor {
    /// Unpack `archive` into `dest`.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Downloads over HTTP(S) with an optional progress bar.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
    show_progress: bool,
}

impl HttpDownloader {
    pub fn new(show_progress: bool) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("stackbuild/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Download {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            show_progress,
        })
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner} [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec})",
                ) {
                    bar.set_style(style.progress_chars("=> "));
                }
                bar
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &Url, dest: &Path) -> Result<()> {
        let network_error = |e: reqwest::Error| Error::Download {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(network_error)?;

        let bar = self.progress_bar(response.content_length());
        let mut sink = BufWriter::new(File::create(dest)?);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let read = response.read(&mut chunk).map_err(|e| Error::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            if read == 0 {
                break;
            }
            sink.write_all(&chunk[..read])?;
            bar.inc(read as u64);
        }
        sink.flush()?;
        bar.finish_and_clear();

        debug!("Downloaded {} to {}", url, dest.display());
        Ok(())
    }
}

/// Unpacks gzip-compressed tarballs.
#[derive(Debug, Default)]
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let extract_error = |e: std::io::Error| Error::Extract {
            archive: archive.display().to_string(),
            message: e.to_string(),
        };

        let file = File::open(archive).map_err(extract_error)?;
        let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        tarball.unpack(dest).map_err(extract_error)?;

        debug!("Extracted {} into {}", archive.display(), dest.display());
        Ok(())
    }
}
