//! Streaming LOD scan over CityGML documents
//!
//! CityGML names geometry properties after their level of detail
//! (`bldg:lod1Solid`, `tran:lod2MultiSurface`, ...). The scan walks element
//! names only and never materialises geometry.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Result, UdxError};
use crate::models::FileLocator;
use crate::ports::GmlContentReader;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// LOD digit of an element local name such as `lod2MultiSurface`.
fn lod_of(local_name: &[u8]) -> Option<u32> {
    match local_name {
        [b'l', b'o', b'd', digit, ..] if digit.is_ascii_digit() => Some((digit - b'0') as u32),
        _ => None,
    }
}

/// Highest LOD marker in a GML document, 0 if there is none.
pub fn scan_max_lod<R: BufRead>(source: R) -> std::result::Result<u32, quick_xml::Error> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut max_lod = 0;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if let Some(lod) = lod_of(e.local_name().as_ref()) {
                    max_lod = max_lod.max(lod);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(max_lod)
}

/// Default [`GmlContentReader`]: reads local files from disk and downloads
/// remote ones over HTTP.
pub struct GmlLodScanner {
    timeout: Duration,
    http: OnceLock<reqwest::blocking::Client>,
}

impl Default for GmlLodScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl GmlLodScanner {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, http: OnceLock::new() }
    }

    fn http_client(&self, url: &str) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| unreadable(url, e))?;
        Ok(self.http.get_or_init(|| client))
    }

    fn scan_local(&self, locator: &FileLocator, path: &std::path::Path) -> Result<u32> {
        let file = File::open(path).map_err(|e| unreadable(locator, e))?;
        scan_max_lod(BufReader::new(file)).map_err(|e| unreadable(locator, e))
    }

    fn scan_remote(&self, url: &str) -> Result<u32> {
        let body = self
            .http_client(url)?
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(|e| unreadable(url, e))?;
        scan_max_lod(body.as_ref()).map_err(|e| unreadable(url, e))
    }
}

impl GmlContentReader for GmlLodScanner {
    fn max_lod(&self, locator: &FileLocator) -> Result<u32> {
        match locator {
            FileLocator::Local(path) => self.scan_local(locator, path),
            FileLocator::Remote(url) => self.scan_remote(url),
        }
    }
}

fn unreadable(locator: impl ToString, reason: impl ToString) -> UdxError {
    UdxError::UnreadableContent { locator: locator.to_string(), reason: reason.to_string() }
}
