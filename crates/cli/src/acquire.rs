//! Getting deck bytes from a local path or a shareable link.

use regex::Regex;
use slideqa_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Google Drive file view links: .../file/d/<id>/view?usp=sharing
static DRIVE_FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/file/d/([A-Za-z0-9_-]+)").unwrap()
});

/// Google Drive links carrying the id as a query parameter (open?id=, uc?id=).
static DRIVE_ID_PARAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/(?:open|uc)\?(?:[^#]*&)?id=([A-Za-z0-9_-]+)").unwrap()
});

/// Dropbox preview links, which serve HTML unless dl=1.
static DROPBOX_PREVIEW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://(?:www\.)?dropbox\.com/[^#]*[?&])dl=0").unwrap()
});

/// Where a deck comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on disk.
    Local(PathBuf),
    /// An http(s) link, possibly a sharing page.
    Remote(String),
}

/// Raw deck bytes plus a display name.
#[derive(Debug, Clone)]
pub struct AcquiredDeck {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl AcquiredDeck {
    /// Stage the deck into a working file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes).map_err(|e| {
            Error::Acquisition(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

impl Source {
    /// Treat http(s) URLs as remote, anything else as a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Remote(trimmed.to_string())
        } else {
            Source::Local(PathBuf::from(trimmed))
        }
    }

    /// Read or download the deck.
    pub fn acquire(&self) -> Result<AcquiredDeck> {
        match self {
            Source::Local(path) => read_local(path),
            Source::Remote(url) => download(url),
        }
    }
}

fn read_local(path: &Path) -> Result<AcquiredDeck> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Acquisition(format!("Failed to read {}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(AcquiredDeck { name, bytes })
}

fn download(url: &str) -> Result<AcquiredDeck> {
    let resolved = resolve_share_link(url);
    if resolved != url {
        log::debug!("Resolved share link {} -> {}", url, resolved);
    }

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("slide-qa/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Acquisition(format!("Failed to create HTTP client: {}", e)))?;

    let response = client
        .get(&resolved)
        .send()
        .map_err(|e| Error::Acquisition(format!("Failed to download {}: {}", resolved, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Acquisition(format!(
            "Download of {} failed with status {}",
            resolved, status
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| Error::Acquisition(format!("Failed to read response body: {}", e)))?
        .to_vec();

    if looks_like_html(&bytes) {
        return Err(Error::Acquisition(format!(
            "{} returned a web page instead of a file; make sure the link is shared publicly",
            url
        )));
    }

    log::debug!("Downloaded {} bytes from {}", bytes.len(), resolved);
    Ok(AcquiredDeck {
        name: file_name_from_url(&resolved),
        bytes,
    })
}

/// Rewrite a sharing-page link into a direct download link.
///
/// Links that are not recognized are returned unchanged.
pub fn resolve_share_link(url: &str) -> String {
    if let Some(caps) = DRIVE_FILE_REGEX
        .captures(url)
        .or_else(|| DRIVE_ID_PARAM_REGEX.captures(url))
    {
        return format!("https://drive.google.com/uc?export=download&id={}", &caps[1]);
    }

    if DROPBOX_PREVIEW_REGEX.is_match(url) {
        return DROPBOX_PREVIEW_REGEX.replace(url, "${1}dl=1").into_owned();
    }

    url.to_string()
}

/// Last path segment of a URL, without query or fragment.
fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or("download")
        .to_string()
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..bytes.len().min(start + 15)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
