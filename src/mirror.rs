//! Mirror directory discovery
//!
//! Finds the authoritative versioned metadata filename for each role by
//! scanning the mirror's directory listing. The listing is treated as opaque
//! text; anything shaped like `<version>.<role>.json` on a line counts.

use regex::Regex;
use reqwest::Client;
use thiserror::Error;

use crate::role::MetadataRole;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("could not fetch mirror listing from {url}: {source}")]
    Listing {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no metadata files matching pattern {pattern} found in mirror directory")]
    NoMetadataFound { pattern: String },
}

/// Extract every filename matching `<digits>.<role suffix>` from a raw
/// directory listing body, one candidate per line.
///
/// The listing page is scanned as plain text, so this works for both bare
/// file listings and HTML index pages that mention the filenames verbatim.
pub fn list_metadata_filenames(body: &str, role: MetadataRole) -> Vec<String> {
    let pattern = Regex::new(&format!(r"(\d+\.{})", regex::escape(role.file_suffix())))
        .expect("role suffix forms a valid pattern");

    let mut files = Vec::new();
    for line in body.lines() {
        if let Some(captures) = pattern.captures(line) {
            files.push(captures[1].to_string());
        }
    }
    files
}

/// Pick the authoritative (highest-version) filename among candidates.
///
/// Candidates are compared by their parsed integer version prefix rather
/// than byte-wise, so `10.root.json` beats `9.root.json` once a mirror
/// reaches double-digit versions.
pub fn latest_metadata_name(
    candidates: Vec<String>,
    role: MetadataRole,
) -> Result<String, MirrorError> {
    candidates
        .into_iter()
        .max_by_key(|name| version_of(name))
        .ok_or_else(|| MirrorError::NoMetadataFound {
            pattern: role.file_suffix().to_string(),
        })
}

/// Resolve the latest metadata filename for `role` by fetching and scanning
/// the mirror's directory listing. Unversioned roles skip the listing
/// entirely and resolve to their fixed filename.
pub async fn resolve_latest(
    client: &Client,
    mirror: &str,
    role: MetadataRole,
) -> Result<String, MirrorError> {
    if role.is_unversioned() {
        return Ok(role.file_suffix().to_string());
    }

    let listing = |source| MirrorError::Listing {
        url: mirror.to_string(),
        source,
    };
    let response = client
        .get(mirror)
        .send()
        .await
        .map_err(listing)?
        .error_for_status()
        .map_err(listing)?;
    let body = response.text().await.map_err(listing)?;

    latest_metadata_name(list_metadata_filenames(&body, role), role)
}

/// Version prefix of a candidate filename. Candidates come from the listing
/// regex, so the prefix is all digits; anything else sorts first.
fn version_of(name: &str) -> u64 {
    name.split('.')
        .next()
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0)
}
