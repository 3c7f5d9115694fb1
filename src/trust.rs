//! Trust store bootstrap boundary
//!
//! The pipeline consumes a narrow initialize/status contract and reads the
//! verified targets directory the initializer populates. The contract is a
//! trait so the bootstrap strategy (and its chain-of-trust validation) can
//! be swapped without touching the rest of the pipeline.
//!
//! The trust-store location is an explicit, injected configuration value
//! rather than a global well-known path; callers default it to a per-run
//! temporary directory so concurrent runs cannot contaminate each other.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::fetch::{self, FetchError};
use crate::mirror::{self, MirrorError};
use crate::role::MetadataRole;

#[derive(Error, Debug)]
pub enum TrustError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid trust metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("could not resolve targets metadata: {0}")]
    Mirror(#[from] MirrorError),

    #[error("could not fetch target file: {0}")]
    Fetch(#[from] FetchError),

    #[error("trust store at {0} is not initialized")]
    NotInitialized(PathBuf),
}

/// Informational root metadata status, logged after initialization.
#[derive(Debug, Clone, Serialize)]
pub struct RootStatus {
    /// Local trust store location.
    pub local: String,
    /// Mirror the store was bootstrapped from.
    pub remote: String,
    /// Version of the staged root document.
    pub version: u64,
    /// Expiration of the staged root document, as published.
    pub expires: String,
    /// Relative paths of the materialized target files.
    pub targets: Vec<String>,
}

/// Contract the pipeline consumes to bootstrap a verified trust store.
#[async_trait]
pub trait TrustInitializer {
    /// Bootstrap the trust store from the given root document, populating
    /// the targets directory as a side effect. Failure is fatal to the run.
    async fn initialize(&self, mirror: &str, root_json: &[u8]) -> Result<(), TrustError>;

    /// Current root metadata status, for informational logging.
    fn root_status(&self) -> Result<RootStatus, TrustError>;

    /// Location of the populated targets directory. The pipeline reads from
    /// (and relocates) this path but never writes into it.
    fn targets_dir(&self) -> PathBuf;
}

// Envelope shared by all signed TUF documents; signatures are carried but
// not interpreted here.
#[derive(Debug, Deserialize)]
struct SignedEnvelope<T> {
    signed: T,
}

#[derive(Debug, Deserialize)]
struct RootMeta {
    version: u64,
    expires: String,
}

#[derive(Debug, Deserialize)]
struct TargetsMeta {
    #[serde(default)]
    targets: BTreeMap<String, serde_json::Value>,
}

/// Trust store bootstrapped directly from the mirror.
///
/// Stages the root document under the injected store directory and
/// materializes every file the targets metadata delegates to, under
/// `<store>/targets/`. Signature verification belongs to the
/// [`TrustInitializer`] seam and is out of scope for this implementation.
#[derive(Debug)]
pub struct MirrorTrustStore {
    store_dir: PathBuf,
    client: Client,
}

impl MirrorTrustStore {
    /// Create a store rooted at `store_dir`. Any stale state under that
    /// directory is wiped on [`TrustInitializer::initialize`].
    pub fn new(store_dir: PathBuf, client: Client) -> Self {
        Self { store_dir, client }
    }

    fn root_path(&self) -> PathBuf {
        self.store_dir.join("root.json")
    }
}

#[async_trait]
impl TrustInitializer for MirrorTrustStore {
    async fn initialize(&self, mirror: &str, root_json: &[u8]) -> Result<(), TrustError> {
        // Force a clean bootstrap: no state survives from earlier runs.
        if self.store_dir.exists() {
            fs::remove_dir_all(&self.store_dir)?;
        }
        fs::create_dir_all(&self.store_dir)?;

        let root: SignedEnvelope<RootMeta> = serde_json::from_slice(root_json)?;
        fs::write(self.root_path(), root_json)?;
        fs::write(self.store_dir.join("remote"), mirror)?;
        debug!(version = root.signed.version, "staged trust root");

        // Materialize the delegated target files named by the current
        // targets metadata.
        let targets_name =
            mirror::resolve_latest(&self.client, mirror, MetadataRole::Targets).await?;
        let targets_url = format!("{mirror}/{targets_name}");
        let body = self
            .client
            .get(&targets_url)
            .send()
            .await
            .map_err(FetchError::from)?
            .error_for_status()
            .map_err(FetchError::from)?
            .bytes()
            .await
            .map_err(FetchError::from)?;
        let targets: SignedEnvelope<TargetsMeta> = serde_json::from_slice(&body)?;

        let targets_dir = self.targets_dir();
        fs::create_dir_all(&targets_dir)?;
        for name in targets.signed.targets.keys() {
            let dest = targets_dir.join(name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let url = format!("{mirror}/targets/{name}");
            debug!(%url, "fetching target");
            fetch::download_file(&self.client, &url, &dest).await?;
        }

        Ok(())
    }

    fn root_status(&self) -> Result<RootStatus, TrustError> {
        let root_path = self.root_path();
        if !root_path.exists() {
            return Err(TrustError::NotInitialized(self.store_dir.clone()));
        }
        let root: SignedEnvelope<RootMeta> = serde_json::from_slice(&fs::read(&root_path)?)?;
        let remote = fs::read_to_string(self.store_dir.join("remote")).unwrap_or_default();

        let targets_dir = self.targets_dir();
        let mut targets = Vec::new();
        if targets_dir.is_dir() {
            for entry in WalkDir::new(&targets_dir).min_depth(1) {
                let entry = entry.map_err(io::Error::other)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(relative) = entry.path().strip_prefix(&targets_dir) {
                    targets.push(relative.display().to_string());
                }
            }
        }
        targets.sort();

        Ok(RootStatus {
            local: self.store_dir.display().to_string(),
            remote,
            version: root.signed.version,
            expires: root.signed.expires,
            targets,
        })
    }

    fn targets_dir(&self) -> PathBuf {
        self.store_dir.join("targets")
    }
}

/// Where a run keeps its trust store. The ephemeral form (the default) is
/// removed when dropped; an explicit location is removed as well, so no
/// state leaks across runs either way.
#[derive(Debug)]
pub enum TrustStoreLocation {
    /// Per-run temporary directory, cleaned up by [`TempDir`].
    Ephemeral(TempDir),
    /// Caller-provided directory, removed on drop.
    Explicit(PathBuf),
}

impl TrustStoreLocation {
    /// A fresh per-run location under the system temp dir.
    pub fn ephemeral() -> io::Result<Self> {
        Ok(Self::Ephemeral(TempDir::with_prefix("trust-store-")?))
    }

    /// Root directory of the store.
    pub fn path(&self) -> &Path {
        match self {
            Self::Ephemeral(dir) => dir.path(),
            Self::Explicit(path) => path,
        }
    }
}

impl Drop for TrustStoreLocation {
    fn drop(&mut self) {
        if let Self::Explicit(path) = self {
            // Cross-run contamination is worse than a leftover error here.
            let _ = fs::remove_dir_all(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const ROOT_JSON: &[u8] =
        br#"{"signed":{"_type":"root","version":2,"expires":"2030-01-01T00:00:00Z"},"signatures":[]}"#;

    async fn targets_listing_mocks(server: &mut Server) -> Vec<mockito::Mock> {
        let listing = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<a href=\"1.targets.json\">1.targets.json</a>")
            .create_async()
            .await;
        let metadata = server
            .mock("GET", "/1.targets.json")
            .with_status(200)
            .with_body(r#"{"signed":{"targets":{"fulcio.crt.pem":{"length":4}}},"signatures":[]}"#)
            .create_async()
            .await;
        let target = server
            .mock("GET", "/targets/fulcio.crt.pem")
            .with_status(200)
            .with_body("cert")
            .create_async()
            .await;
        vec![listing, metadata, target]
    }

    #[tokio::test]
    async fn initialize_materializes_targets() {
        let mut server = Server::new_async().await;
        let _mocks = targets_listing_mocks(&mut server).await;

        let location = TrustStoreLocation::ephemeral().unwrap();
        let store_dir = location.path().join("root");
        let store = MirrorTrustStore::new(store_dir.clone(), Client::new());
        store.initialize(&server.url(), ROOT_JSON).await.unwrap();

        assert_eq!(fs::read(store_dir.join("root.json")).unwrap(), ROOT_JSON);
        assert_eq!(
            fs::read(store.targets_dir().join("fulcio.crt.pem")).unwrap(),
            b"cert"
        );
    }

    #[tokio::test]
    async fn initialize_wipes_stale_state() {
        let mut server = Server::new_async().await;
        let _mocks = targets_listing_mocks(&mut server).await;

        let location = TrustStoreLocation::ephemeral().unwrap();
        let store_dir = location.path().join("root");
        fs::create_dir_all(&store_dir).unwrap();
        fs::write(store_dir.join("stale.json"), b"old").unwrap();

        let store = MirrorTrustStore::new(store_dir.clone(), Client::new());
        store.initialize(&server.url(), ROOT_JSON).await.unwrap();

        assert!(!store_dir.join("stale.json").exists());
    }

    #[tokio::test]
    async fn initialize_rejects_malformed_root() {
        let location = TrustStoreLocation::ephemeral().unwrap();
        let store = MirrorTrustStore::new(location.path().join("root"), Client::new());
        let err = store
            .initialize("http://unused.invalid", b"not json")
            .await
            .unwrap_err();
        assert!(matches!(err, TrustError::Metadata(_)));
    }

    #[tokio::test]
    async fn root_status_reports_staged_state() {
        let mut server = Server::new_async().await;
        let _mocks = targets_listing_mocks(&mut server).await;

        let location = TrustStoreLocation::ephemeral().unwrap();
        let store = MirrorTrustStore::new(location.path().join("root"), Client::new());
        store.initialize(&server.url(), ROOT_JSON).await.unwrap();

        let status = store.root_status().unwrap();
        assert_eq!(status.version, 2);
        assert_eq!(status.expires, "2030-01-01T00:00:00Z");
        assert_eq!(status.remote, server.url());
        assert_eq!(status.targets, vec!["fulcio.crt.pem".to_string()]);
    }

    #[test]
    fn root_status_fails_before_initialize() {
        let location = TrustStoreLocation::ephemeral().unwrap();
        let store = MirrorTrustStore::new(location.path().join("root"), Client::new());
        assert!(matches!(
            store.root_status().unwrap_err(),
            TrustError::NotInitialized(_)
        ));
    }

    #[test]
    fn explicit_location_is_removed_on_drop() {
        let scratch = tempfile::tempdir().unwrap();
        let store_dir = scratch.path().join("trust-root");
        fs::create_dir_all(&store_dir).unwrap();
        fs::write(store_dir.join("root.json"), b"{}").unwrap();

        drop(TrustStoreLocation::Explicit(store_dir.clone()));
        assert!(!store_dir.exists());
    }
}
