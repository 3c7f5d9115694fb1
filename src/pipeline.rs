//! Single-shot assembly pipeline
//!
//! Resolve -> fetch -> initialize trust -> restructure -> archive -> encode
//! -> render. Each stage's output is the next stage's sole input; any
//! failure aborts the whole run. Temporary state (working repository,
//! archive file, trust store) is released on every exit path.

use std::path::PathBuf;
use std::time::Duration;

use futures::future;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::archive::{self, ArchiveError};
use crate::encode;
use crate::fetch::{self, FetchError};
use crate::manifest::TrustRootManifest;
use crate::mirror::{self, MirrorError};
use crate::repo::{RepoError, WorkingRepository};
use crate::role::MetadataRole;
use crate::trust::{MirrorTrustStore, TrustError, TrustInitializer, TrustStoreLocation};

/// How long any single HTTP request may take before the run aborts. The
/// pipeline is synchronous end to end, so an unbounded request would stall
/// it indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("metadata discovery failed: {0}")]
    Discovery(#[from] MirrorError),

    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("trust initialization failed: {0}")]
    Trust(#[from] TrustError),

    #[error("repository restructuring failed: {0}")]
    Restructure(#[from] RepoError),

    #[error("archiving failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("encoding failed: {0}")]
    Encode(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inputs for one assembly run.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Base URL of the TUF repository mirror.
    pub mirror: String,
    /// Trust store directory; a per-run temporary directory when unset.
    pub trust_store: Option<PathBuf>,
}

/// Run the full pipeline against the configured mirror and return the
/// rendered `TrustRoot` document.
pub async fn assemble(config: &AssembleConfig) -> Result<String, AssembleError> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(FetchError::from)?;

    // Scoped acquisition: the store directory is removed when `location`
    // drops, success or failure.
    let location = match &config.trust_store {
        Some(path) => TrustStoreLocation::Explicit(path.clone()),
        None => TrustStoreLocation::ephemeral()?,
    };
    let store = MirrorTrustStore::new(location.path().to_path_buf(), client.clone());

    assemble_with(config, &client, &store).await
}

/// Pipeline body, generic over the trust bootstrap implementation.
pub async fn assemble_with(
    config: &AssembleConfig,
    client: &Client,
    initializer: &dyn TrustInitializer,
) -> Result<String, AssembleError> {
    let mirror = config.mirror.as_str();
    let workdir = WorkingRepository::create()?;

    // The four roles have no data dependency on each other; resolve and
    // fetch them concurrently. try_join_all drops the in-flight fetches as
    // soon as any one of them fails.
    let fetches = MetadataRole::ALL.iter().map(|role| {
        let workdir = &workdir;
        async move {
            let name = mirror::resolve_latest(client, mirror, *role).await?;
            let url = format!("{mirror}/{name}");
            debug!(%url, "fetching metadata");
            fetch::download_file(client, &url, &workdir.metadata_path(&name)).await?;
            Ok::<String, AssembleError>(name)
        }
    });
    let fetched = future::try_join_all(fetches).await?;

    // ALL is ordered with Root first; try_join_all preserves input order.
    let root_name = fetched[0].as_str();
    info!("mirror {mirror}, root {mirror}/{root_name}");

    let root_json = std::fs::read(workdir.metadata_path(root_name))?;
    initializer.initialize(mirror, &root_json).await?;

    let status = initializer.root_status()?;
    match serde_json::to_string_pretty(&status) {
        Ok(rendered) => info!("Root status: {rendered}"),
        Err(err) => debug!("could not render root status: {err}"),
    }

    workdir.adopt_targets(&initializer.targets_dir())?;

    let archive_file = tempfile::Builder::new()
        .prefix("repository-")
        .suffix(".tar.gz")
        .tempfile()?;
    archive::compress_directory(workdir.path(), archive_file.path())?;

    let mirror_fs = encode::encode_file(archive_file.path()).map_err(AssembleError::Encode)?;
    let root = encode::encode_bytes(&root_json);

    Ok(TrustRootManifest::new(mirror, root, mirror_fs).render())
}
