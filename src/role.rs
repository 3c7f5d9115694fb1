//! TUF metadata role identifiers.

use std::fmt;

/// The four top-level metadata roles published by a TUF repository mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataRole {
    /// Root role: the signed trust anchor listing authorized keys and roles.
    Root,
    /// Snapshot role: version numbers of all other metadata files.
    Snapshot,
    /// Targets role: maps delegated target files to hashes and sizes.
    Targets,
    /// Timestamp role: the freshness marker, always served unversioned.
    Timestamp,
}

impl MetadataRole {
    /// Every role, in the order they are staged into the working repository.
    /// `Root` is first; the pipeline depends on that for trust bootstrap.
    pub const ALL: [MetadataRole; 4] = [
        MetadataRole::Root,
        MetadataRole::Snapshot,
        MetadataRole::Targets,
        MetadataRole::Timestamp,
    ];

    /// Filename suffix carried by this role's metadata files on the mirror,
    /// e.g. `root.json` in `5.root.json`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            MetadataRole::Root => "root.json",
            MetadataRole::Snapshot => "snapshot.json",
            MetadataRole::Targets => "targets.json",
            MetadataRole::Timestamp => "timestamp.json",
        }
    }

    /// Whether the mirror publishes this role only under its fixed, unversioned
    /// filename. Per TUF, the unversioned `timestamp.json` is always current.
    pub fn is_unversioned(self) -> bool {
        matches!(self, MetadataRole::Timestamp)
    }
}

impl fmt::Display for MetadataRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataRole::Root => write!(f, "root"),
            MetadataRole::Snapshot => write!(f, "snapshot"),
            MetadataRole::Targets => write!(f, "targets"),
            MetadataRole::Timestamp => write!(f, "timestamp"),
        }
    }
}
