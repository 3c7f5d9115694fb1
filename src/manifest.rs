//! TrustRoot resource rendering
//!
//! The final product: a declarative `TrustRoot` document embedding the
//! base64 root-of-trust and the base64 repository archive, named uniquely
//! per mirror and run.

use chrono::Utc;

/// Fields of the emitted `TrustRoot` resource.
#[derive(Debug, Clone)]
pub struct TrustRootManifest {
    /// Unique resource name: mirror identity plus generation timestamp.
    pub name: String,
    /// Base64-encoded root-of-trust document.
    pub root: String,
    /// Base64-encoded `.tar.gz` of the assembled repository.
    pub mirror_fs: String,
}

impl TrustRootManifest {
    /// Build a manifest named after `mirror` and the current Unix time.
    pub fn new(mirror: &str, root: String, mirror_fs: String) -> Self {
        Self::with_timestamp(mirror, root, mirror_fs, Utc::now().timestamp())
    }

    /// Build a manifest with an explicit generation timestamp.
    ///
    /// The resource name strips the `https://` scheme prefix from the mirror
    /// address; the timestamp suffix keeps names unique across runs against
    /// the same mirror.
    pub fn with_timestamp(mirror: &str, root: String, mirror_fs: String, timestamp: i64) -> Self {
        let name = format!("{}-{}", mirror.replace("https://", ""), timestamp);
        Self {
            name,
            root,
            mirror_fs,
        }
    }

    /// Render the resource as YAML, with the base64 payloads under
    /// block-scalar markers.
    pub fn render(&self) -> String {
        format!(
            r#"apiVersion: policy.sigstore.dev/v1alpha1
kind: TrustRoot
metadata:
  name: {name}
spec:
  repository:
    root: |-
      {root}
    mirrorFS: |-
      {mirror_fs}
"#,
            name = self.name,
            root = self.root,
            mirror_fs = self.mirror_fs,
        )
    }
}
