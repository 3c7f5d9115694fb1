//! trustroot - TUF trust-root bundle assembler
//!
//! Assembles a portable, self-contained trust-root bundle from a TUF
//! repository mirror and renders it as a declarative `TrustRoot` resource
//! for a downstream policy-enforcement consumer.
//!
//! # Pipeline
//!
//! ```text
//! mirror listing -> latest metadata names -> fetched working repository
//!   -> trust store bootstrap -> targets relocation -> .tar.gz archive
//!   -> base64 payloads -> TrustRoot YAML on stdout
//! ```
//!
//! Each stage feeds the next; any failure aborts the whole run. All
//! per-run state (working repository, archive, trust store) lives in
//! scoped temporary locations released on every exit path.

pub mod archive;
pub mod encode;
pub mod fetch;
pub mod manifest;
pub mod mirror;
pub mod pipeline;
pub mod repo;
pub mod role;
pub mod trust;

// Re-exports for convenience
pub use pipeline::{AssembleConfig, AssembleError, assemble};
pub use role::MetadataRole;
