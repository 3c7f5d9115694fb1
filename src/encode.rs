//! Base64 encoding of binary artifacts for textual embedding.

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encode a file's entire contents as standard base64 (padded, no line
/// wrapping). An empty file encodes to an empty string.
pub fn encode_file(path: &Path) -> io::Result<String> {
    let data = fs::read(path)?;
    Ok(STANDARD.encode(data))
}

/// Encode raw bytes as standard base64.
pub fn encode_bytes(data: &[u8]) -> String {
    STANDARD.encode(data)
}
