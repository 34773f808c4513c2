//! Image markers.
//!
//! Image entries do not store pixels. They store a marker of the form
//! `image:<width>x<height>:<sha256 prefix>` that is stable for identical
//! clipboard images, so the usual content dedupe applies.

use sha2::{Digest, Sha256};

const MARKER_PREFIX: &str = "image:";
const HASH_PREFIX_LEN: usize = 16;

/// Build the marker for raw RGBA pixels
pub fn image_marker(width: usize, height: usize, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((width as u64).to_le_bytes());
    hasher.update((height as u64).to_le_bytes());
    hasher.update(bytes);
    let hash = hex::encode(hasher.finalize());
    format!(
        "{}{}x{}:{}",
        MARKER_PREFIX,
        width,
        height,
        &hash[..HASH_PREFIX_LEN]
    )
}

/// Width and height encoded in a marker
pub fn parse_dimensions(content: &str) -> Option<(usize, usize)> {
    let rest = content.strip_prefix(MARKER_PREFIX)?;
    let (dims, hash) = rest.split_once(':')?;
    if hash.is_empty() {
        return None;
    }
    let (width, height) = dims.split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}
