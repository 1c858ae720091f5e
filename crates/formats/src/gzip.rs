use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::FormatError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflates a gzip (or bare zlib) payload into UTF-8 text.
///
/// The expression service serves `.gz` files; older deployments sent zlib
/// streams, so the container is picked from the magic bytes.
pub fn inflate(bytes: &[u8]) -> Result<String, FormatError> {
    let mut out = String::new();
    if bytes.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(bytes).read_to_string(&mut out)?;
    } else {
        ZlibDecoder::new(bytes).read_to_string(&mut out)?;
    }
    Ok(out)
}
