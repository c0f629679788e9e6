//! Binary program images.
//!
//! An image is the plain concatenation of every word as 4 big-endian bytes:
//! no header, no framing, no checksum.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Bytes per machine word.
pub const WORD_BYTES: usize = 4;

/// Serialize words to an image.
pub fn to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Parse an image back into words.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<u32>, ImageError> {
    if bytes.len() % WORD_BYTES != 0 {
        return Err(ImageError::TruncatedWord { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(WORD_BYTES)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Load an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<u32>, ImageError> {
    let bytes = std::fs::read(path.as_ref()).map_err(|e| ImageError::IoError(e.to_string()))?;
    let words = from_bytes(&bytes)?;
    debug!(path = %path.as_ref().display(), words = words.len(), "loaded image");
    Ok(words)
}

/// Save an image to disk.
pub fn save_image<P: AsRef<Path>>(path: P, words: &[u32]) -> Result<(), ImageError> {
    std::fs::write(path.as_ref(), to_bytes(words))
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    debug!(path = %path.as_ref().display(), words = words.len(), "saved image");
    Ok(())
}

/// Errors that can occur during image operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("image length {len} is not a multiple of {word} bytes", word = WORD_BYTES)]
    TruncatedWord { len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        assert_eq!(
            to_bytes(&[0x1A50_000A, 0x0000_00FF]),
            vec![0x1A, 0x50, 0x00, 0x0A, 0x00, 0x00, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_from_bytes() {
        let words = from_bytes(&[0x2A, 0x50, 0x00, 0x64]).unwrap();
        assert_eq!(words, vec![0x2A50_0064]);
        assert_eq!(from_bytes(&[]).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_truncated_image() {
        assert_eq!(
            from_bytes(&[1, 2, 3, 4, 5]),
            Err(ImageError::TruncatedWord { len: 5 })
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("quad-image-{}.bin", std::process::id()));
        let words = vec![0x1A50_000A, 0x2A50_0064, 0x3E50_0064];

        save_image(&path, &words).unwrap();
        let loaded = load_image(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, words);
    }

    #[test]
    fn test_missing_file() {
        let err = load_image("/nonexistent/quad/program.bin").unwrap_err();
        assert!(matches!(err, ImageError::IoError(_)));
    }
}
