use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Hex-encoded BLAKE3 digest of a byte slice.
///
/// Every digest in this crate has this form, whether it comes from a slice, a
/// file or a reader, so equal content always yields equal digests.
pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Digest of everything `reader` yields, fed to the hasher in chunks.
pub fn hash_reader<R: Read>(reader: R) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(reader)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Hash the full content of a file.
pub fn hash_file(file: &Path) -> io::Result<String> {
    hash_reader(File::open(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_and_bytes_agree() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("app.js");
        fs::write(&file, "console.log('v1');").unwrap();

        assert_eq!(
            hash_file(&file).unwrap(),
            hash_bytes(b"console.log('v1');")
        );
    }

    #[test]
    fn test_digest_is_fixed_length_hex() {
        let digest = hash_bytes(b"");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(digest, hash_bytes(b"x"));
    }

    #[test]
    fn test_streamed_digest_matches_in_memory_digest() {
        // Larger than blake3's internal read buffer, so several chunks are fed.
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(hash_reader(&data[..]).unwrap(), hash_bytes(&data));
        assert_eq!(hash_reader(io::empty()).unwrap(), hash_bytes(b""));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        assert!(hash_file(&tmp.path().join("nope")).is_err());
    }
}
