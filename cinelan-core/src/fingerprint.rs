use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Derive the content-addressed key identifying one media file at one point
/// in time.
///
/// The key is the first 8 bytes of a SHA-256 digest over
/// `<path>|<mtime nanos>`, rendered as 16 lowercase hex characters. Editing
/// or replacing the file bumps its mtime, so its key changes and any cached
/// artifacts under the old key stop being addressed. A missing file hashes
/// with mtime 0, which keeps the mapping deterministic.
///
/// Keys are only unique within one host's dataset; 64 bits of digest is not
/// enough to assume uniqueness across machines.
pub fn media_key<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    let mtime_nanos = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
        .map(|since_epoch| since_epoch.as_nanos())
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(format!("|{}", mtime_nanos).as_bytes());

    let hex = format!("{:x}", hasher.finalize());
    hex[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_key_shape() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("movie.mkv");
        fs::write(&file, b"content").unwrap();

        let key = media_key(&file);
        assert_eq!(key.len(), 16);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, key.to_lowercase());
    }

    #[test]
    fn test_key_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("movie.mkv");
        fs::write(&file, b"content").unwrap();

        assert_eq!(media_key(&file), media_key(&file));
    }

    #[test]
    fn test_key_depends_on_path() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.mkv");
        let b = temp_dir.path().join("b.mkv");
        fs::write(&a, b"content").unwrap();
        fs::write(&b, b"content").unwrap();

        assert_ne!(media_key(&a), media_key(&b));
    }

    #[test]
    fn test_key_depends_on_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("movie.mkv");
        fs::write(&file, b"v1").unwrap();
        let before = media_key(&file);

        // Push the mtime well past the original write.
        let past = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        let handle = fs::File::options().write(true).open(&file).unwrap();
        handle.set_modified(past).unwrap();
        drop(handle);

        assert_ne!(before, media_key(&file));
    }

    #[test]
    fn test_missing_file_is_deterministic() {
        let key_a = media_key("/no/such/file.mkv");
        let key_b = media_key("/no/such/file.mkv");
        assert_eq!(key_a, key_b);
        assert_eq!(key_a.len(), 16);
    }
}
