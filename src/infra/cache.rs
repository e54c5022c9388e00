//! On-disk cache of provider responses.
//!
//! Historical timing data never changes once a session is over, so raw
//! response bodies are kept gzip-compressed under a cache directory chosen
//! by configuration and reused across runs.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Uses `dir` as the cache root, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached body for `key`. A missing or unreadable entry is a miss.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        let file = fs::File::open(&path).ok()?;

        let mut body = Vec::new();
        match GzDecoder::new(file).read_to_end(&mut body) {
            Ok(_) => {
                debug!(key, "Cache hit");
                Some(body)
            }
            Err(e) => {
                warn!(key, path = %path.display(), error = %e, "Corrupt cache entry, ignoring");
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    /// Stores `body` under `key`. Each write goes to its own temp file in the
    /// cache dir and is renamed into place, so concurrent writers of one key
    /// never share a file and readers never see a partial entry.
    pub fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let path = self.path_for(key);

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to create temp file in {}", self.dir.display()))?;
        let mut encoder = GzEncoder::new(tmp.as_file_mut(), Compression::default());
        encoder.write_all(body)?;
        encoder.finish()?;

        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to write cache entry {}", path.display()))?;

        debug!(key, bytes = body.len(), "Cached response");
        Ok(())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.gz", encode_key(key)))
    }
}

/// Filesystem-safe, collision-free file stem for a cache key.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' {
            out.push(b as char);
        } else {
            out.push_str(&format!("_{b:02x}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(dir.path().join("nested")).unwrap();

        assert!(cache.get("/v1/laps?session_key=9158").is_none());
        cache.put("/v1/laps?session_key=9158", b"[{\"lap_number\":1}]").unwrap();

        assert_eq!(
            cache.get("/v1/laps?session_key=9158").as_deref(),
            Some(&b"[{\"lap_number\":1}]"[..])
        );
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(dir.path()).unwrap();
        fs::write(cache.path_for("k"), b"not gzip").unwrap();

        assert!(cache.get("k").is_none());
        assert!(!cache.path_for("k").exists());
    }

    #[test]
    fn test_concurrent_puts_of_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(dir.path()).unwrap();
        let key = "/v1/meetings?year=2023";
        let writers = 8;
        let body: Vec<u8> = (0..1 << 20).map(|i| (i % 251) as u8).collect();
        let barrier = std::sync::Barrier::new(writers);
        let (cache, body, barrier) = (&cache, &body, &barrier);

        for _ in 0..5 {
            std::thread::scope(|s| {
                let handles: Vec<_> = (0..writers)
                    .map(move |_| {
                        s.spawn(move || {
                            barrier.wait();
                            cache.put(key, body)
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap().unwrap();
                }
            });

            assert_eq!(cache.get(key).as_deref(), Some(&body[..]));
        }

        // Only the entry itself is left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_key_encoding_is_distinct() {
        assert_ne!(encode_key("a/b"), encode_key("a_b"));
        assert_eq!(encode_key("v1.laps-x"), "v1.laps-x");
        assert!(!encode_key("/v1/laps?x=1&y=2").contains('/'));
    }
}
