//! Request deduplication with a root-path exemption.
//!
//! A fingerprint is a blake3 digest of the normalized request (method plus
//! URL with the fragment stripped). Requests for a site's root path (`/`) are
//! never deduplicated: listing pages commonly redirect to or reference the
//! home page, and re-entry must stay possible across the crawl.

use std::collections::HashSet;
use std::sync::Mutex;

use url::Url;

type Fingerprint = [u8; 32];

/// Visited-set policy for one crawl run.
///
/// Check-then-insert is atomic under the internal lock, so overlapping
/// in-flight callbacks cannot both claim the same non-root URL.
#[derive(Debug, Default)]
pub struct RootAwareDupeFilter {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl RootAwareDupeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the URL should be fetched: always for root-path URLs,
    /// otherwise only the first time its fingerprint is observed.
    pub fn should_visit(&self, url: &Url) -> bool {
        if url.path() == "/" {
            return true;
        }

        let fp = Self::fingerprint("GET", url);
        self.lock_seen().insert(fp)
    }

    /// Number of distinct non-root fingerprints observed so far.
    pub fn seen_count(&self) -> usize {
        self.lock_seen().len()
    }

    fn lock_seen(&self) -> std::sync::MutexGuard<'_, HashSet<Fingerprint>> {
        match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn fingerprint(method: &str, url: &Url) -> Fingerprint {
        let mut normalized = url.clone();
        normalized.set_fragment(None);

        let mut hasher = blake3::Hasher::new();
        hasher.update(method.as_bytes());
        hasher.update(b"\n");
        hasher.update(normalized.as_str().as_bytes());
        *hasher.finalize().as_bytes()
    }
}
