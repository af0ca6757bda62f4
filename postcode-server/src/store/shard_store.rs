//! Swap-on-demand shard store.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, info};

use crate::postcode::NormalizedPostcode;

use super::error::StoreError;
use super::partition::{Shard, ShardPaths};

/// Normalized postcode → encoded coordinate.
type ShardMap = HashMap<String, String>;

/// The shard currently held in memory.
struct Resident {
    shard: Shard,
    entries: ShardMap,
}

/// Postcode store that keeps at most one shard in memory.
///
/// All access goes through a single mutex, so concurrent requests never
/// observe a half-swapped shard. A [`ShardSession`] holds the lock for a whole
/// batch, which keeps the batch's reload count bounded by the number of shards.
///
/// The resident shard number is mirrored in an atomic so status reads never
/// wait on a running batch.
pub struct ShardStore {
    paths: ShardPaths,
    resident: Mutex<Option<Resident>>,
    /// 0 when nothing is resident, otherwise [`Shard::number`]
    resident_marker: AtomicU8,
    loads: AtomicU64,
}

impl ShardStore {
    /// Create a store over the given blobs. Nothing is loaded until first use.
    pub fn new(paths: ShardPaths) -> Self {
        Self {
            paths,
            resident: Mutex::new(None),
            resident_marker: AtomicU8::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Create a store over the standard blobs in `dir`.
    ///
    /// Fails if either blob is missing, so a broken deployment is caught at
    /// startup rather than on the first request for that shard.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let paths = ShardPaths::in_dir(dir);
        for shard in Shard::ALL {
            let path = paths.path(shard);
            if !path.is_file() {
                return Err(StoreError::MissingShard {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(Self::new(paths))
    }

    /// Blob locations.
    pub fn paths(&self) -> &ShardPaths {
        &self.paths
    }

    /// Lock the store for a sequence of lookups.
    pub fn session(&self) -> ShardSession<'_> {
        // A panic mid-swap leaves `None` behind, never a torn shard, so the
        // poisoned state is still consistent.
        let guard = self
            .resident
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        ShardSession { store: self, guard }
    }

    /// Look up a single postcode, returning its encoded coordinate.
    pub fn lookup(&self, postcode: &NormalizedPostcode) -> Result<Option<String>, StoreError> {
        let mut session = self.session();
        Ok(session.lookup(postcode)?.map(str::to_string))
    }

    /// Which shard is in memory right now, if any.
    ///
    /// Doesn't take the store lock; during a swap this may briefly report no
    /// shard.
    pub fn resident_shard(&self) -> Option<Shard> {
        Shard::from_number(self.resident_marker.load(Ordering::Acquire))
    }

    /// Number of shard loads performed since the store was created.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn load(&self, shard: Shard) -> Result<ShardMap, StoreError> {
        let path = self.paths.path(shard);
        let started = Instant::now();

        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: ShardMap =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                StoreError::Corrupt {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(
            %shard,
            entries = entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded shard"
        );
        Ok(entries)
    }
}

/// Exclusive access to a [`ShardStore`] for the duration of a batch.
pub struct ShardSession<'a> {
    store: &'a ShardStore,
    guard: MutexGuard<'a, Option<Resident>>,
}

impl ShardSession<'_> {
    /// Which shard is in memory right now, if any.
    pub fn resident(&self) -> Option<Shard> {
        self.guard.as_ref().map(|r| r.shard)
    }

    /// Look up a postcode, swapping shards first if needed.
    ///
    /// `Ok(None)` means the postcode isn't in the dataset. Errors are load
    /// failures and are fatal for the whole request.
    pub fn lookup(&mut self, postcode: &NormalizedPostcode) -> Result<Option<&str>, StoreError> {
        let shard = Shard::for_postcode(postcode);
        let resident = self.ensure_resident(shard)?;
        Ok(resident.entries.get(postcode.as_str()).map(String::as_str))
    }

    fn ensure_resident(&mut self, shard: Shard) -> Result<&Resident, StoreError> {
        let resident = match self.guard.take() {
            Some(resident) if resident.shard == shard => resident,
            stale => {
                debug!(from = ?stale.as_ref().map(|r| r.shard), to = %shard, "swapping shard");
                // The old map must be gone before the new one is read: the two
                // are never in memory together.
                drop(stale);
                self.store.resident_marker.store(0, Ordering::Release);
                let entries = self.store.load(shard)?;
                self.store
                    .resident_marker
                    .store(shard.number(), Ordering::Release);
                Resident { shard, entries }
            }
        };
        Ok(self.guard.insert(resident))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_shard(dir: &Path, shard: Shard, entries: &[(&str, &str)]) -> PathBuf {
        let map: HashMap<&str, &str> = entries.iter().copied().collect();
        let path = dir.join(shard.file_name());
        std::fs::write(&path, serde_json::to_vec(&map).unwrap()).unwrap();
        path
    }

    fn fixture() -> (TempDir, ShardStore) {
        let dir = tempdir().unwrap();
        write_shard(dir.path(), Shard::One, &[("dd69dd", "6.936 5.567")]);
        write_shard(dir.path(), Shard::Two, &[("sw81hl", "1.975 8.379")]);
        let store = ShardStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn pc(raw: &str) -> NormalizedPostcode {
        NormalizedPostcode::new(raw)
    }

    #[test]
    fn starts_empty() {
        let (dir, store) = fixture();
        assert_eq!(store.paths(), &ShardPaths::in_dir(dir.path()));
        assert_eq!(store.resident_shard(), None);
        assert_eq!(store.load_count(), 0);
    }

    #[test]
    fn loads_on_first_lookup() {
        let (_dir, store) = fixture();
        let value = store.lookup(&pc("SW8 1HL")).unwrap();
        assert_eq!(value.as_deref(), Some("1.975 8.379"));
        assert_eq!(store.resident_shard(), Some(Shard::Two));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn same_shard_does_not_reload() {
        let (_dir, store) = fixture();
        store.lookup(&pc("sw81hl")).unwrap();
        store.lookup(&pc("zz11zz")).unwrap();
        store.lookup(&pc("")).unwrap();
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn swaps_between_shards() {
        let (_dir, store) = fixture();
        assert!(store.lookup(&pc("sw81hl")).unwrap().is_some());
        assert!(store.lookup(&pc("dd69dd")).unwrap().is_some());
        assert_eq!(store.resident_shard(), Some(Shard::One));
        assert!(store.lookup(&pc("sw81hl")).unwrap().is_some());
        assert_eq!(store.resident_shard(), Some(Shard::Two));
        assert_eq!(store.load_count(), 3);
    }

    #[test]
    fn absent_postcode_is_none() {
        let (_dir, store) = fixture();
        assert_eq!(store.lookup(&pc("abc123")).unwrap(), None);
        assert_eq!(store.lookup(&pc("")).unwrap(), None);
    }

    #[test]
    fn shards_are_disjoint_in_lookup() {
        // A key placed in the wrong blob is never found
        let dir = tempdir().unwrap();
        write_shard(dir.path(), Shard::One, &[("sw81hl", "1.975 8.379")]);
        write_shard(dir.path(), Shard::Two, &[]);
        let store = ShardStore::open(dir.path()).unwrap();
        assert_eq!(store.lookup(&pc("sw81hl")).unwrap(), None);
    }

    #[test]
    fn open_rejects_missing_blob() {
        let dir = tempdir().unwrap();
        write_shard(dir.path(), Shard::One, &[]);
        let err = ShardStore::open(dir.path()).err().unwrap();
        match err {
            StoreError::MissingShard { path } => {
                assert_eq!(path, dir.path().join("postcodes_2.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_blob_at_lookup_is_io_error() {
        let dir = tempdir().unwrap();
        let store = ShardStore::new(ShardPaths::in_dir(dir.path()));
        let err = store.lookup(&pc("sw81hl")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.resident_shard(), None);
        assert_eq!(store.load_count(), 0);
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let dir = tempdir().unwrap();
        write_shard(dir.path(), Shard::One, &[]);
        std::fs::write(dir.path().join(Shard::Two.file_name()), b"[1, 2, 3]").unwrap();
        let store = ShardStore::open(dir.path()).unwrap();

        let err = store.lookup(&pc("sw81hl")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn failed_swap_leaves_nothing_resident() {
        let dir = tempdir().unwrap();
        write_shard(dir.path(), Shard::One, &[("dd69dd", "6.936 5.567")]);
        let store = ShardStore::new(ShardPaths::in_dir(dir.path()));

        store.lookup(&pc("dd69dd")).unwrap();
        assert_eq!(store.resident_shard(), Some(Shard::One));

        assert!(store.lookup(&pc("sw81hl")).is_err());
        assert_eq!(store.resident_shard(), None);
    }

    #[test]
    fn session_keeps_lock_across_lookups() {
        let (_dir, store) = fixture();
        let mut session = store.session();
        assert_eq!(session.resident(), None);
        assert_eq!(session.lookup(&pc("dd69dd")).unwrap(), Some("6.936 5.567"));
        assert_eq!(session.lookup(&pc("sw81hl")).unwrap(), Some("1.975 8.379"));
        assert_eq!(session.resident(), Some(Shard::Two));
        drop(session);
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn resident_shard_does_not_wait_for_a_session() {
        let (_dir, store) = fixture();
        store.lookup(&pc("dd69dd")).unwrap();
        let store = std::sync::Arc::new(store);

        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder = {
            let store = store.clone();
            std::thread::spawn(move || {
                let _session = store.session();
                locked_tx.send(()).unwrap();
                let _ = release_rx.recv_timeout(std::time::Duration::from_secs(5));
            })
        };
        locked_rx.recv().unwrap();

        let started = Instant::now();
        assert_eq!(store.resident_shard(), Some(Shard::One));
        assert_eq!(store.load_count(), 1);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));

        release_tx.send(()).unwrap();
        holder.join().unwrap();
    }

    #[test]
    fn concurrent_lookups_see_consistent_shards() {
        let (_dir, store) = fixture();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let (raw, expected) = if i % 2 == 0 {
                            ("dd69dd", "6.936 5.567")
                        } else {
                            ("sw81hl", "1.975 8.379")
                        };
                        let value = store.lookup(&NormalizedPostcode::new(raw)).unwrap();
                        assert_eq!(value.as_deref(), Some(expected));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
