//! Key-addressed cache for expensive intermediate results
//!
//! Assembling an observable matrix means decoding thousands of result files,
//! so the assembled matrix is stored under a key and reused on later runs.
//! The caching policy lives here, not in the plotting code: callers only
//! hand [`fetch_or_compute`] a key and a closure.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_pickle::{DeOptions, SerOptions};
use tracing::{debug, info};

use crate::error::{IoError, IoResult};

/// Storage backend addressed by string keys
pub trait KeyedStore<V> {
    /// Stored value for `key`, if any
    fn get(&self, key: &str) -> IoResult<Option<V>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&mut self, key: &str, value: &V) -> IoResult<()>;
}

/// Whether stored values may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    UseCached,
    Recompute,
}

impl CachePolicy {
    pub fn from_recompute(recompute: bool) -> Self {
        if recompute {
            CachePolicy::Recompute
        } else {
            CachePolicy::UseCached
        }
    }
}

/// Return the stored value for `key`, or compute, store and return it
///
/// A failed computation stores nothing.
pub fn fetch_or_compute<V, S, F, E>(
    store: &mut S,
    key: &str,
    policy: CachePolicy,
    compute: F,
) -> Result<V, E>
where
    S: KeyedStore<V> + ?Sized,
    F: FnOnce() -> Result<V, E>,
    E: From<IoError>,
{
    if policy == CachePolicy::UseCached {
        if let Some(value) = store.get(key)? {
            debug!(key, "cache hit");
            return Ok(value);
        }
    }
    debug!(key, ?policy, "computing value");
    let value = compute()?;
    store.put(key, &value)?;
    Ok(value)
}

/// One pickle file per key: `<dir>/<key>_matrix.pkl`
#[derive(Debug, Clone)]
pub struct PickleStore {
    dir: PathBuf,
}

impl PickleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}_matrix.pkl", key))
    }
}

impl<V> KeyedStore<V> for PickleStore
where
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> IoResult<Option<V>> {
        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IoError::open(&path, e)),
        };
        let value = serde_pickle::from_reader(BufReader::new(file), DeOptions::new()).map_err(
            |e| IoError::InvalidFormat {
                path: path.clone(),
                message: e.to_string(),
            },
        )?;
        Ok(Some(value))
    }

    /// Writes a sibling temp file and renames it over the entry, so an
    /// interrupted or failed write never replaces a readable entry.
    fn put(&mut self, key: &str, value: &V) -> IoResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}_matrix.pkl.tmp", key));
        let written =
            write_pickle(&tmp, value).and_then(|()| fs::rename(&tmp, &path).map_err(IoError::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        info!(path = %path.display(), "cached value");
        Ok(())
    }
}

fn write_pickle<V: Serialize>(path: &Path, value: &V) -> IoResult<()> {
    let file = File::create(path).map_err(|e| IoError::open(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_pickle::to_writer(&mut writer, value, SerOptions::new())?;
    writer.flush()?;
    Ok(())
}

/// In-process store
#[derive(Debug, Clone)]
pub struct MemoryStore<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> KeyedStore<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> IoResult<Option<V>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &V) -> IoResult<()> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}
