//! Persistent key-value storage.
//!
//! Everything the client remembers between runs (the session and the cart)
//! goes through a [`Storage`], a synchronous string-to-string store in the
//! spirit of a browser's local storage.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs,
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

/// A synchronous string key-value store.
///
/// Reads and writes never fail from the caller's point of view. A missing
/// key is a perfectly normal result, and implementations which talk to
/// something that *can* fail (e.g. the file system) are expected to log the
/// problem and carry on.
///
/// Handles are cheap to clone and every clone sees the same data. There is
/// no locking, so a store must only be used from a single thread.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Option<String> { (**self).get(key) }

    fn set(&self, key: &str, value: &str) { (**self).set(key, value) }

    fn remove(&self, key: &str) { (**self).remove(key) }
}

/// A [`Storage`] which only lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self { MemoryStorage::default() }

    /// How many keys are currently stored?
    pub fn len(&self) -> usize { self.entries.borrow().len() }

    pub fn is_empty(&self) -> bool { self.entries.borrow().is_empty() }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) { self.entries.borrow_mut().remove(key); }
}

/// A [`Storage`] backed by a JSON object on disk.
///
/// The whole file is read when the store is opened and rewritten after
/// every change. Concurrent writers (e.g. two processes pointed at the same
/// file) are last-writer-wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: Rc<PathBuf>,
    cache: MemoryStorage,
}

impl FileStorage {
    /// Open the store at `path`.
    ///
    /// A missing file is treated as an empty store, as is a file which
    /// doesn't contain a JSON object of strings.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let cache = MemoryStorage::new();

        match read_entries(&path) {
            Ok(entries) => {
                log::debug!(
                    "Loaded {} entries from \"{}\"",
                    entries.len(),
                    path.display()
                );
                *cache.entries.borrow_mut() = entries;
            },
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "\"{}\" doesn't exist, starting with an empty store",
                    path.display()
                );
            },
            Err(e) => {
                log::warn!(
                    "Unable to read \"{}\", starting with an empty store: {}",
                    path.display(),
                    e
                );
            },
        }

        FileStorage {
            path: Rc::new(path),
            cache,
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn flush(&self) {
        if let Err(e) = self.write_entries() {
            log::warn!("Unable to save \"{}\": {}", self.path.display(), e);
        }
    }

    fn write_entries(&self) -> Result<(), io::Error> {
        let entries = self.cache.entries.borrow();
        let json = serde_json::to_string_pretty(&*entries)?;
        log::trace!(
            "Writing {} entries to {}",
            entries.len(),
            self.path.display()
        );

        fs::write(&*self.path, json)
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, io::Error> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(io::Error::from)
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> { self.cache.get(key) }

    fn set(&self, key: &str, value: &str) {
        self.cache.set(key, value);
        self.flush();
    }

    fn remove(&self, key: &str) {
        if self.cache.get(key).is_some() {
            self.cache.remove(key);
            self.flush();
        }
    }
}
