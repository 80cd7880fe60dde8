//! Process-scoped classifier cache.
//!
//! Loading a model is expensive, so a long-lived process loads it once and
//! shares it. [`ClassifierCache`] holds at most one value, initialised on the
//! first successful [`get_or_load`](ClassifierCache::get_or_load) and kept for
//! the life of the process. A failed load leaves the cache empty so a later
//! call can try again.
//!
//! ```
//! use framemood::ClassifierCache;
//!
//! static MODEL: ClassifierCache<String> = ClassifierCache::new();
//!
//! let first = MODEL.get_or_load(|| Ok::<_, ()>("weights".to_string())).unwrap();
//! let second = MODEL.get_or_load(|| Ok::<_, ()>("ignored".to_string())).unwrap();
//! assert_eq!(*second, "weights");
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// Lazily initialised shared value.
#[derive(Debug)]
pub struct ClassifierCache<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Default for ClassifierCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> ClassifierCache<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the cached value, running `load` first if the cache is empty.
    ///
    /// Concurrent callers block until one load finishes.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` returns on failure; nothing is cached.
    pub fn get_or_load<E, F>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<Arc<T>, E>,
    {
        self.cell
            .get_or_try_init(|| {
                log::debug!("Loading shared classifier");
                load()
            })
            .cloned()
    }

    /// The cached value, if loaded.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
