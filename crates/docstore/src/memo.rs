//! A cache for the results of pure string-building functions.
//!
//! Entries are keyed by a function tag (a `'static` name chosen by the caller, usually `module::function`) and a
//! canonical string form of the arguments.  Only pure functions may be cached: the first computed value for a key is
//! the one everyone sees forever after.
//!
//! The process-wide cache returned by [global] never evicts.  That's fine for the crate's own use, since the inputs are
//! literal SQL text written by programmers, of which there is a small finite amount.  Callers caching something with
//! unbounded input should build their own [MemoCache::bounded].
//!
//! The cache is behind a mutex and may be used from any thread.  Values are computed outside the lock, so two threads
//! racing on the same key may both compute it; the first insert wins.
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use log::*;
use lru::LruCache;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct MemoKey {
    tag: &'static str,
    args: String,
}

enum Store {
    Unbounded(HashMap<MemoKey, Arc<str>>),
    Bounded(LruCache<MemoKey, Arc<str>>),
}

pub struct MemoCache {
    store: Mutex<Store>,
}

lazy_static::lazy_static! {
    static ref GLOBAL_CACHE: MemoCache = MemoCache::unbounded();
}

/// The process-wide, unbounded cache.
pub fn global() -> &'static MemoCache {
    &GLOBAL_CACHE
}

impl MemoCache {
    pub fn unbounded() -> MemoCache {
        MemoCache {
            store: Mutex::new(Store::Unbounded(Default::default())),
        }
    }

    /// A cache which holds at most `capacity` entries, evicting the least recently used.
    pub fn bounded(capacity: NonZeroUsize) -> MemoCache {
        MemoCache {
            store: Mutex::new(Store::Bounded(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // Everything in here is the output of a pure function, so a panic elsewhere can't leave it inconsistent.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached value for `(tag, args)`, calling `compute` to fill it in on a miss.
    pub fn get_or_insert_with(
        &self,
        tag: &'static str,
        args: &str,
        compute: impl FnOnce() -> String,
    ) -> Arc<str> {
        let key = MemoKey {
            tag,
            args: args.to_string(),
        };

        {
            let mut store = self.lock();
            let hit = match &mut *store {
                Store::Unbounded(m) => m.get(&key),
                Store::Bounded(m) => m.get(&key),
            };
            if let Some(v) = hit {
                return v.clone();
            }
        }

        trace!("Memo miss for {}({})", tag, args);
        let computed: Arc<str> = compute().into();

        let mut store = self.lock();
        match &mut *store {
            Store::Unbounded(m) => m.entry(key).or_insert(computed).clone(),
            Store::Bounded(m) => m.get_or_insert(key, || computed).clone(),
        }
    }

    pub fn len(&self) -> usize {
        match &*self.lock() {
            Store::Unbounded(m) => m.len(),
            Store::Bounded(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        match &mut *self.lock() {
            Store::Unbounded(m) => m.clear(),
            Store::Bounded(m) => m.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    #[test]
    fn computes_once_per_key() {
        let cache = MemoCache::unbounded();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            "out".to_string()
        };

        assert_eq!(&*cache.get_or_insert_with("f", "a", compute), "out");
        assert_eq!(&*cache.get_or_insert_with("f", "a", compute), "out");
        assert_eq!(calls.get(), 1);

        cache.get_or_insert_with("f", "b", compute);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    /// Two functions called with the same argument string must not see each other's results.
    #[test]
    fn tags_separate_functions() {
        let cache = MemoCache::unbounded();
        let a = cache.get_or_insert_with("upper", "x", || "X".into());
        let b = cache.get_or_insert_with("double", "x", || "xx".into());
        assert_eq!(&*a, "X");
        assert_eq!(&*b, "xx");
    }

    #[test]
    fn bounded_evicts() {
        let cache = MemoCache::bounded(NonZeroUsize::new(2).unwrap());
        cache.get_or_insert_with("f", "1", || "1".into());
        cache.get_or_insert_with("f", "2", || "2".into());
        cache.get_or_insert_with("f", "3", || "3".into());
        assert_eq!(cache.len(), 2);

        // "1" was the least recently used, so it must be recomputed.
        let v = cache.get_or_insert_with("f", "1", || "recomputed".into());
        assert_eq!(&*v, "recomputed");
    }

    #[test]
    fn clear_empties() {
        let cache = MemoCache::unbounded();
        cache.get_or_insert_with("f", "1", || "1".into());
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(MemoCache::unbounded());
        let handles = (0..4)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let args = i.to_string();
                        let got = cache.get_or_insert_with("square", &args, || (i * i).to_string());
                        assert_eq!(&*got, (i * i).to_string());
                    }
                })
            })
            .collect::<Vec<_>>();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 100);
    }
}
