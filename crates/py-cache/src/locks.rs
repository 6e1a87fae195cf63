//! Locks por clave para el modo single-flight.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ejecuta `f` con el lock de `key` tomado.
    pub fn with_lock<T, F>(&self, key: &str, f: F) -> T
        where F: FnOnce() -> T
    {
        let lock = self.locks
                       .entry(key.to_string())
                       .or_insert_with(|| Arc::new(Mutex::new(())))
                       .value()
                       .clone();
        let out = {
            // Un pánico previo no invalida el `()` protegido.
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f()
        };
        drop(lock);
        self.locks.remove_if(key, |_, l| Arc::strong_count(l) == 1);
        out
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn entries_are_dropped_after_use() {
        let locks = KeyedLocks::new();
        assert_eq!(locks.with_lock("k", || 5), 5);
        assert!(locks.is_empty());
    }

    #[test]
    fn same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8).map(|_| {
                                        let locks = Arc::clone(&locks);
                                        let inside = Arc::clone(&inside);
                                        let max_seen = Arc::clone(&max_seen);
                                        thread::spawn(move || {
                                            locks.with_lock("same", || {
                                                     let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                                                     max_seen.fetch_max(now, Ordering::SeqCst);
                                                     thread::sleep(std::time::Duration::from_millis(5));
                                                     inside.fetch_sub(1, Ordering::SeqCst);
                                                 })
                                        })
                                    })
                                    .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
