use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted value with read-write locking.
///
/// `Shared` is how chunks are handed between the main thread and the worker
/// pool. The main thread is the only writer; workers take short read locks,
/// one value at a time, so two handles are never locked in a cycle.
///
/// A poisoned lock is recovered rather than propagated: the data behind it is
/// plain voxel storage that stays structurally valid even if a worker panicked
/// while reading it.
///
/// # Examples
///
/// ```
/// use voxel_world::core::Shared;
///
/// let value = Shared::new(vec![1, 2, 3]);
/// let other = value.clone();
///
/// other.write().push(4);
/// assert_eq!(value.read().len(), 4);
/// assert!(value.ptr_eq(&other));
/// ```
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Shared<T> {
    /// Wraps `value` in a new shared handle.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Returns a guard that allows reading the contained value.
    ///
    /// Blocks while the main thread holds a write guard.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a guard that allows modifying the contained value.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Shared").field(&*self.read()).finish()
    }
}
