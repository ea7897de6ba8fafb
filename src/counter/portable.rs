use super::{Backend, CounterError, SizeCounter};
use crate::sync::atomic::Ordering;

/// Counter backed by `portable_atomic::AtomicUsize`.
///
/// On targets with native pointer-width atomics this is equivalent to
/// [`NativeCounter`](super::NativeCounter). Elsewhere `portable_atomic`
/// supplies the RMW operations (CAS loops, or critical sections on
/// single-core targets built with its `unsafe-assume-single-core` feature).
pub struct PortableCounter(portable_atomic::AtomicUsize);

impl PortableCounter {
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(portable_atomic::AtomicUsize::new(value))
    }

    /// Whether operations on this target are lock-free.
    #[must_use]
    pub fn is_lock_free() -> bool {
        portable_atomic::AtomicUsize::is_lock_free()
    }
}

impl SizeCounter for PortableCounter {
    const BACKEND: Backend = Backend::Portable;

    #[inline]
    fn new(value: usize) -> Self {
        Self::new(value)
    }

    #[inline]
    fn with_mut<R>(&mut self, f: impl FnOnce(&mut usize) -> R) -> R {
        f(self.0.get_mut())
    }

    #[inline]
    fn into_inner(self) -> usize {
        self.0.into_inner()
    }

    #[inline]
    fn load(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    #[inline]
    fn store(&self, value: usize) {
        self.0.store(value, Ordering::SeqCst);
    }

    #[inline]
    fn fetch_add(&self, delta: usize) -> usize {
        self.0.fetch_add(delta, Ordering::SeqCst)
    }

    #[inline]
    fn fetch_sub(&self, delta: usize) -> usize {
        self.0.fetch_sub(delta, Ordering::SeqCst)
    }

    fn checked_fetch_add(&self, delta: usize) -> Result<usize, CounterError> {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(delta))
            .map_err(|current| CounterError::overflow(current, delta))
    }

    fn checked_fetch_sub(&self, delta: usize) -> Result<usize, CounterError> {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(delta))
            .map_err(|current| CounterError::underflow(current, delta))
    }
}

super::impl_counter_common!(PortableCounter);
