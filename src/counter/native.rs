use super::{Backend, CounterError, SizeCounter};
use crate::sync::atomic::{self, AtomicUsize, Ordering};

/// Counter backed by the target's native pointer-width atomic.
///
/// `fetch_add`/`fetch_sub` compile to single RMW instructions (`lock xadd`,
/// `ldaddal`, ...). Checked operations use `fetch_update`.
pub struct NativeCounter(AtomicUsize);

impl NativeCounter {
    #[cfg(not(loom))]
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(AtomicUsize::new(value))
    }

    #[cfg(loom)]
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(AtomicUsize::new(value))
    }
}

impl SizeCounter for NativeCounter {
    const BACKEND: Backend = Backend::Native;

    #[inline]
    fn new(value: usize) -> Self {
        Self::new(value)
    }

    #[inline]
    fn with_mut<R>(&mut self, f: impl FnOnce(&mut usize) -> R) -> R {
        atomic::with_mut(&mut self.0, f)
    }

    #[inline]
    fn into_inner(mut self) -> usize {
        self.with_mut(|v| *v)
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

super::impl_counter_common!(NativeCounter);
