use super::{Backend, CounterError, SizeCounter};
use crate::sync::atomic::{self, AtomicUsize, Ordering};
use crate::sync::hint;

/// Counter whose read-modify-write operations are built only from
/// compare-and-swap.
///
/// This is the interlocked-exchange-add shape: read the word, compute the
/// new value, publish it with `compare_exchange_weak`, retry on contention.
/// It never takes a lock, so some thread always makes progress. Use it on
/// targets that have pointer-width CAS but no dedicated fetch-add.
pub struct InterlockedCounter {
    value: AtomicUsize,
}

impl InterlockedCounter {
    #[cfg(not(loom))]
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self {
            value: AtomicUsize::new(value),
        }
    }

    #[cfg(loom)]
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self {
            value: AtomicUsize::new(value),
        }
    }

    /// Apply `op` to the current value until a CAS publishes its result.
    ///
    /// Returns `Ok(previous)` once published, or `Err(current)` as soon as
    /// `op` declines, without touching the counter.
    #[inline]
    fn update(&self, mut op: impl FnMut(usize) -> Option<usize>) -> Result<usize, usize> {
        let mut current = self.value.load(Ordering::SeqCst);
        loop {
            let Some(next) = op(current) else {
                return Err(current);
            };
            match self
                .value
                .compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(previous) => return Ok(previous),
                Err(actual) => {
                    current = actual;
                    hint::spin_loop();
                }
            }
        }
    }
}

impl SizeCounter for InterlockedCounter {
    const BACKEND: Backend = Backend::Interlocked;

    #[inline]
    fn new(value: usize) -> Self {
        Self::new(value)
    }

    #[inline]
    fn with_mut<R>(&mut self, f: impl FnOnce(&mut usize) -> R) -> R {
        atomic::with_mut(&mut self.value, f)
    }

    #[inline]
    fn into_inner(mut self) -> usize {
        self.with_mut(|v| *v)
    }

    #[inline]
    fn load(&self) -> usize {
        self.value.load(Ordering::SeqCst)
    }

    #[inline]
    fn store(&self, value: usize) {
        self.value.store(value, Ordering::SeqCst);
    }

    fn fetch_add(&self, delta: usize) -> usize {
        match self.update(|v| Some(v.wrapping_add(delta))) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    fn fetch_sub(&self, delta: usize) -> usize {
        match self.update(|v| Some(v.wrapping_sub(delta))) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    fn checked_fetch_add(&self, delta: usize) -> Result<usize, CounterError> {
        self.update(|v| v.checked_add(delta))
            .map_err(|current| CounterError::overflow(current, delta))
    }

    fn checked_fetch_sub(&self, delta: usize) -> Result<usize, CounterError> {
        self.update(|v| v.checked_sub(delta))
            .map_err(|current| CounterError::underflow(current, delta))
    }
}

super::impl_counter_common!(InterlockedCounter);

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn test_update_declined_leaves_value() {
        let c = InterlockedCounter::new(8);
        assert_eq!(c.update(|_| None), Err(8));
        assert_eq!(c.load(), 8);
    }

    #[test]
    fn test_update_returns_previous() {
        let c = InterlockedCounter::new(8);
        assert_eq!(c.update(|v| Some(v * 3)), Ok(8));
        assert_eq!(c.load(), 24);
    }

    #[test]
    fn test_wrapping_through_cas() {
        let c = InterlockedCounter::new(usize::MAX - 1);
        assert_eq!(c.fetch_add(3), usize::MAX - 1);
        assert_eq!(c.load(), 1);
        assert_eq!(c.fetch_sub(2), 1);
        assert_eq!(c.load(), usize::MAX);
    }

    #[test]
    fn test_debug_prints_value() {
        let c = InterlockedCounter::new(0);
        assert_eq!(format!("{c:?}"), "InterlockedCounter(0)");
    }
}
