//! Sequentially-consistent `usize` counters.
//!
//! Every backend implements [`SizeCounter`] with `SeqCst` ordering on all
//! operations and wrapping arithmetic on `fetch_add`/`fetch_sub`. Backends
//! differ only in how the read-modify-write is carried out:
//!
//! - [`NativeCounter`]: the target's native atomic add/sub instructions.
//! - [`InterlockedCounter`]: a lock-free compare-and-swap retry loop. Works on
//!   any target with pointer-width CAS, even one without a dedicated
//!   fetch-add instruction.
//! - [`PortableCounter`]: `portable_atomic::AtomicUsize`, for targets where
//!   `core` has no pointer-width atomics at all.
//!
//! [`AtomicSize`] names the backend picked at build time. The choice is never
//! made at runtime.

use std::fmt;

pub(crate) mod error;
#[cfg(target_has_atomic = "ptr")]
pub(crate) mod interlocked;
#[cfg(target_has_atomic = "ptr")]
pub(crate) mod native;
#[cfg(not(loom))]
pub(crate) mod portable;


pub use error::CounterError;
#[cfg(target_has_atomic = "ptr")]
pub use interlocked::InterlockedCounter;
#[cfg(target_has_atomic = "ptr")]
pub use native::NativeCounter;
#[cfg(not(loom))]
pub use portable::PortableCounter;

/// Implementation strategy behind a counter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Native,
    Interlocked,
    Portable,
}

impl Backend {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Native => "native",
            Backend::Interlocked => "interlocked",
            Backend::Portable => "portable",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A machine-word unsigned counter with atomic, sequentially-consistent
/// operations.
///
/// `fetch_add` and `fetch_sub` wrap modulo `usize::MAX + 1` and return the
/// value held immediately before their effect. All operations on one
/// instance form a single total order observed identically by every thread.
///
/// Construction requires a value and re-initialization requires `&mut self`,
/// so a counter can never be used uninitialized or re-initialized while
/// shared.
pub trait SizeCounter: Sized + Send + Sync {
    /// Strategy this type is built on.
    const BACKEND: Backend;

    /// Create a counter holding `value`.
    fn new(value: usize) -> Self;

    /// Reset a counter the caller owns exclusively.
    fn init(&mut self, value: usize) {
        #[cfg(feature = "tracing")]
        tracing::trace!(value, backend = %Self::BACKEND, "counter initialized");
        self.with_mut(|v| *v = value);
    }

    /// Run `f` on the stored word without synchronization. Exclusive access
    /// is guaranteed by `&mut self`.
    fn with_mut<R>(&mut self, f: impl FnOnce(&mut usize) -> R) -> R;

    fn into_inner(self) -> usize;

    fn load(&self) -> usize;

    fn store(&self, value: usize);

    /// Add `delta` (wrapping), returning the previous value.
    fn fetch_add(&self, delta: usize) -> usize;

    /// Subtract `delta` (wrapping), returning the previous value.
    fn fetch_sub(&self, delta: usize) -> usize;

    /// Add `delta` unless the result would exceed `usize::MAX`.
    ///
    /// # Errors
    /// [`CounterError::Overflow`] if the addition would wrap. The counter is
    /// not modified.
    fn checked_fetch_add(&self, delta: usize) -> Result<usize, CounterError>;

    /// Subtract `delta` unless the result would go below zero.
    ///
    /// # Errors
    /// [`CounterError::Underflow`] if the subtraction would wrap. The counter
    /// is not modified.
    fn checked_fetch_sub(&self, delta: usize) -> Result<usize, CounterError>;

    #[inline]
    fn increment(&self) -> usize {
        self.fetch_add(1)
    }

    #[inline]
    fn decrement(&self) -> usize {
        self.fetch_sub(1)
    }
}

/// Implements the std traits every backend shares in terms of [`SizeCounter`].
macro_rules! impl_counter_common {
    ($counter:ty) => {
        impl Default for $counter {
            fn default() -> Self {
                <$counter as $crate::counter::SizeCounter>::new(0)
            }
        }

        impl From<usize> for $counter {
            fn from(value: usize) -> Self {
                <$counter as $crate::counter::SizeCounter>::new(value)
            }
        }

        impl ::std::fmt::Debug for $counter {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($counter))
                    .field(&<$counter as $crate::counter::SizeCounter>::load(self))
                    .finish()
            }
        }
    };
}
pub(crate) use impl_counter_common;

// ---------------------------------------------------------------------------
// Build-time backend selection
// ---------------------------------------------------------------------------

/// Counter type selected by the enabled Cargo features and the target.
#[cfg(all(feature = "portable", not(loom)))]
pub type AtomicSize = PortableCounter;

/// Counter type selected by the enabled Cargo features and the target.
#[cfg(all(
    feature = "interlocked",
    target_has_atomic = "ptr",
    any(not(feature = "portable"), loom)
))]
pub type AtomicSize = InterlockedCounter;

/// Counter type selected by the enabled Cargo features and the target.
#[cfg(all(
    not(feature = "interlocked"),
    target_has_atomic = "ptr",
    any(not(feature = "portable"), loom)
))]
pub type AtomicSize = NativeCounter;

/// Counter type selected by the enabled Cargo features and the target.
#[cfg(all(not(target_has_atomic = "ptr"), not(feature = "portable"), not(loom)))]
pub type AtomicSize = PortableCounter;

/// Backend behind [`AtomicSize`] in this build.
pub const SELECTED_BACKEND: Backend = <AtomicSize as SizeCounter>::BACKEND;

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(Backend::Native.to_string(), "native");
        assert_eq!(Backend::Interlocked.to_string(), "interlocked");
        assert_eq!(Backend::Portable.to_string(), "portable");
    }

    #[test]
    fn test_selected_backend_matches_features() {
        let expected = if cfg!(feature = "portable") || !cfg!(target_has_atomic = "ptr") {
            Backend::Portable
        } else if cfg!(feature = "interlocked") {
            Backend::Interlocked
        } else {
            Backend::Native
        };
        assert_eq!(SELECTED_BACKEND, expected);
    }

    #[test]
    fn test_atomic_size_usage() {
        let mut c = AtomicSize::default();
        assert_eq!(c.increment(), 0);
        assert_eq!(c.increment(), 1);
        assert_eq!(c.decrement(), 2);
        c.init(40);
        assert_eq!(c.fetch_add(2), 40);
        assert_eq!(c.into_inner(), 42);
    }
}

#[cfg(all(test, not(loom), feature = "tracing"))]
mod tracing_tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.text()
    }

    #[test]
    fn test_init_emits_trace_event() {
        let logs = capture(|| {
            let mut c = NativeCounter::new(1);
            c.init(5);
        });
        assert!(logs.contains("TRACE"), "{logs}");
        assert!(logs.contains("counter initialized"), "{logs}");
        assert!(logs.contains("value=5"), "{logs}");
        assert!(logs.contains("backend=native"), "{logs}");
    }

    #[test]
    fn test_refused_checked_ops_emit_debug_events() {
        let logs = capture(|| {
            let c = InterlockedCounter::new(usize::MAX);
            assert!(c.checked_fetch_add(2).is_err());
            c.store(1);
            assert!(c.checked_fetch_sub(4).is_err());
        });
        assert!(logs.contains("checked add refused to wrap"), "{logs}");
        assert!(logs.contains(&format!("current={}", usize::MAX)), "{logs}");
        assert!(logs.contains("delta=2"), "{logs}");
        assert!(logs.contains("checked sub refused to wrap"), "{logs}");
        assert!(logs.contains("delta=4"), "{logs}");
        assert!(logs.contains("DEBUG"), "{logs}");
    }

    #[test]
    fn test_successful_ops_do_not_log() {
        let logs = capture(|| {
            let c = PortableCounter::new(0);
            c.fetch_add(3);
            assert_eq!(c.checked_fetch_sub(3), Ok(3));
        });
        assert!(logs.is_empty(), "{logs}");
    }
}
