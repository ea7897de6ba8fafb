// Unified synchronization primitive shim.
//
// Under `cfg(loom)`, re-exports from the `loom` crate so the model checker
// sees every atomic access. Otherwise, re-exports from `std`.
//
// **Every** backend must import its atomic word through this module. A
// single direct `use std::sync::atomic::*` would bypass loom's scheduler and
// silently break exhaustive testing. `portable_atomic` is the one exception:
// loom cannot track it, so `PortableCounter` is compiled out under loom.
#![allow(unused_imports, unused_macros)]

// ---------------------------------------------------------------------------
// atomic
// ---------------------------------------------------------------------------
pub(crate) mod atomic {
    #[cfg(loom)]
    pub(crate) use loom::sync::atomic::{AtomicUsize, Ordering};

    #[cfg(all(not(loom), target_has_atomic = "ptr"))]
    pub(crate) use std::sync::atomic::AtomicUsize;

    #[cfg(not(loom))]
    pub(crate) use std::sync::atomic::Ordering;

    /// Exclusive, unsynchronized access to the word behind an `AtomicUsize`.
    ///
    /// Under std: `f(atomic.get_mut())`
    /// Under loom: `atomic.with_mut(f)`
    #[cfg(all(not(loom), target_has_atomic = "ptr"))]
    #[inline]
    pub(crate) fn with_mut<R>(atomic: &mut AtomicUsize, f: impl FnOnce(&mut usize) -> R) -> R {
        f(atomic.get_mut())
    }

    #[cfg(loom)]
    #[inline]
    pub(crate) fn with_mut<R>(atomic: &mut AtomicUsize, f: impl FnOnce(&mut usize) -> R) -> R {
        atomic.with_mut(f)
    }
}

// ---------------------------------------------------------------------------
// sync (Arc)
// ---------------------------------------------------------------------------
#[cfg(loom)]
pub(crate) use loom::sync::Arc;

#[cfg(not(loom))]
pub(crate) use std::sync::Arc;

// ---------------------------------------------------------------------------
// hint
// ---------------------------------------------------------------------------
pub(crate) mod hint {
    #[cfg(loom)]
    pub(crate) use loom::hint::spin_loop;

    #[cfg(not(loom))]
    pub(crate) use std::hint::spin_loop;
}

// ---------------------------------------------------------------------------
// thread
// ---------------------------------------------------------------------------
pub(crate) mod thread {
    #[cfg(loom)]
    pub(crate) use loom::thread::spawn;

    #[cfg(not(loom))]
    pub(crate) use std::thread::spawn;
}

// ---------------------------------------------------------------------------
// Barrier — std only. loom has no Barrier and the barrier-synced stress
// tests are compiled out under loom.
// ---------------------------------------------------------------------------
#[cfg(not(loom))]
pub(crate) mod barrier {
    pub(crate) use std::sync::Barrier;
}

// ---------------------------------------------------------------------------
// Static initialisation helpers
//
// loom atomics are not const-constructible. This macro creates statics that
// work under both loom and std.
// ---------------------------------------------------------------------------

/// Declare a `static` counter. Under std, uses `const` init. Under loom,
/// uses `loom::lazy_static!` so the value is re-created for each model run.
///
/// Usage: `static_atomic! { [pub] static NAME: Type = init_expr; }`
#[allow(unused_macro_rules)]
macro_rules! static_atomic {
    (pub static $NAME:ident : $Ty:ty = $init:expr ;) => {
        #[cfg(not(loom))]
        pub static $NAME: $Ty = $init;

        #[cfg(loom)]
        loom::lazy_static! {
            pub static ref $NAME: $Ty = $init;
        }
    };
    (static $NAME:ident : $Ty:ty = $init:expr ;) => {
        #[cfg(not(loom))]
        static $NAME: $Ty = $init;

        #[cfg(loom)]
        loom::lazy_static! {
            static ref $NAME: $Ty = $init;
        }
    };
}
pub(crate) use static_atomic;
