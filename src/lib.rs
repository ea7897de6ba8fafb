#[cfg(all(loom, not(target_has_atomic = "ptr")))]
compile_error!("loom model tests need a target with pointer-width atomics.");

pub(crate) mod sync;

// public module: backends are reachable by name for callers that pin one
pub mod counter;

// counter contract + selected backend
pub use counter::{AtomicSize, Backend, SELECTED_BACKEND, SizeCounter};

// individual backends
#[cfg(target_has_atomic = "ptr")]
pub use counter::{InterlockedCounter, NativeCounter};
#[cfg(not(loom))]
pub use counter::PortableCounter;

// errors
pub use counter::CounterError;
