use thiserror::Error;

/// Returned by the checked operations when the result would wrap.
///
/// The counter is left unchanged in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CounterError {
    #[error("counter overflow: {current} + {delta} exceeds usize::MAX")]
    Overflow { current: usize, delta: usize },
    #[error("counter underflow: {current} - {delta} is below zero")]
    Underflow { current: usize, delta: usize },
}

impl CounterError {
    /// Value the counter held when the operation was refused.
    #[must_use]
    pub fn current(&self) -> usize {
        match *self {
            CounterError::Overflow { current, .. } | CounterError::Underflow { current, .. } => current,
        }
    }

    pub(crate) fn overflow(current: usize, delta: usize) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(current, delta, "checked add refused to wrap");
        CounterError::Overflow { current, delta }
    }

    pub(crate) fn underflow(current: usize, delta: usize) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(current, delta, "checked sub refused to wrap");
        CounterError::Underflow { current, delta }
    }
}
