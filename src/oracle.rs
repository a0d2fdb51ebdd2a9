use crate::PaddingMode;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// A padding oracle: tells whether a two-block candidate (forged IV followed
/// by a ciphertext block) decrypts to valid padding, and nothing else.
pub trait PaddingOracle {
    /// The padding scheme the oracle validates against.
    fn padding_mode(&self) -> PaddingMode;

    fn is_padding_correct(&self, candidate: &[u8]) -> bool;
}

impl<T: PaddingOracle + ?Sized> PaddingOracle for &T {
    fn padding_mode(&self) -> PaddingMode {
        (**self).padding_mode()
    }

    fn is_padding_correct(&self, candidate: &[u8]) -> bool {
        (**self).is_padding_correct(candidate)
    }
}

impl<T: PaddingOracle + ?Sized> PaddingOracle for Arc<T> {
    fn padding_mode(&self) -> PaddingMode {
        (**self).padding_mode()
    }

    fn is_padding_correct(&self, candidate: &[u8]) -> bool {
        (**self).is_padding_correct(candidate)
    }
}

/// Wraps an oracle and counts the queries sent through it.
#[derive(Debug)]
pub struct CountingOracle<O> {
    inner: O,
    queries: AtomicUsize,
}

impl<O: PaddingOracle> CountingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.queries.store(0, Ordering::Relaxed);
    }
}

impl<O: PaddingOracle> PaddingOracle for CountingOracle<O> {
    fn padding_mode(&self) -> PaddingMode {
        self.inner.padding_mode()
    }

    fn is_padding_correct(&self, candidate: &[u8]) -> bool {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.inner.is_padding_correct(candidate)
    }
}
