//! Growable character accumulator used while scanning.
//!
//! Offsets handed to [`ScanBuffer::extract`] and [`ScanBuffer::reset`] are
//! always values previously returned by [`ScanBuffer::len`], so they fall on
//! character boundaries.

use crate::config::{DEFAULT_BUFFER_CAPACITY, DEFAULT_GROWTH_FACTOR};
use crate::sink::Sink;

/// Append-only character buffer with substring extraction, truncation and
/// flush-as-text.
#[derive(Debug, Clone)]
pub struct ScanBuffer {
    text: String,
    growth_factor: usize,
}

impl Default for ScanBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, DEFAULT_GROWTH_FACTOR)
    }
}

impl ScanBuffer {
    /// Create an empty buffer with the default capacity and growth factor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that grows by `growth_factor` whenever it fills up.
    #[must_use]
    pub fn with_capacity(capacity: usize, growth_factor: usize) -> Self {
        Self {
            text: String::with_capacity(capacity.max(1)),
            growth_factor: growth_factor.max(2),
        }
    }

    /// Append one character.
    #[inline]
    pub fn add(&mut self, c: char) {
        self.grow_for(c.len_utf8());
        self.text.push(c);
    }

    /// Append a run of characters.
    pub fn push_str(&mut self, s: &str) {
        self.grow_for(s.len());
        self.text.push_str(s);
    }

    /// Current logical length. Usable as an offset for `extract` and `reset`.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Allocated capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    /// Everything currently buffered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Copy out the content from `offset` to the end without consuming it.
    #[must_use]
    pub fn extract(&self, offset: usize) -> String {
        self.text.get(offset..).unwrap_or_default().to_owned()
    }

    /// Truncate back to `offset`, discarding a scanned-but-rejected suffix.
    pub fn reset(&mut self, offset: usize) {
        self.text.truncate(offset);
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Deliver the content to `sink` as one text run, then clear.
    ///
    /// Does nothing when the buffer is empty, so a sink never sees an empty run.
    pub fn flush(&mut self, sink: &mut dyn Sink) {
        if !self.text.is_empty() {
            sink.flush(&self.text);
            self.text.clear();
        }
    }

    fn grow_for(&mut self, additional: usize) {
        let needed = self.text.len() + additional;
        let capacity = self.text.capacity();
        if needed <= capacity {
            return;
        }
        let mut target = capacity.max(1);
        while target < needed {
            target = target.saturating_mul(self.growth_factor);
        }
        self.text.reserve_exact(target - self.text.len());
    }
}
