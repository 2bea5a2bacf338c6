//! Tokenizer configuration.

/// Default size of the character refill window.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;
/// Default initial capacity of the accumulation buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;
/// Default geometric growth factor of the accumulation buffers.
pub const DEFAULT_GROWTH_FACTOR: usize = 4;

/// Tuning knobs and feature flags for a [`Tokenizer`](crate::Tokenizer).
///
/// Sizes are clamped to at least 1 and the growth factor to at least 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Keep a verbatim copy of every consumed character.
    pub cache_source: bool,
    /// Number of characters pulled from the underlying reader per refill.
    pub read_buffer_size: usize,
    /// Initial capacity of the scan buffer.
    pub buffer_capacity: usize,
    /// Multiplier applied to the scan buffer capacity when it is full.
    pub growth_factor: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            cache_source: false,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl TokenizerConfig {
    /// Enable or disable the document source cache.
    #[must_use]
    pub const fn with_cache_source(mut self, cache_source: bool) -> Self {
        self.cache_source = cache_source;
        self
    }

    /// Set the refill window size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = if size == 0 { 1 } else { size };
        self
    }

    /// Set the initial scan buffer capacity.
    #[must_use]
    pub const fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Set the scan buffer growth factor.
    #[must_use]
    pub const fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = if factor < 2 { 2 } else { factor };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TokenizerConfig::default();
        assert!(!config.cache_source);
        assert_eq!(config.read_buffer_size, 8192);
        assert_eq!(config.buffer_capacity, 8192);
        assert_eq!(config.growth_factor, 4);
    }

    #[test]
    fn setters_clamp_degenerate_values() {
        let config = TokenizerConfig::default()
            .with_read_buffer_size(0)
            .with_buffer_capacity(0)
            .with_growth_factor(1);
        assert_eq!(config.read_buffer_size, 1);
        assert_eq!(config.buffer_capacity, 1);
        assert_eq!(config.growth_factor, 2);
    }
}
