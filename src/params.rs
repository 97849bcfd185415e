//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::bitset::WORD_BITS;
use crate::utils::Parallelism;

/// Largest raw category accepted by default.
///
/// Upstream formats index categories with signed 32-bit integers.
pub const DEFAULT_MAX_CATEGORY: u32 = i32::MAX as u32;

/// Node ids at or above this are rejected by default.
///
/// Node sets live in an arena indexed by node id, so the cap bounds its size.
pub const DEFAULT_MAX_NODES: usize = 1 << 24;

/// Parameters controlling how a [`CategoryRegistry`](crate::CategoryRegistry)
/// is built.
///
/// # Example
///
/// ```
/// use catset::RegistryParams;
///
/// let params = RegistryParams::default()
///     .with_max_category(1023)
///     .with_n_threads(1);
/// assert_eq!(params.max_words(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryParams {
    /// Largest raw category value accepted when building sets.
    pub max_category: u32,
    /// Number of addressable node ids; valid ids are `0..max_nodes`.
    pub max_nodes: usize,
    /// Threads used by bulk node construction.
    /// 0 = auto, 1 = sequential, n = exactly n.
    pub n_threads: usize,
}

impl Default for RegistryParams {
    fn default() -> Self {
        Self {
            max_category: DEFAULT_MAX_CATEGORY,
            max_nodes: DEFAULT_MAX_NODES,
            n_threads: 0,
        }
    }
}

impl RegistryParams {
    pub fn with_max_category(mut self, max_category: u32) -> Self {
        self.max_category = max_category;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    /// Number of words needed to address every category up to `max_category`.
    ///
    /// Binned masks longer than this are rejected, as are set bits above
    /// `max_category` in the last word.
    #[inline]
    pub fn max_words(&self) -> usize {
        (self.max_category / WORD_BITS) as usize + 1
    }

    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        Parallelism::from_threads(self.n_threads)
    }
}
