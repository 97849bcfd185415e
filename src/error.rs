//! Errors raised while building categorical split sets.
//!
//! Membership queries never fail; only construction (and loading a saved
//! registry) validates its input.

use crate::category::InvalidCategory;

/// Construction-time validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    #[error("feature {feature}: category threshold {position} ({value}) is invalid: {reason}")]
    InvalidFeatureCategory {
        feature: usize,
        position: usize,
        value: String,
        reason: InvalidCategory,
    },

    #[error("node {node}: category bin {position} maps to invalid category {value}: {reason}")]
    InvalidNodeCategory {
        node: usize,
        position: usize,
        value: String,
        reason: InvalidCategory,
    },

    #[error("node {node}: binned mask has {n_words} words, at most {max_words} are addressable")]
    BinnedMaskTooLarge {
        node: usize,
        n_words: usize,
        max_words: usize,
    },

    #[error("node {node}: binned code {code} exceeds the maximum category {max}")]
    BinnedCodeOutOfRange {
        node: usize,
        code: u32,
        max: u32,
    },

    #[error("node id {node} is out of range, at most {max_nodes} nodes are addressable")]
    NodeIdOutOfRange {
        node: usize,
        max_nodes: usize,
    },

    #[error("feature {feature}: catalogue holds category {value} above the maximum {max}")]
    FeatureCategoryOutOfRange {
        feature: usize,
        value: u32,
        max: u32,
    },

    #[error("node {node}: raw set holds category {value} above the maximum {max}")]
    NodeCategoryOutOfRange {
        node: usize,
        value: u32,
        max: u32,
    },
}
