//! catset: categorical split sets for gradient boosted tree inference.
//!
//! Trees that split on a categorical feature route a *set* of categories to
//! the left child. This crate stores those sets as packed `u32` bitsets and
//! answers membership in O(1):
//!
//! - [`CategoryRegistry::is_known_category`]: was this category seen for the
//!   feature during training?
//! - [`CategoryRegistry::raw_category_in_bitset`]: does this raw category go
//!   left at the node?
//! - [`CategoryRegistry::binned_category_in_bitset`]: does this binned code go
//!   left at the node?
//!
//! What to do with an unseen category (default direction, missing-value
//! branch) is left to the caller's traversal.
//!
//! # Module Structure
//!
//! - [`bitset`]: the growable packed [`Bitset`]
//! - [`category`]: validation of raw category values
//! - [`registry`]: feature catalogues and node split sets
//! - [`persist`]: JSON save/load of a built registry

pub mod bitset;
pub mod category;
pub mod error;
pub mod params;
pub mod persist;
pub mod registry;
pub mod utils;

pub use bitset::{Bitset, Word, WORD_BITS};
pub use category::{category_of, CategoryValue, InvalidCategory};
pub use error::CategoryError;
pub use params::{RegistryParams, DEFAULT_MAX_CATEGORY, DEFAULT_MAX_NODES};
pub use persist::PersistError;
pub use registry::{CategoryRegistry, FeatureKind, NodeCategories, NodeSplit};
pub use utils::{run_with_threads, Parallelism};
