//! Per-feature category catalogues and per-node categorical split sets.
//!
//! A [`CategoryRegistry`] is built once while a model is loaded and then only
//! read during prediction:
//!
//! - **Feature catalogue**: for each categorical feature, every raw category
//!   seen among its bin thresholds. Lets the caller detect categories that
//!   never occurred in training.
//! - **Node sets**: for each categorical split node, the categories routed
//!   LEFT, stored twice: once over raw category values and once over binned
//!   codes (the packed mask handed over by training).
//!
//! Both mappings are arenas indexed directly by the dense, 0-based feature
//! and node ids. Unknown ids behave like empty sets.
//!
//! # Example
//!
//! ```
//! use catset::{CategoryRegistry, FeatureKind, NodeSplit};
//!
//! let thresholds = [5u32, 17, 42];
//! let mut registry =
//!     CategoryRegistry::from_features(&[FeatureKind::Categorical(&thresholds[..])]).unwrap();
//!
//! registry
//!     .insert_node(NodeSplit { node: 3, category_bins: &[2u32, 9, 40], binned_mask: &[0b101] })
//!     .unwrap();
//!
//! assert!(registry.is_known_category(0, 17));
//! assert!(registry.binned_category_in_bitset(3, 2));
//! assert!(registry.raw_category_in_bitset(3, 40));
//! assert!(!registry.raw_category_in_bitset(3, 9));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, warn};

use crate::bitset::{Bitset, Word};
use crate::category::CategoryValue;
use crate::error::CategoryError;
use crate::params::RegistryParams;
use crate::utils::run_with_threads;

// =============================================================================
// Inputs
// =============================================================================

/// How a feature is split on, with its category thresholds if categorical.
#[derive(Debug, Clone, Copy)]
pub enum FeatureKind<'a, T> {
    Numeric,
    /// Raw category values used as bin thresholds for this feature.
    Categorical(&'a [T]),
}

impl<'a, T> FeatureKind<'a, T> {
    /// Build from a categorical flag and the feature's thresholds.
    ///
    /// Thresholds of non-categorical features are ignored.
    pub fn from_flag(is_categorical: bool, categories: &'a [T]) -> Self {
        if is_categorical {
            FeatureKind::Categorical(categories)
        } else {
            FeatureKind::Numeric
        }
    }
}

/// A trained categorical split, as produced by tree construction.
#[derive(Debug, Clone, Copy)]
pub struct NodeSplit<'a, T> {
    /// Dense 0-based node id.
    pub node: usize,
    /// Bin position -> raw category value. Its length is the split cardinality.
    pub category_bins: &'a [T],
    /// Packed mask over bin positions; a set bit routes that bin left.
    pub binned_mask: &'a [Word],
}

// =============================================================================
// NodeCategories
// =============================================================================

/// The categories routed left at one node, by raw value and by binned code.
///
/// Every raw value in [`raw`](Self::raw) is `category_bins[k]` for some set
/// bit `k < cardinality` of [`binned`](Self::binned).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCategories {
    raw: Bitset,
    binned: Bitset,
}

impl NodeCategories {
    /// Build both sets for one split.
    ///
    /// The binned mask is adopted verbatim. Set bits at or beyond the split
    /// cardinality stay in the binned set but have no raw counterpart. Node ids
    /// at or above `params.max_nodes` and set bits above `params.max_category`
    /// are rejected.
    pub fn build<T: CategoryValue>(
        split: &NodeSplit<'_, T>,
        params: &RegistryParams,
    ) -> Result<Self, CategoryError> {
        if split.node >= params.max_nodes {
            return Err(CategoryError::NodeIdOutOfRange {
                node: split.node,
                max_nodes: params.max_nodes,
            });
        }

        let max_words = params.max_words();
        if split.binned_mask.len() > max_words {
            return Err(CategoryError::BinnedMaskTooLarge {
                node: split.node,
                n_words: split.binned_mask.len(),
                max_words,
            });
        }

        let binned = Bitset::from_words(split.binned_mask.to_vec());
        if let Some(code) = binned.last().filter(|&code| code > params.max_category) {
            return Err(CategoryError::BinnedCodeOutOfRange {
                node: split.node,
                code,
                max: params.max_category,
            });
        }

        let cardinality = split.category_bins.len();

        let mut raw = Bitset::new();
        for position in binned.iter().map(|p| p as usize).take_while(|&p| p < cardinality) {
            let value = split.category_bins[position];
            let category = value.to_category(params.max_category).map_err(|reason| {
                CategoryError::InvalidNodeCategory {
                    node: split.node,
                    position,
                    value: value.to_string(),
                    reason,
                }
            })?;
            raw.insert(category);
        }

        Ok(Self { raw, binned })
    }

    /// Raw category values routed left.
    #[inline]
    pub fn raw(&self) -> &Bitset {
        &self.raw
    }

    /// Binned codes routed left.
    #[inline]
    pub fn binned(&self) -> &Bitset {
        &self.binned
    }
}

// =============================================================================
// CategoryRegistry
// =============================================================================

/// Category catalogues and split sets for one model.
///
/// Building takes `&mut self`; once built, every query takes `&self`, so a
/// shared reference can be handed to any number of prediction threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    params: RegistryParams,
    /// Indexed by feature id. `None` for numeric features.
    features: Vec<Option<Bitset>>,
    /// Indexed by node id. `None` for nodes without a categorical split.
    nodes: Vec<Option<NodeCategories>>,
}

impl CategoryRegistry {
    /// Build the feature catalogue from every feature of the model.
    ///
    /// Each categorical feature gets a set holding all of its thresholds.
    /// Numeric features get no entry.
    pub fn new<T: CategoryValue>(
        features: &[FeatureKind<'_, T>],
        params: RegistryParams,
    ) -> Result<Self, CategoryError> {
        let _span = debug_span!("CategoryRegistry::new", n_features = features.len()).entered();

        let features = features
            .iter()
            .enumerate()
            .map(|(feature, kind)| match *kind {
                FeatureKind::Numeric => Ok(None),
                FeatureKind::Categorical(categories) => {
                    build_catalogue(feature, categories, &params).map(Some)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            n_categorical = features.iter().filter(|f| f.is_some()).count(),
            "built feature category catalogue"
        );

        Ok(Self {
            params,
            features,
            nodes: Vec::new(),
        })
    }

    /// [`new`](Self::new) with default parameters.
    pub fn from_features<T: CategoryValue>(
        features: &[FeatureKind<'_, T>],
    ) -> Result<Self, CategoryError> {
        Self::new(features, RegistryParams::default())
    }

    /// Build and store the split sets of one categorical node.
    ///
    /// Inserting a node id again replaces its previous sets.
    pub fn insert_node<T: CategoryValue>(
        &mut self,
        split: NodeSplit<'_, T>,
    ) -> Result<(), CategoryError> {
        let categories = NodeCategories::build(&split, &self.params)?;
        self.place(split.node, categories);
        Ok(())
    }

    /// Build and store the split sets of many nodes.
    ///
    /// Nodes are built in parallel according to `params.n_threads`. Either all
    /// nodes are stored or, on the first invalid split, none are.
    pub fn insert_nodes<T: CategoryValue>(
        &mut self,
        splits: &[NodeSplit<'_, T>],
    ) -> Result<(), CategoryError> {
        let _span =
            debug_span!("CategoryRegistry::insert_nodes", n_splits = splits.len()).entered();

        let params = self.params;
        let built = run_with_threads(params.n_threads, |parallelism| {
            parallelism.maybe_par_map(splits, |split| NodeCategories::build(split, &params))
        })
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        for (split, categories) in splits.iter().zip(built) {
            self.place(split.node, categories);
        }
        debug!(n_nodes = self.nodes.len(), "inserted categorical split nodes");
        Ok(())
    }

    /// Check a registry that did not come out of the builders, such as one
    /// deserialized from disk, against its own params.
    ///
    /// Rejects node arenas longer than `max_nodes`, binned masks longer than
    /// `max_words()`, and any feature, raw or binned set holding a value above
    /// `max_category`.
    pub fn validate(&self) -> Result<(), CategoryError> {
        let max = self.params.max_category;
        let max_words = self.params.max_words();

        for (feature, known) in self.features.iter().enumerate() {
            let Some(known) = known else { continue };
            if let Some(value) = known.last().filter(|&v| v > max) {
                return Err(CategoryError::FeatureCategoryOutOfRange {
                    feature,
                    value,
                    max,
                });
            }
        }

        if self.nodes.len() > self.params.max_nodes {
            return Err(CategoryError::NodeIdOutOfRange {
                node: self.nodes.len() - 1,
                max_nodes: self.params.max_nodes,
            });
        }

        for (node, cats) in self.nodes.iter().enumerate() {
            let Some(cats) = cats else { continue };
            if cats.binned.n_words() > max_words {
                return Err(CategoryError::BinnedMaskTooLarge {
                    node,
                    n_words: cats.binned.n_words(),
                    max_words,
                });
            }
            if let Some(code) = cats.binned.last().filter(|&c| c > max) {
                return Err(CategoryError::BinnedCodeOutOfRange { node, code, max });
            }
            if let Some(value) = cats.raw.last().filter(|&v| v > max) {
                return Err(CategoryError::NodeCategoryOutOfRange { node, value, max });
            }
        }
        Ok(())
    }

    /// `node` must be below `params.max_nodes`.
    fn place(&mut self, node: usize, categories: NodeCategories) {
        if node >= self.nodes.len() {
            self.nodes.resize_with(node + 1, || None);
        }
        trace!(
            node,
            n_raw = categories.raw.count(),
            n_binned = categories.binned.count(),
            "stored categorical split"
        );
        if self.nodes[node].replace(categories).is_some() {
            warn!(node, "replaced existing categorical split sets");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `value` was seen for `feature` during training.
    ///
    /// False for unseen categories, numeric features and unknown feature ids.
    #[inline]
    pub fn is_known_category(&self, feature: usize, value: u32) -> bool {
        match self.features.get(feature) {
            Some(Some(known)) => known.contains(value),
            _ => false,
        }
    }

    /// Whether the raw category `value` is routed left at `node`.
    #[inline]
    pub fn raw_category_in_bitset(&self, node: usize, value: u32) -> bool {
        self.node(node).is_some_and(|cats| cats.raw.contains(value))
    }

    /// Whether the binned code `code` is routed left at `node`.
    #[inline]
    pub fn binned_category_in_bitset(&self, node: usize, code: u32) -> bool {
        self.node(node).is_some_and(|cats| cats.binned.contains(code))
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    #[inline]
    pub fn params(&self) -> &RegistryParams {
        &self.params
    }

    /// Number of features the catalogue was built from.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Length of the node arena (largest inserted node id + 1).
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes holding categorical split sets.
    pub fn n_categorical_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    #[inline]
    pub fn is_categorical(&self, feature: usize) -> bool {
        matches!(self.features.get(feature), Some(Some(_)))
    }

    /// Catalogue of a categorical feature.
    #[inline]
    pub fn feature_categories(&self, feature: usize) -> Option<&Bitset> {
        self.features.get(feature)?.as_ref()
    }

    /// Split sets of a categorical node.
    #[inline]
    pub fn node(&self, node: usize) -> Option<&NodeCategories> {
        self.nodes.get(node)?.as_ref()
    }
}

fn build_catalogue<T: CategoryValue>(
    feature: usize,
    categories: &[T],
    params: &RegistryParams,
) -> Result<Bitset, CategoryError> {
    let mut known = Bitset::new();
    for (position, &value) in categories.iter().enumerate() {
        let category = value.to_category(params.max_category).map_err(|reason| {
            CategoryError::InvalidFeatureCategory {
                feature,
                position,
                value: value.to_string(),
                reason,
            }
        })?;
        known.insert(category);
    }
    trace!(feature, n_categories = known.count(), "built feature catalogue");
    Ok(known)
}

// =============================================================================
// Tests
// =============================================================================
