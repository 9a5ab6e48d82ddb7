//! Variable catalog hierarchy and prefix search.
//!
//! [`CatalogIndexer`] walks a [`CatalogGraph`] once and produces a frozen [`SearchIndex`] and
//! [`ParentMap`]. Queries run against a published [`CatalogSnapshot`] without locking beyond an
//! `Arc` clone.

mod error;

pub mod graph;
pub mod hierarchy;
pub mod index;
pub mod scoring;
pub mod search;
pub mod snapshot;
pub mod text;
pub mod trie;

pub use error::{Error, Result};
pub use graph::{CatalogGraph, CatalogNode, GroupNode, NodeKind, VariableNode};
pub use hierarchy::ParentMap;
pub use index::{CatalogIndexer, RankingInfo, SearchIndex, build};
pub use scoring::{DeclaredSpecificity, IdSegmentSpecificity, SpecificityScorer};
pub use search::{EntityInfo, SearchQueryEngine, SearchResults, search};
pub use snapshot::{CatalogHandle, CatalogSnapshot};
