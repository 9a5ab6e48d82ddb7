use std::sync::{Arc, PoisonError, RwLock};

use crate::{
	Result,
	graph::CatalogGraph,
	hierarchy::ParentMap,
	index::{CatalogIndexer, SearchIndex},
	scoring::SpecificityScorer,
};

/// One published catalog version. Never mutated after publication.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
	pub version: u64,
	pub index: SearchIndex,
	pub parents: ParentMap,
}

/// Swappable pointer to the current [`CatalogSnapshot`].
///
/// Readers hold an `Arc` for as long as a query runs, so a publish never blocks them and never
/// changes what an in-flight query sees.
#[derive(Debug, Default)]
pub struct CatalogHandle {
	current: RwLock<Arc<CatalogSnapshot>>,
}
impl CatalogHandle {
	pub fn new(index: SearchIndex, parents: ParentMap) -> Self {
		Self { current: RwLock::new(Arc::new(CatalogSnapshot { version: 1, index, parents })) }
	}

	/// A handle serving an empty catalog at version 0.
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn current(&self) -> Arc<CatalogSnapshot> {
		self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	pub fn version(&self) -> u64 {
		self.current().version
	}

	/// Swaps in a new snapshot and returns its version.
	pub fn publish(&self, index: SearchIndex, parents: ParentMap) -> u64 {
		let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
		let version = guard.version + 1;

		*guard = Arc::new(CatalogSnapshot { version, index, parents });

		drop(guard);

		tracing::info!(version, "Catalog snapshot published.");

		version
	}

	/// Builds from `graph` and publishes on success. On failure the current snapshot stays.
	pub fn rebuild<S>(&self, indexer: &CatalogIndexer<S>, graph: &CatalogGraph) -> Result<u64>
	where
		S: SpecificityScorer,
	{
		let (index, parents) = indexer.build(graph).inspect_err(|err| {
			tracing::error!(error = %err, "Catalog rebuild failed. Keeping the current snapshot.");
		})?;

		Ok(self.publish(index, parents))
	}
}
