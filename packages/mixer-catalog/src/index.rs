use std::collections::HashMap;

use serde::Serialize;

use crate::{
	Result,
	graph::{CatalogGraph, NodeKind},
	hierarchy::{self, ParentMap},
	scoring::{DeclaredSpecificity, SpecificityScorer},
	text,
	trie::{EntryId, Trie, TrieNode},
};

/// Ordering metadata carried for every indexed id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankingInfo {
	pub specificity: u32,
	pub display_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexEntry {
	pub id: String,
	pub kind: NodeKind,
	pub ranking: RankingInfo,
}

/// Frozen prefix index over catalog search names.
///
/// Entry ids are assigned in catalog id order, so iterating a trie id set yields catalog ids in
/// order as well.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchIndex {
	trie: Trie,
	entries: Vec<IndexEntry>,
	positions: HashMap<String, EntryId>,
}
impl SearchIndex {
	pub fn trie(&self) -> &Trie {
		&self.trie
	}

	pub fn root(&self) -> &TrieNode {
		self.trie.root()
	}

	pub fn walk(&self, token: &str) -> Option<&TrieNode> {
		self.trie.walk(token)
	}

	pub fn entry(&self, entry: EntryId) -> Option<&IndexEntry> {
		self.entries.get(usize::try_from(entry).ok()?)
	}

	pub fn entries(&self) -> &[IndexEntry] {
		&self.entries
	}

	pub fn ranking(&self, id: &str) -> Option<&RankingInfo> {
		let entry = *self.positions.get(id)?;

		self.entry(entry).map(|entry| &entry.ranking)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.positions.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn push(&mut self, id: &str, kind: NodeKind, ranking: RankingInfo) -> Option<EntryId> {
		let entry = EntryId::try_from(self.entries.len()).ok()?;

		self.entries.push(IndexEntry { id: id.to_string(), kind, ranking });
		self.positions.insert(id.to_string(), entry);

		Some(entry)
	}
}

/// One-shot builder for [`SearchIndex`] and [`ParentMap`].
#[derive(Clone, Debug)]
pub struct CatalogIndexer<S = DeclaredSpecificity> {
	scorer: S,
	include_groups: bool,
}
impl CatalogIndexer {
	pub fn new(include_groups: bool) -> Self {
		Self { scorer: DeclaredSpecificity, include_groups }
	}

	pub fn from_config(cfg: &mixer_config::Catalog) -> Self {
		Self::new(cfg.include_groups)
	}
}
impl Default for CatalogIndexer {
	fn default() -> Self {
		Self::new(true)
	}
}
impl<S> CatalogIndexer<S>
where
	S: SpecificityScorer,
{
	pub fn with_scorer<T>(self, scorer: T) -> CatalogIndexer<T>
	where
		T: SpecificityScorer,
	{
		CatalogIndexer { scorer, include_groups: self.include_groups }
	}

	pub fn include_groups(&self) -> bool {
		self.include_groups
	}

	/// Builds both structures in a single pass over the graph in id order.
	///
	/// Nodes without a usable search name are left out of the index but keep their place in the
	/// parent map. A cycle among groups fails the whole build.
	pub fn build(&self, graph: &CatalogGraph) -> Result<(SearchIndex, ParentMap)> {
		hierarchy::ensure_acyclic(graph)?;

		let parents = ParentMap::build(graph);
		let mut index = SearchIndex::default();
		let mut skipped = 0_usize;

		for (id, node) in graph.iter() {
			let kind = node.kind();

			if kind == NodeKind::Group && !self.include_groups {
				continue;
			}

			let Some(search_name) = node.search_name() else {
				tracing::warn!(id, kind = kind.as_str(), "Catalog node has no search name.");

				skipped += 1;

				continue;
			};
			let tokens = text::tokenize(search_name);

			if tokens.is_empty() {
				tracing::warn!(id, search_name, "Catalog search name yields no tokens.");

				skipped += 1;

				continue;
			}

			let ranking = RankingInfo {
				specificity: self.scorer.score(id, node),
				display_name: node.display_name().to_string(),
			};
			let Some(entry) = index.push(id, kind, ranking) else {
				tracing::warn!(id, "Catalog index is full.");

				break;
			};

			for token in &tokens {
				index.trie.insert(token, entry, kind);
			}
		}

		tracing::info!(
			entries = index.len(),
			skipped,
			trie_nodes = index.trie.len(),
			parent_entries = parents.len(),
			"Catalog index built."
		);

		Ok((index, parents))
	}
}

/// Builds with [`DeclaredSpecificity`].
pub fn build(graph: &CatalogGraph, include_groups: bool) -> Result<(SearchIndex, ParentMap)> {
	CatalogIndexer::new(include_groups).build(graph)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{CatalogNode, VariableNode};

	fn variable(display_name: &str, search_name: &str) -> CatalogNode {
		CatalogNode::Variable(VariableNode {
			display_name: display_name.to_string(),
			search_name: Some(search_name.to_string()),
			specificity: None,
		})
	}

	#[test]
	fn entries_follow_id_order() {
		let graph = CatalogGraph::from_nodes([
			("b_x", variable("B", "beta")),
			("a_x", variable("A", "alpha")),
		]);
		let (index, _) = build(&graph, true).expect("Acyclic graph.");
		let ids: Vec<&str> = index.entries().iter().map(|entry| entry.id.as_str()).collect();

		assert_eq!(ids, vec!["a_x", "b_x"]);
		assert_eq!(index.ranking("b_x").map(|info| info.specificity), Some(2));
	}

	#[test]
	fn display_name_is_copied_verbatim() {
		let graph = CatalogGraph::from_nodes([("sv", variable(" Median Age ", "median age"))]);
		let (index, _) = build(&graph, true).expect("Acyclic graph.");

		let display_name = index.ranking("sv").map(|info| info.display_name.as_str());

		assert_eq!(display_name, Some(" Median Age "));
	}

	#[test]
	fn custom_scorer_is_used() {
		let graph = CatalogGraph::from_nodes([("sv", variable("x", "x"))]);
		let indexer = CatalogIndexer::new(true).with_scorer(|id: &str, _: &CatalogNode| {
			u32::try_from(id.len()).unwrap_or(u32::MAX)
		});
		let (index, _) = indexer.build(&graph).expect("Acyclic graph.");

		assert_eq!(index.ranking("sv").map(|info| info.specificity), Some(2));
	}
}
