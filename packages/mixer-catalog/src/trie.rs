use std::collections::{BTreeMap, BTreeSet};

use crate::graph::NodeKind;

/// Position of an indexed catalog id in [`crate::SearchIndex`].
pub type EntryId = u32;

pub type TrieNodeId = usize;

const ROOT: TrieNodeId = 0;

/// One character step of the trie.
///
/// The id sets hold every entry whose token passes through this node, not only the tokens that
/// end here, so a prefix lookup is a single walk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrieNode {
	pub children: BTreeMap<char, TrieNodeId>,
	pub variables: BTreeSet<EntryId>,
	pub groups: BTreeSet<EntryId>,
}
impl TrieNode {
	pub fn ids(&self, kind: NodeKind) -> &BTreeSet<EntryId> {
		match kind {
			NodeKind::Variable => &self.variables,
			NodeKind::Group => &self.groups,
		}
	}

	fn ids_mut(&mut self, kind: NodeKind) -> &mut BTreeSet<EntryId> {
		match kind {
			NodeKind::Variable => &mut self.variables,
			NodeKind::Group => &mut self.groups,
		}
	}
}

/// Arena-backed prefix trie. Node 0 is the root and never carries ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Trie {
	nodes: Vec<TrieNode>,
}
impl Default for Trie {
	fn default() -> Self {
		Self { nodes: vec![TrieNode::default()] }
	}
}
impl Trie {
	pub fn root(&self) -> &TrieNode {
		&self.nodes[ROOT]
	}

	pub fn node(&self, id: TrieNodeId) -> Option<&TrieNode> {
		self.nodes.get(id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.len() == 1
	}

	/// The node reached by walking every character of `token`, if that path exists.
	pub fn walk(&self, token: &str) -> Option<&TrieNode> {
		let mut current = ROOT;

		for ch in token.chars() {
			current = *self.nodes[current].children.get(&ch)?;
		}

		(current != ROOT).then(|| &self.nodes[current])
	}

	/// Records `entry` on every prefix node of `token`, creating missing nodes.
	pub fn insert(&mut self, token: &str, entry: EntryId, kind: NodeKind) {
		let mut current = ROOT;

		for ch in token.chars() {
			current = match self.nodes[current].children.get(&ch) {
				Some(&next) => next,
				None => {
					let next = self.nodes.len();

					self.nodes.push(TrieNode::default());
					self.nodes[current].children.insert(ch, next);

					next
				},
			};

			self.nodes[current].ids_mut(kind).insert(entry);
		}
	}
}
