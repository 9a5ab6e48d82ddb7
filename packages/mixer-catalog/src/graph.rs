use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	Variable,
	Group,
}
impl NodeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Variable => "variable",
			Self::Group => "group",
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VariableNode {
	pub display_name: String,
	#[serde(default)]
	pub search_name: Option<String>,
	/// Precomputed count of defining constraints. Opaque to the indexer.
	#[serde(default)]
	pub specificity: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GroupNode {
	pub display_name: String,
	#[serde(default)]
	pub search_name: Option<String>,
	#[serde(default)]
	pub specificity: Option<u32>,
	#[serde(default)]
	pub child_groups: Vec<String>,
	#[serde(default)]
	pub child_variables: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogNode {
	Variable(VariableNode),
	Group(GroupNode),
}
impl CatalogNode {
	pub fn kind(&self) -> NodeKind {
		match self {
			Self::Variable(_) => NodeKind::Variable,
			Self::Group(_) => NodeKind::Group,
		}
	}

	pub fn display_name(&self) -> &str {
		match self {
			Self::Variable(node) => &node.display_name,
			Self::Group(node) => &node.display_name,
		}
	}

	/// The text tokens are derived from. `None` when absent or blank.
	pub fn search_name(&self) -> Option<&str> {
		let raw = match self {
			Self::Variable(node) => node.search_name.as_deref(),
			Self::Group(node) => node.search_name.as_deref(),
		};

		raw.filter(|name| !name.trim().is_empty())
	}

	pub fn declared_specificity(&self) -> Option<u32> {
		match self {
			Self::Variable(node) => node.specificity,
			Self::Group(node) => node.specificity,
		}
	}

	pub fn as_group(&self) -> Option<&GroupNode> {
		match self {
			Self::Group(node) => Some(node),
			Self::Variable(_) => None,
		}
	}
}

/// Read-only catalog snapshot. Nodes are keyed by id; iteration is in id order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CatalogGraph {
	pub nodes: BTreeMap<String, CatalogNode>,
}
impl CatalogGraph {
	pub fn from_nodes<I, K>(nodes: I) -> Self
	where
		I: IntoIterator<Item = (K, CatalogNode)>,
		K: Into<String>,
	{
		Self { nodes: nodes.into_iter().map(|(id, node)| (id.into(), node)).collect() }
	}

	pub fn insert(&mut self, id: impl Into<String>, node: CatalogNode) -> Option<CatalogNode> {
		self.nodes.insert(id.into(), node)
	}

	pub fn get(&self, id: &str) -> Option<&CatalogNode> {
		self.nodes.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogNode)> {
		self.nodes.iter().map(|(id, node)| (id.as_str(), node))
	}

	pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupNode)> {
		self.iter().filter_map(|(id, node)| node.as_group().map(|group| (id, group)))
	}

	/// Child group ids of `id`; empty for variables and unknown ids.
	pub fn child_groups(&self, id: &str) -> &[String] {
		self.get(id)
			.and_then(CatalogNode::as_group)
			.map_or(&[][..], |group| group.child_groups.as_slice())
	}
}
