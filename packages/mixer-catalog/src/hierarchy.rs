use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::{
	Error, Result,
	graph::{CatalogGraph, CatalogNode},
};

/// Parent groups per catalog id.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParentMap {
	parents: BTreeMap<String, Vec<String>>,
}
impl ParentMap {
	/// Direct parents of every group and variable. Groups are visited in id order, so each list
	/// is sorted and carries no duplicates even when a group names a child twice.
	pub fn build(graph: &CatalogGraph) -> Self {
		let mut parents: BTreeMap<String, Vec<String>> = BTreeMap::new();

		for (group_id, group) in graph.groups() {
			for child in group.child_groups.iter().chain(&group.child_variables) {
				if !graph.contains(child) {
					tracing::warn!(
						group = group_id,
						child = %child,
						"Catalog group references an unknown child."
					);
				}

				let list = parents.entry(child.clone()).or_default();

				if !list.iter().any(|parent| parent == group_id) {
					list.push(group_id.to_string());
				}
			}
		}

		Self { parents }
	}

	pub fn parents(&self, id: &str) -> &[String] {
		self.parents.get(id).map_or(&[][..], Vec::as_slice)
	}

	/// Every group that contains `id` transitively, nearest first, each listed once.
	pub fn ancestors(&self, id: &str) -> Vec<String> {
		let mut out = Vec::new();
		let mut seen: HashSet<&str> = HashSet::new();
		let mut queue: VecDeque<&str> = self.parents(id).iter().map(String::as_str).collect();

		seen.insert(id);

		while let Some(next) = queue.pop_front() {
			if !seen.insert(next) {
				continue;
			}

			out.push(next.to_string());
			queue.extend(self.parents(next).iter().map(String::as_str));
		}

		out
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.parents.iter().map(|(id, parents)| (id.as_str(), parents.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.parents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parents.is_empty()
	}
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
	Active,
	Done,
}

/// Fails with the first group cycle found, walking roots in id order.
///
/// Every child id that names a group is an edge, including group ids listed among a group's
/// child variables.
pub fn ensure_acyclic(graph: &CatalogGraph) -> Result<()> {
	let mut marks: HashMap<&str, Visit> = HashMap::new();

	for (root, _) in graph.groups() {
		if marks.contains_key(root) {
			continue;
		}

		let mut stack: Vec<(&str, Vec<&str>, usize)> =
			vec![(root, group_children(graph, root), 0)];

		marks.insert(root, Visit::Active);

		while let Some(frame) = stack.last_mut() {
			let Some(&child) = frame.1.get(frame.2) else {
				marks.insert(frame.0, Visit::Done);
				stack.pop();

				continue;
			};

			frame.2 += 1;

			match marks.get(child) {
				Some(Visit::Done) => {},
				Some(Visit::Active) => {
					let start = stack.iter().position(|(seen, _, _)| *seen == child).unwrap_or(0);
					let mut cycle: Vec<String> =
						stack[start..].iter().map(|(seen, _, _)| seen.to_string()).collect();

					cycle.push(child.to_string());

					return Err(Error::CyclicGraph { cycle });
				},
				None => {
					marks.insert(child, Visit::Active);
					stack.push((child, group_children(graph, child), 0));
				},
			}
		}
	}

	Ok(())
}

fn group_children<'g>(graph: &'g CatalogGraph, id: &str) -> Vec<&'g str> {
	let Some(group) = graph.get(id).and_then(CatalogNode::as_group) else {
		return Vec::new();
	};

	group
		.child_groups
		.iter()
		.chain(&group.child_variables)
		.map(String::as_str)
		.filter(|child| graph.get(child).is_some_and(|node| node.as_group().is_some()))
		.collect()
}
