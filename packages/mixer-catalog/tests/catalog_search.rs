use std::{collections::BTreeSet, sync::Arc, thread};

use mixer_catalog::{
	CatalogGraph, CatalogHandle, CatalogIndexer, CatalogNode, EntityInfo, GroupNode,
	SearchIndex, SearchQueryEngine, SearchResults, VariableNode, search, text,
};

fn group(name: &str, child_groups: &[&str], child_variables: &[&str]) -> CatalogNode {
	CatalogNode::Group(GroupNode {
		display_name: name.to_string(),
		search_name: Some(name.to_string()),
		specificity: None,
		child_groups: child_groups.iter().map(|id| id.to_string()).collect(),
		child_variables: child_variables.iter().map(|id| id.to_string()).collect(),
	})
}

fn variable(display_name: &str, search_name: &str) -> CatalogNode {
	CatalogNode::Variable(VariableNode {
		display_name: display_name.to_string(),
		search_name: Some(search_name.to_string()),
		specificity: None,
	})
}

fn sample_graph() -> CatalogGraph {
	CatalogGraph::from_nodes([
		("group_1", group("ab1 zdx", &["group_3_1"], &["sv_1_1", "sv_1_2"])),
		("group_3_1", group("zdx, bd", &[], &["sv_3", "sv3"])),
		("sv_1_1", variable("sv1", "ab1 ac3")),
		("sv_1_2", variable("sv2", "ac3, bd")),
		("sv_3", variable("sv3", "zdx")),
		("sv3", variable("sv4", "bd,")),
	])
}

fn sample_index() -> SearchIndex {
	CatalogIndexer::new(true).build(&sample_graph()).expect("Acyclic graph.").0
}

fn ids(entities: &[EntityInfo]) -> Vec<&str> {
	entities.iter().map(|entity| entity.id.as_str()).collect()
}

fn id_sets(results: &SearchResults) -> (BTreeSet<String>, BTreeSet<String>) {
	let collect = |entities: &[EntityInfo]| entities.iter().map(|e| e.id.clone()).collect();

	(collect(&results.variables), collect(&results.groups))
}

#[test]
fn single_tokens_rank_by_specificity_then_name() {
	let index = sample_index();

	let results = search(&["zdx"], &index);

	assert_eq!(ids(&results.variables), vec!["sv_3"]);
	assert_eq!(ids(&results.groups), vec!["group_1", "group_3_1"]);

	let results = search(&["bd"], &index);

	assert_eq!(ids(&results.variables), vec!["sv_1_2", "sv3"]);
	assert_eq!(ids(&results.groups), vec!["group_3_1"]);
	assert_eq!(results.variables[0].display_name, "sv2");

	let results = search(&["a"], &index);

	assert_eq!(ids(&results.variables), vec!["sv_1_1", "sv_1_2"]);
	assert_eq!(ids(&results.groups), vec!["group_1"]);
}

#[test]
fn tokens_are_combined_by_intersection() {
	let index = sample_index();

	let results = search(&["ac3", "bd"], &index);

	assert_eq!(ids(&results.variables), vec!["sv_1_2"]);
	assert!(results.groups.is_empty());

	let results = search(&["ab1", "zdx"], &index);

	assert!(results.variables.is_empty());
	assert_eq!(ids(&results.groups), vec!["group_1"]);
}

#[test]
fn one_unknown_token_empties_the_result() {
	let index = sample_index();

	assert!(search(&["q"], &index).is_empty());
	assert!(search(&["zdx", "q"], &index).is_empty());
	assert!(search(&["zdxx"], &index).is_empty());
}

#[test]
fn prefixes_return_supersets() {
	let index = sample_index();
	let graph = sample_graph();
	let tokens: BTreeSet<String> = graph
		.iter()
		.filter_map(|(_, node)| node.search_name())
		.flat_map(text::tokenize)
		.collect();

	for token in &tokens {
		let (full_vars, full_groups) = id_sets(&search(&[token], &index));

		for end in 1..token.len() {
			let (vars, groups) = id_sets(&search(&[&token[..end]], &index));

			assert!(vars.is_superset(&full_vars), "{} vs {token}", &token[..end]);
			assert!(groups.is_superset(&full_groups), "{} vs {token}", &token[..end]);
		}
	}
}

#[test]
fn pairs_equal_the_intersection_of_singles() {
	let index = sample_index();
	let queries = ["a", "ab1", "ac3", "b", "bd", "z", "zdx"];

	for left in queries {
		for right in queries {
			let (left_vars, left_groups) = id_sets(&search(&[left], &index));
			let (right_vars, right_groups) = id_sets(&search(&[right], &index));
			let (vars, groups) = id_sets(&search(&[left, right], &index));

			assert_eq!(vars, &left_vars & &right_vars, "{left} + {right}");
			assert_eq!(groups, &left_groups & &right_groups, "{left} + {right}");
		}
	}
}

#[test]
fn engine_applies_configured_limits() {
	let index = sample_index();
	let cfg = mixer_config::Search { max_results: 1, min_token_chars: 2 };
	let engine = SearchQueryEngine::from_config(&cfg);

	let results = engine.search_text("BD", &index);

	assert_eq!(ids(&results.variables), vec!["sv_1_2"]);
	assert_eq!(ids(&results.groups), vec!["group_3_1"]);
	assert!(engine.search_text("z", &index).is_empty());
	assert_eq!(ids(&engine.search_text("z, zdx", &index).groups), vec!["group_1"]);
}

#[test]
fn rebuild_swaps_snapshots_without_disturbing_readers() {
	let handle = CatalogHandle::empty();
	let indexer = CatalogIndexer::new(true);

	assert_eq!(handle.version(), 0);
	assert!(search(&["zdx"], &handle.current().index).is_empty());

	let version = handle.rebuild(&indexer, &sample_graph()).expect("Acyclic graph.");
	let held = handle.current();

	assert_eq!(version, 1);
	assert_eq!(ids(&search(&["zdx"], &held.index).variables), vec!["sv_3"]);

	let mut next = sample_graph();

	next.insert("sv_4", variable("sv5", "zdx"));

	assert_eq!(handle.rebuild(&indexer, &next).expect("Acyclic graph."), 2);
	assert_eq!(ids(&search(&["zdx"], &held.index).variables), vec!["sv_3"]);
	assert_eq!(ids(&search(&["zdx"], &handle.current().index).variables), vec!["sv_3", "sv_4"]);
}

#[test]
fn failed_rebuild_keeps_the_current_snapshot() {
	let handle = CatalogHandle::empty();
	let indexer = CatalogIndexer::new(true);

	handle.rebuild(&indexer, &sample_graph()).expect("Acyclic graph.");

	let mut cyclic = sample_graph();

	cyclic.insert("group_3_1", group("zdx, bd", &["group_1"], &[]));

	assert!(handle.rebuild(&indexer, &cyclic).is_err());
	assert_eq!(handle.version(), 1);
	assert_eq!(handle.current().parents.parents("sv_3"), ["group_3_1".to_string()]);
}

#[test]
fn readers_see_whole_snapshots_during_publication() {
	let handle = Arc::new(CatalogHandle::empty());
	let indexer = CatalogIndexer::new(true);
	let graph = sample_graph();

	thread::scope(|scope| {
		for _ in 0..4 {
			let handle = Arc::clone(&handle);

			scope.spawn(move || {
				for _ in 0..200 {
					let snapshot = handle.current();
					let results = search(&["zdx"], &snapshot.index);

					if snapshot.version == 0 {
						assert!(results.is_empty());
					} else {
						assert_eq!(ids(&results.variables), vec!["sv_3"]);
					}
				}
			});
		}

		for _ in 0..20 {
			handle.rebuild(&indexer, &graph).expect("Acyclic graph.");
		}
	});

	assert_eq!(handle.version(), 20);
}
