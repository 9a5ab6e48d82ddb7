use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
	graph::NodeKind,
	index::{IndexEntry, SearchIndex},
	text,
	trie::EntryId,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityInfo {
	pub id: String,
	pub display_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
	pub variables: Vec<EntityInfo>,
	pub groups: Vec<EntityInfo>,
}
impl SearchResults {
	/// Caps each list at `max` entries.
	pub fn truncate(&mut self, max: usize) {
		self.variables.truncate(max);
		self.groups.truncate(max);
	}

	pub fn is_empty(&self) -> bool {
		self.variables.is_empty() && self.groups.is_empty()
	}
}

/// Ids found under every token, per kind, ranked by specificity then display name.
///
/// Tokens are trimmed and lowercased first; blank tokens are ignored. A token that reaches no
/// trie node empties the whole result.
pub fn search<T>(tokens: &[T], index: &SearchIndex) -> SearchResults
where
	T: AsRef<str>,
{
	let normalized: Vec<String> = tokens
		.iter()
		.map(|token| text::normalize_token(token.as_ref()))
		.filter(|token| !token.is_empty())
		.collect();

	search_normalized(&normalized, index)
}

/// [`search`] over tokens that are already trimmed, lowercased and non-empty.
fn search_normalized(tokens: &[String], index: &SearchIndex) -> SearchResults {
	let mut variables: Option<BTreeSet<EntryId>> = None;
	let mut groups: Option<BTreeSet<EntryId>> = None;

	for token in tokens {
		let Some(node) = index.walk(token) else {
			return SearchResults::default();
		};

		variables = Some(intersect(variables, node.ids(NodeKind::Variable)));
		groups = Some(intersect(groups, node.ids(NodeKind::Group)));
	}

	SearchResults {
		variables: ranked(index, variables.unwrap_or_default()),
		groups: ranked(index, groups.unwrap_or_default()),
	}
}

fn intersect(acc: Option<BTreeSet<EntryId>>, ids: &BTreeSet<EntryId>) -> BTreeSet<EntryId> {
	match acc {
		None => ids.clone(),
		Some(acc) => acc.intersection(ids).copied().collect(),
	}
}

fn ranked(index: &SearchIndex, ids: BTreeSet<EntryId>) -> Vec<EntityInfo> {
	let mut entries: Vec<&IndexEntry> = ids.into_iter().filter_map(|id| index.entry(id)).collect();

	entries.sort_by(|a, b| {
		a.ranking
			.specificity
			.cmp(&b.ranking.specificity)
			.then_with(|| a.ranking.display_name.cmp(&b.ranking.display_name))
			.then_with(|| a.id.cmp(&b.id))
	});

	entries
		.into_iter()
		.map(|entry| EntityInfo {
			id: entry.id.clone(),
			display_name: entry.ranking.display_name.clone(),
		})
		.collect()
}

/// Query front end holding the configured limits.
#[derive(Clone, Copy, Debug)]
pub struct SearchQueryEngine {
	max_results: usize,
	min_token_chars: usize,
}
impl SearchQueryEngine {
	pub fn new(max_results: usize, min_token_chars: usize) -> Self {
		Self { max_results, min_token_chars }
	}

	pub fn from_config(cfg: &mixer_config::Search) -> Self {
		Self::new(
			usize::try_from(cfg.max_results).unwrap_or(usize::MAX),
			usize::try_from(cfg.min_token_chars).unwrap_or(usize::MAX),
		)
	}

	/// Searches with the tokens long enough to count, then applies the result cap.
	pub fn search<T>(&self, tokens: &[T], index: &SearchIndex) -> SearchResults
	where
		T: AsRef<str>,
	{
		let usable: Vec<String> = tokens
			.iter()
			.map(|token| text::normalize_token(token.as_ref()))
			.filter(|token| !token.is_empty() && token.chars().count() >= self.min_token_chars)
			.collect();

		if usable.is_empty() {
			tracing::debug!(tokens = tokens.len(), "Query has no usable tokens.");

			return SearchResults::default();
		}

		let mut results = search_normalized(&usable, index);

		results.truncate(self.max_results);

		results
	}

	/// Tokenizes free text the same way catalog search names are tokenized.
	pub fn search_text(&self, query: &str, index: &SearchIndex) -> SearchResults {
		self.search(&text::tokenize(query), index)
	}
}
impl Default for SearchQueryEngine {
	fn default() -> Self {
		Self::from_config(&mixer_config::Search::default())
	}
}
