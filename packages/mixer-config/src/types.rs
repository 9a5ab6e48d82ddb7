use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub catalog: Catalog,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Catalog {
	/// Index group ids alongside variable ids. Disable to serve variable-only search.
	pub include_groups: bool,
	/// Optional. Catalog snapshot used when a command does not name one explicitly.
	pub path: Option<PathBuf>,
}
impl Default for Catalog {
	fn default() -> Self {
		Self { include_groups: true, path: None }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Upper bound applied separately to variable and group results.
	pub max_results: u32,
	/// Query tokens shorter than this many characters are ignored.
	pub min_token_chars: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { max_results: 100, min_token_chars: 1 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub use_builtin_table: bool,
	pub entries: Vec<RankingEntry>,
}
impl Default for Ranking {
	fn default() -> Self {
		Self { use_builtin_table: true, entries: Vec::new() }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct RankingEntry {
	pub provider: String,
	#[serde(default)]
	pub measurement_method: String,
	pub priority: u32,
}
