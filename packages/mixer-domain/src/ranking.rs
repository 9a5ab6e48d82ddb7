use std::{cmp::Ordering, collections::HashMap};

use crate::series::{FilterCriteria, ObservationTimeSeries, SourceSeries};
use mixer_config::Ranking;

/// (provider, measurement method, priority). Lower priority ranks first.
const BUILTIN_ENTRIES: &[(&str, &str, u32)] = &[
	// Population
	("CensusPEP", "CensusPEPSurvey", 0),
	("CensusACS5YearSurvey", "CensusACS5yrSurvey", 1),
	("EurostatData", "EurostatRegionalPopulationData", 2),
	("WorldDevelopmentIndicators", "", 3),
	// Unemployment rate
	("BLS_LAUS", "BLSSeasonallyUnadjusted", 0),
	("EurostatData", "", 1),
	// Covid
	("NYT_COVID19", "NYT_COVID19_GitHub", 0),
	// Health
	("CDC500", "AgeAdjustedPrevalence", 0),
];

/// Precomputed priorities keyed by (provider, measurement method).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankingTable {
	by_provider: HashMap<String, HashMap<String, u32>>,
}
impl RankingTable {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn builtin() -> Self {
		let mut table = Self::empty();

		for (provider, method, priority) in BUILTIN_ENTRIES {
			table.insert(provider, method, *priority);
		}

		table
	}

	/// Built-in entries (when enabled) overlaid with the configured ones.
	pub fn from_config(cfg: &Ranking) -> Self {
		let mut table = if cfg.use_builtin_table { Self::builtin() } else { Self::empty() };

		for entry in &cfg.entries {
			table.insert(&entry.provider, &entry.measurement_method, entry.priority);
		}

		table
	}

	pub fn insert(&mut self, provider: &str, measurement_method: &str, priority: u32) {
		self.by_provider
			.entry(provider.to_string())
			.or_default()
			.insert(measurement_method.to_string(), priority);
	}

	pub fn priority(&self, provider: &str, measurement_method: &str) -> Option<u32> {
		self.by_provider.get(provider)?.get(measurement_method).copied()
	}

	pub fn len(&self) -> usize {
		self.by_provider.values().map(HashMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Filters candidate source series and orders them best first.
#[derive(Clone, Copy, Debug)]
pub struct SourceSeriesRanker<'a> {
	table: &'a RankingTable,
}
impl<'a> SourceSeriesRanker<'a> {
	pub fn new(table: &'a RankingTable) -> Self {
		Self { table }
	}

	pub fn table(&self) -> &'a RankingTable {
		self.table
	}

	/// Table entries first by ascending priority, then everything else. Remaining ties fall
	/// through the descriptive metadata so the order never depends on input order unless two
	/// series carry identical metadata.
	pub fn compare(&self, a: &SourceSeries, b: &SourceSeries) -> Ordering {
		let rank_a = self.table.priority(&a.provider, &a.measurement_method);
		let rank_b = self.table.priority(&b.provider, &b.measurement_method);
		let by_rank = match (rank_a, rank_b) {
			(Some(a), Some(b)) => a.cmp(&b),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		};

		by_rank
			.then_with(|| a.provider.cmp(&b.provider))
			.then_with(|| a.measurement_method.cmp(&b.measurement_method))
			.then_with(|| a.observation_period.cmp(&b.observation_period))
			.then_with(|| a.unit.cmp(&b.unit))
			.then_with(|| a.scaling_factor.cmp(&b.scaling_factor))
			.then_with(|| a.provenance_url.cmp(&b.provenance_url))
	}

	/// The matching subset of `series`, best first. Empty when nothing satisfies `criteria`.
	pub fn rank<'s>(
		&self,
		series: &'s [SourceSeries],
		criteria: &FilterCriteria,
	) -> Vec<&'s SourceSeries> {
		let mut ranked: Vec<&SourceSeries> =
			series.iter().filter(|source| criteria.matches(source)).collect();

		ranked.sort_by(|a, b| self.compare(a, b));

		ranked
	}

	/// Replaces the candidates with the ranked survivors and resolves the values of the best
	/// one. A series with no survivors ends up with empty resolved values and provenance.
	pub fn filter_and_rank(&self, series: &mut ObservationTimeSeries, criteria: &FilterCriteria) {
		let before = series.source_series.len();

		series.source_series.retain(|source| criteria.matches(source));
		series.source_series.sort_by(|a, b| self.compare(a, b));

		match series.source_series.first() {
			Some(best) => {
				series.resolved_values = best.values.clone();
				series.provenance_url = best.provenance_url.clone();
			},
			None => {
				tracing::debug!(candidates = before, ?criteria, "No source series matched criteria.");

				series.resolved_values.clear();
				series.provenance_url.clear();
			},
		}
	}
}
