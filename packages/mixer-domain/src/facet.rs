use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
	ranking::SourceSeriesRanker,
	series::{FilterCriteria, ObservationTimeSeries, SourceSeries},
};

/// Descriptive metadata of a source series, without its values.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Facet {
	pub provider: String,
	pub measurement_method: String,
	pub observation_period: String,
	pub unit: String,
	pub scaling_factor: String,
	pub provenance_url: String,
}
impl Facet {
	pub fn of(series: &SourceSeries) -> Self {
		Self {
			provider: series.provider.clone(),
			measurement_method: series.measurement_method.clone(),
			observation_period: series.observation_period.clone(),
			unit: series.unit.clone(),
			scaling_factor: series.scaling_factor.clone(),
			provenance_url: series.provenance_url.clone(),
		}
	}

	/// Stable 16 hex digit identifier of the metadata.
	pub fn id(&self) -> String {
		let mut hasher = blake3::Hasher::new();

		for field in [
			&self.provider,
			&self.measurement_method,
			&self.observation_period,
			&self.unit,
			&self.scaling_factor,
			&self.provenance_url,
		] {
			hasher.update(&(field.len() as u64).to_le_bytes());
			hasher.update(field.as_bytes());
		}

		let hex = hasher.finalize().to_hex();

		hex.as_str()[..16].to_string()
	}
}

/// Facets of the series surviving `criteria`, best first, each listed once.
pub fn series_facets(
	ranker: SourceSeriesRanker<'_>,
	series: &ObservationTimeSeries,
	criteria: &FilterCriteria,
) -> Vec<Facet> {
	let mut seen = HashSet::new();

	ranker
		.rank(&series.source_series, criteria)
		.into_iter()
		.map(Facet::of)
		.filter(|facet| seen.insert(facet.id()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ranking::RankingTable;

	fn source(provider: &str, method: &str, values: &[(&str, f64)]) -> SourceSeries {
		SourceSeries {
			values: values.iter().map(|(date, value)| (date.to_string(), *value)).collect(),
			provider: provider.to_string(),
			measurement_method: method.to_string(),
			observation_period: "P1Y".to_string(),
			provenance_url: "census.gov".to_string(),
			..Default::default()
		}
	}

	#[test]
	fn facet_id_ignores_values() {
		let a = source("CensusPEP", "CensusPEPSurvey", &[("2011", 1.0)]);
		let b = source("CensusPEP", "CensusPEPSurvey", &[("2019", 7.0)]);

		assert_eq!(Facet::of(&a).id(), Facet::of(&b).id());
		assert_eq!(Facet::of(&a).id().len(), 16);
	}

	#[test]
	fn facet_id_separates_field_boundaries() {
		let a = source("ab", "c", &[]);
		let b = source("a", "bc", &[]);

		assert_ne!(Facet::of(&a).id(), Facet::of(&b).id());
	}

	#[test]
	fn facets_follow_rank_order_without_duplicates() {
		let table = RankingTable::builtin();
		let series = ObservationTimeSeries::new(vec![
			source("zeta", "m", &[("2011", 1.0)]),
			source("CensusPEP", "CensusPEPSurvey", &[("2011", 2.0)]),
			source("zeta", "m", &[("2012", 3.0)]),
		]);
		let facets =
			series_facets(SourceSeriesRanker::new(&table), &series, &FilterCriteria::default());
		let providers: Vec<&str> = facets.iter().map(|facet| facet.provider.as_str()).collect();

		assert_eq!(providers, vec!["CensusPEP", "zeta"]);
	}
}
