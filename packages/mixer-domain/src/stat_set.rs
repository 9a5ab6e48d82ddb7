use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
	facet::Facet,
	ranking::{RankingTable, SourceSeriesRanker},
	resolve::{PointStat, select_from_ranked},
	series::{FilterCriteria, ObservationTimeSeries},
};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StatSetRequest {
	/// Empty means the latest available date per entity.
	pub date: String,
	pub criteria: FilterCriteria,
}

/// Point values for many (variable, entity) pairs at one date.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct StatSet {
	/// variable -> entity -> point.
	pub data: BTreeMap<String, BTreeMap<String, PointStat>>,
	pub facets: BTreeMap<String, Facet>,
}

pub fn resolve_stat_set<I>(table: &RankingTable, request: &StatSetRequest, inputs: I) -> StatSet
where
	I: IntoIterator<Item = (String, String, ObservationTimeSeries)>,
{
	let ranker = SourceSeriesRanker::new(table);
	let mut out = StatSet::default();

	for (variable, entity, series) in inputs {
		let points = out.data.entry(variable).or_default();
		let ranked = ranker.rank(&series.source_series, &request.criteria);
		let Some((source, date, value)) = select_from_ranked(&ranked, &request.date) else {
			tracing::debug!(%entity, date = %request.date, "No value for entity.");

			continue;
		};
		let facet = Facet::of(source);
		let facet_id = facet.id();

		points.insert(
			entity,
			PointStat { date: date.to_string(), value, facet_id: facet_id.clone() },
		);
		out.facets.entry(facet_id).or_insert(facet);
	}

	out
}
