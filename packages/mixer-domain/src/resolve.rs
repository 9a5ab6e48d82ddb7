use serde::{Deserialize, Serialize};

use crate::{
	facet::Facet,
	ranking::{RankingTable, SourceSeriesRanker},
	series::{FilterCriteria, ObservationTimeSeries, SourceSeries},
};

/// A resolved value and the facet it was taken from.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PointStat {
	pub date: String,
	pub value: f64,
	pub facet_id: String,
}

/// Picks one value per date from ranked source series.
#[derive(Clone, Copy, Debug)]
pub struct TimeSeriesResolver<'a> {
	ranker: SourceSeriesRanker<'a>,
}
impl<'a> TimeSeriesResolver<'a> {
	pub fn new(table: &'a RankingTable) -> Self {
		Self { ranker: SourceSeriesRanker::new(table) }
	}

	pub fn ranker(&self) -> SourceSeriesRanker<'a> {
		self.ranker
	}

	/// The value at `date`, or the latest value when `date` is empty.
	pub fn value_at(&self, series: &ObservationTimeSeries, date: &str) -> Option<f64> {
		self.select(series, &FilterCriteria::default(), date).map(|(_, _, value)| value)
	}

	pub fn point_at(
		&self,
		series: &ObservationTimeSeries,
		criteria: &FilterCriteria,
		date: &str,
	) -> Option<PointStat> {
		let (source, date, value) = self.select(series, criteria, date)?;

		Some(PointStat { date: date.to_string(), value, facet_id: Facet::of(source).id() })
	}

	fn select<'s>(
		&self,
		series: &'s ObservationTimeSeries,
		criteria: &FilterCriteria,
		date: &str,
	) -> Option<(&'s SourceSeries, &'s str, f64)> {
		let ranked = self.ranker.rank(&series.source_series, criteria);

		select_from_ranked(&ranked, date)
	}
}

/// Resolution over series that are already in rank order.
///
/// A dated lookup returns the first series holding that date. The latest lookup finds the
/// greatest date across all series and takes it from the best series holding it, so a lower
/// ranked provider wins when it alone has the most recent observation.
pub fn select_from_ranked<'s>(
	ranked: &[&'s SourceSeries],
	date: &str,
) -> Option<(&'s SourceSeries, &'s str, f64)> {
	if !date.is_empty() {
		return ranked.iter().find_map(|&source| {
			source.values.get_key_value(date).map(|(key, value)| (source, key.as_str(), *value))
		});
	}

	let mut best: Option<(&SourceSeries, &str, f64)> = None;

	for &source in ranked {
		let Some((latest, value)) = source.values.last_key_value() else { continue };

		if best.is_none_or(|(_, best_date, _)| latest.as_str() > best_date) {
			best = Some((source, latest.as_str(), *value));
		}
	}

	best
}
