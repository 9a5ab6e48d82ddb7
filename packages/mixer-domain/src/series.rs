use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One provider's observations for a single (variable, entity) pair.
///
/// Dates are zero-padded ISO-like strings of uniform granularity, so lexicographic order is
/// chronological order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SourceSeries {
	pub values: BTreeMap<String, f64>,
	pub provider: String,
	pub measurement_method: String,
	pub observation_period: String,
	pub unit: String,
	pub scaling_factor: String,
	pub provenance_url: String,
}
impl SourceSeries {
	pub fn latest_date(&self) -> Option<&str> {
		self.values.last_key_value().map(|(date, _)| date.as_str())
	}
}

/// Every source series available for one (variable, entity) pair.
///
/// `resolved_values` and `provenance_url` stay empty until the series is filtered and ranked.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ObservationTimeSeries {
	pub source_series: Vec<SourceSeries>,
	pub resolved_values: BTreeMap<String, f64>,
	pub provenance_url: String,
}
impl ObservationTimeSeries {
	pub fn new(source_series: Vec<SourceSeries>) -> Self {
		Self { source_series, ..Default::default() }
	}
}

/// Optional exact-match constraints. `None` and empty strings both mean "no constraint".
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FilterCriteria {
	pub measurement_method: Option<String>,
	pub unit: Option<String>,
	pub observation_period: Option<String>,
}
impl FilterCriteria {
	pub fn is_unconstrained(&self) -> bool {
		[&self.measurement_method, &self.unit, &self.observation_period]
			.into_iter()
			.all(|field| constraint(field).is_none())
	}

	pub fn matches(&self, series: &SourceSeries) -> bool {
		field_matches(&self.measurement_method, &series.measurement_method)
			&& field_matches(&self.unit, &series.unit)
			&& field_matches(&self.observation_period, &series.observation_period)
	}
}

fn constraint(field: &Option<String>) -> Option<&str> {
	field.as_deref().filter(|value| !value.is_empty())
}

fn field_matches(field: &Option<String>, actual: &str) -> bool {
	constraint(field).is_none_or(|wanted| wanted == actual)
}
