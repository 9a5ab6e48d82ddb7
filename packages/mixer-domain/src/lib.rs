//! Source-series reconciliation: filter provider series, rank them, and resolve one answer
//! per date.

pub mod facet;
pub mod ranking;
pub mod resolve;
pub mod series;
pub mod stat_set;

pub use facet::{Facet, series_facets};
pub use ranking::{RankingTable, SourceSeriesRanker};
pub use resolve::{PointStat, TimeSeriesResolver};
pub use series::{FilterCriteria, ObservationTimeSeries, SourceSeries};
pub use stat_set::{StatSet, StatSetRequest, resolve_stat_set};
