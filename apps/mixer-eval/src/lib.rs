use std::{
	collections::{BTreeMap, HashSet},
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing_subscriber::EnvFilter;

use mixer_catalog::{
	CatalogGraph, CatalogHandle, CatalogIndexer, SearchQueryEngine, SearchResults, text,
};
use mixer_config::Config;
use mixer_domain::{
	Facet, FilterCriteria, ObservationTimeSeries, PointStat, RankingTable, TimeSeriesResolver,
	series_facets,
};

#[derive(Debug, Parser)]
#[command(
	version = mixer_cli::VERSION,
	rename_all = "kebab",
	styles = mixer_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Rank catalog variables and groups for a free-text query.
	Search {
		#[arg(long, value_name = "FILE")]
		catalog: Option<PathBuf>,
		#[arg(long, short = 'q')]
		query: String,
	},
	/// Print the parent groups of a catalog id.
	Ancestors {
		#[arg(long, value_name = "FILE")]
		catalog: Option<PathBuf>,
		#[arg(long)]
		id: String,
	},
	/// Score search quality against a labeled query set.
	Eval {
		#[arg(long, value_name = "FILE")]
		catalog: Option<PathBuf>,
		#[arg(long, short = 'd', value_name = "FILE")]
		dataset: PathBuf,
		#[arg(long, value_name = "N")]
		top_k: Option<u32>,
	},
	/// Filter, rank, and resolve the source series of one variable and entity.
	Resolve {
		#[arg(long, value_name = "FILE")]
		series: PathBuf,
		/// Empty or absent resolves the latest value.
		#[arg(long)]
		date: Option<String>,
		#[arg(long)]
		measurement_method: Option<String>,
		#[arg(long)]
		unit: Option<String>,
		#[arg(long)]
		observation_period: Option<String>,
	},
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	top_k: Option<u32>,
	queries: Vec<EvalQuery>,
}

#[derive(Debug, Deserialize)]
struct EvalQuery {
	id: Option<String>,
	query: String,
	expected_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SearchOutput {
	query: String,
	tokens: Vec<String>,
	catalog_version: u64,
	latency_ms: f64,
	#[serde(flatten)]
	results: SearchResults,
}

#[derive(Debug, Serialize)]
struct AncestorsOutput {
	id: String,
	indexed: bool,
	parents: Vec<String>,
	ancestors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
	date: String,
	criteria: FilterCriteria,
	point: Option<PointStat>,
	provenance_url: String,
	resolved_values: BTreeMap<String, f64>,
	ranked_providers: Vec<String>,
	facets: Vec<Facet>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: EvalDatasetInfo,
	settings: EvalSettings,
	summary: EvalSummary,
	queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
struct EvalDatasetInfo {
	name: String,
	query_count: usize,
}

#[derive(Debug, Serialize)]
struct EvalSettings {
	config_path: String,
	catalog_path: String,
	catalog_version: u64,
	include_groups: bool,
	top_k: u32,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	avg_recall_at_k: f64,
	avg_precision_at_k: f64,
	mean_rr: f64,
	mean_ndcg: f64,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
struct QueryReport {
	id: String,
	query: String,
	expected_count: usize,
	retrieved_count: usize,
	relevant_count: usize,
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	latency_ms: f64,
	expected_ids: Vec<String>,
	retrieved_ids: Vec<String>,
}

struct Metrics {
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	relevant_count: usize,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = mixer_config::load(&args.config)?;
	let filter = log_filter(&config.service.log_level);

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	match args.command {
		Command::Search { catalog, query } => {
			let path = catalog_path(&config, catalog.as_deref())?;
			let handle = load_catalog(&config, path)?;
			let snapshot = handle.current();
			let engine = SearchQueryEngine::from_config(&config.search);
			let started = Instant::now();
			let results = engine.search_text(&query, &snapshot.index);
			let latency_ms = elapsed_ms(started);

			print_json(&SearchOutput {
				tokens: text::tokenize(&query),
				query,
				catalog_version: snapshot.version,
				latency_ms,
				results,
			})
		},
		Command::Ancestors { catalog, id } => {
			let path = catalog_path(&config, catalog.as_deref())?;
			let handle = load_catalog(&config, path)?;
			let snapshot = handle.current();

			print_json(&AncestorsOutput {
				indexed: snapshot.index.contains(&id),
				parents: snapshot.parents.parents(&id).to_vec(),
				ancestors: snapshot.parents.ancestors(&id),
				id,
			})
		},
		Command::Eval { catalog, dataset, top_k } => {
			let path = catalog_path(&config, catalog.as_deref())?;
			let dataset = load_dataset(&dataset)?;
			let output = eval_catalog(&args.config, &config, path, &dataset, top_k)?;

			print_json(&output)
		},
		Command::Resolve { series, date, measurement_method, unit, observation_period } => {
			let series: ObservationTimeSeries = load_json(&series)?;
			let criteria = FilterCriteria { measurement_method, unit, observation_period };

			print_json(&resolve_series(&config, series, criteria, date.unwrap_or_default()))
		},
	}
}

/// Filter for `service.log_level`, or `info` when the directive does not parse.
fn log_filter(level: &str) -> EnvFilter {
	EnvFilter::try_new(level).unwrap_or_else(|err| {
		eprintln!("Invalid service.log_level {level:?}: {err}. Falling back to info.");

		EnvFilter::new("info")
	})
}

fn catalog_path<'a>(
	config: &'a Config,
	explicit: Option<&'a Path>,
) -> color_eyre::Result<&'a Path> {
	explicit
		.or(config.catalog.path.as_deref())
		.ok_or_else(|| eyre::eyre!("--catalog is required when catalog.path is not configured."))
}

fn load_json<T>(path: &Path) -> color_eyre::Result<T>
where
	T: DeserializeOwned,
{
	let raw = fs::read_to_string(path)?;

	Ok(serde_json::from_str(&raw)?)
}

fn load_catalog(config: &Config, path: &Path) -> color_eyre::Result<CatalogHandle> {
	let graph: CatalogGraph = load_json(path)?;
	let handle = CatalogHandle::empty();
	let version = handle.rebuild(&CatalogIndexer::from_config(&config.catalog), &graph)?;

	tracing::info!(path = %path.display(), nodes = graph.len(), version, "Catalog loaded.");

	Ok(handle)
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let dataset: EvalDataset = load_json(path)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: Serialize,
{
	let json = serde_json::to_string_pretty(value)?;

	println!("{json}");

	Ok(())
}

fn elapsed_ms(started: Instant) -> f64 {
	started.elapsed().as_secs_f64() * 1_000.0
}

fn resolve_series(
	config: &Config,
	mut series: ObservationTimeSeries,
	criteria: FilterCriteria,
	date: String,
) -> ResolveOutput {
	let table = RankingTable::from_config(&config.ranking);
	let resolver = TimeSeriesResolver::new(&table);
	let point = resolver.point_at(&series, &criteria, &date);
	let facets = series_facets(resolver.ranker(), &series, &criteria);

	resolver.ranker().filter_and_rank(&mut series, &criteria);

	if point.is_none() {
		tracing::info!(date = %date, "No series holds a value for the requested date.");
	}

	ResolveOutput {
		date,
		criteria,
		point,
		ranked_providers: series
			.source_series
			.iter()
			.map(|source| source.provider.clone())
			.collect(),
		provenance_url: series.provenance_url,
		resolved_values: series.resolved_values,
		facets,
	}
}

fn eval_catalog(
	config_path: &Path,
	config: &Config,
	catalog_path: &Path,
	dataset: &EvalDataset,
	top_k: Option<u32>,
) -> color_eyre::Result<EvalOutput> {
	let handle = load_catalog(config, catalog_path)?;
	let snapshot = handle.current();
	let top_k = top_k.or(dataset.top_k).unwrap_or(config.search.max_results).max(1);
	let k = usize::try_from(top_k)?;
	let min_token_chars = usize::try_from(config.search.min_token_chars)?;
	let engine = SearchQueryEngine::new(k, min_token_chars);
	let mut reports = Vec::with_capacity(dataset.queries.len());
	let mut latencies_ms = Vec::with_capacity(dataset.queries.len());

	for (index, query) in dataset.queries.iter().enumerate() {
		let expected: HashSet<String> = query.expected_ids.iter().cloned().collect();
		let started = Instant::now();
		let results = engine.search_text(&query.query, &snapshot.index);
		let latency_ms = elapsed_ms(started);
		let mut retrieved = unique_ids(
			results.variables.iter().chain(&results.groups).map(|entity| entity.id.clone()),
		);

		retrieved.truncate(k);

		let metrics = compute_metrics(&retrieved, &expected);

		tracing::debug!(query = %query.query, retrieved = retrieved.len(), "Eval query finished.");

		reports.push(QueryReport {
			id: query.id.clone().unwrap_or_else(|| format!("q{}", index + 1)),
			query: query.query.clone(),
			expected_count: expected.len(),
			retrieved_count: retrieved.len(),
			relevant_count: metrics.relevant_count,
			recall_at_k: metrics.recall_at_k,
			precision_at_k: metrics.precision_at_k,
			rr: metrics.rr,
			ndcg: metrics.ndcg,
			latency_ms,
			expected_ids: query.expected_ids.clone(),
			retrieved_ids: retrieved,
		});

		latencies_ms.push(latency_ms);
	}

	let summary = summarize(&reports, &latencies_ms);

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "eval".to_string()),
			query_count: reports.len(),
		},
		settings: EvalSettings {
			config_path: config_path.display().to_string(),
			catalog_path: catalog_path.display().to_string(),
			catalog_version: snapshot.version,
			include_groups: config.catalog.include_groups,
			top_k,
		},
		summary,
		queries: reports,
	})
}

fn unique_ids<I>(iter: I) -> Vec<String>
where
	I: Iterator<Item = String>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for id in iter {
		if seen.insert(id.clone()) {
			out.push(id);
		}
	}

	out
}

fn compute_metrics(retrieved: &[String], expected: &HashSet<String>) -> Metrics {
	let expected_count = expected.len();
	let mut relevant_count = 0_usize;
	let mut dcg = 0.0_f64;
	let mut first_hit: Option<usize> = None;

	for (idx, id) in retrieved.iter().enumerate() {
		if !expected.contains(id) {
			continue;
		}

		let rank = idx + 1;

		relevant_count += 1;
		dcg += 1.0 / (rank as f64 + 1.0).log2();

		if first_hit.is_none() {
			first_hit = Some(rank);
		}
	}

	let rr = first_hit.map_or(0.0, |rank| 1.0 / rank as f64);
	let idcg: f64 = (1..=expected_count.min(retrieved.len()))
		.map(|rank| 1.0 / (rank as f64 + 1.0).log2())
		.sum();
	let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };
	let precision_at_k =
		if retrieved.is_empty() { 0.0 } else { relevant_count as f64 / retrieved.len() as f64 };
	let recall_at_k =
		if expected_count == 0 { 0.0 } else { relevant_count as f64 / expected_count as f64 };

	Metrics { recall_at_k, precision_at_k, rr, ndcg, relevant_count }
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(f64::total_cmp);

	EvalSummary {
		avg_recall_at_k: reports.iter().map(|r| r.recall_at_k).sum::<f64>() / count,
		avg_precision_at_k: reports.iter().map(|r| r.precision_at_k).sum::<f64>() / count,
		mean_rr: reports.iter().map(|r| r.rr).sum::<f64>() / count,
		mean_ndcg: reports.iter().map(|r| r.ndcg).sum::<f64>() / count,
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}

#[cfg(test)]
mod tests {
	use tracing_subscriber::filter::LevelFilter;

	use super::*;

	fn ids(raw: &[&str]) -> Vec<String> {
		raw.iter().map(|id| id.to_string()).collect()
	}

	#[test]
	fn metrics_reward_early_hits() {
		let expected: HashSet<String> =
			ids(&["Count_Person", "Median_Age_Person"]).into_iter().collect();
		let metrics =
			compute_metrics(&ids(&["Count_Person", "dc/g/Root", "Median_Age_Person"]), &expected);

		assert_eq!(metrics.relevant_count, 2);
		assert!((metrics.recall_at_k - 1.0).abs() < 1e-12);
		assert!((metrics.precision_at_k - 2.0 / 3.0).abs() < 1e-12);
		assert!((metrics.rr - 1.0).abs() < 1e-12);

		let ideal = 1.0 + 1.0 / 3.0_f64.log2();
		let actual = 1.0 + 1.0 / 4.0_f64.log2();

		assert!((metrics.ndcg - actual / ideal).abs() < 1e-12, "Unexpected ndcg: {}", metrics.ndcg);
	}

	#[test]
	fn metrics_without_hits_are_zero() {
		let expected: HashSet<String> = ids(&["Count_Person"]).into_iter().collect();
		let metrics = compute_metrics(&[], &expected);

		assert_eq!(metrics.relevant_count, 0);
		assert_eq!(metrics.rr, 0.0);
		assert_eq!(metrics.ndcg, 0.0);
		assert_eq!(metrics.precision_at_k, 0.0);
		assert_eq!(metrics.recall_at_k, 0.0);
	}

	#[test]
	fn percentile_interpolates_between_ranks() {
		let values = [10.0, 20.0, 30.0, 40.0];

		assert_eq!(percentile(&values, 0.0), 10.0);
		assert_eq!(percentile(&values, 1.0), 40.0);
		assert!((percentile(&values, 0.5) - 25.0).abs() < 1e-12);
		assert_eq!(percentile(&[], 0.5), 0.0);
	}

	#[test]
	fn unparsable_log_level_falls_back_to_info() {
		assert_eq!(log_filter("mixer=[[[bogus").max_level_hint(), Some(LevelFilter::INFO));
		assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
	}

	#[test]
	fn unique_ids_keep_first_occurrence() {
		let out = unique_ids(ids(&["b", "a", "b", "c", "a"]).into_iter());

		assert_eq!(out, ids(&["b", "a", "c"]));
	}
}
