mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Catalog, Config, Ranking, RankingEntry, Search, Service};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.search.min_token_chars == 0 {
		return Err(Error::Validation {
			message: "search.min_token_chars must be greater than zero.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for entry in &cfg.ranking.entries {
		if entry.provider.trim().is_empty() {
			return Err(Error::Validation {
				message: "ranking.entries.provider must be non-empty.".to_string(),
			});
		}
		if !seen.insert((entry.provider.as_str(), entry.measurement_method.as_str())) {
			return Err(Error::Validation {
				message: format!(
					"ranking.entries contains a duplicate entry for provider {} and measurement_method {:?}.",
					entry.provider, entry.measurement_method
				),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.catalog.path.as_deref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.catalog.path = None;
	}

	for entry in &mut cfg.ranking.entries {
		let provider = entry.provider.trim();

		if provider.len() != entry.provider.len() {
			entry.provider = provider.to_string();
		}

		let method = entry.measurement_method.trim();

		if method.len() != entry.measurement_method.len() {
			entry.measurement_method = method.to_string();
		}
	}
}
