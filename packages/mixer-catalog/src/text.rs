use std::collections::HashSet;

/// Lowercase tokens of `text`, split on every non-alphanumeric character. First occurrence wins
/// when a token repeats.
pub fn tokenize(text: &str) -> Vec<String> {
	let lowered = text.to_lowercase();
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for token in lowered.split(|ch: char| !ch.is_alphanumeric()) {
		if token.is_empty() {
			continue;
		}
		if seen.insert(token) {
			out.push(token.to_string());
		}
	}

	out
}

pub fn normalize_token(token: &str) -> String {
	token.trim().to_lowercase()
}
