pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Catalog graph contains a cycle: {}.", .cycle.join(" -> "))]
	CyclicGraph { cycle: Vec<String> },
}
