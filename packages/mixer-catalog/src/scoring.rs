use crate::graph::CatalogNode;

/// Score given to ids that encode no constraints at all.
pub const UNCONSTRAINED_SCORE: u32 = 30;

/// Supplies the specificity score used to order search results. Lower scores rank first.
pub trait SpecificityScorer
where
	Self: Send + Sync,
{
	fn score(&self, id: &str, node: &CatalogNode) -> u32;
}

impl<F> SpecificityScorer for F
where
	F: Fn(&str, &CatalogNode) -> u32 + Send + Sync,
{
	fn score(&self, id: &str, node: &CatalogNode) -> u32 {
		self(id, node)
	}
}

/// Counts the `_`-separated segments of the id, e.g. `Count_Person_Female` scores 3.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdSegmentSpecificity;
impl SpecificityScorer for IdSegmentSpecificity {
	fn score(&self, id: &str, _: &CatalogNode) -> u32 {
		match id.split('_').count() {
			1 => UNCONSTRAINED_SCORE,
			segments => u32::try_from(segments).unwrap_or(u32::MAX),
		}
	}
}

/// The score declared on the node, or [`IdSegmentSpecificity`] when none is declared.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredSpecificity;
impl SpecificityScorer for DeclaredSpecificity {
	fn score(&self, id: &str, node: &CatalogNode) -> u32 {
		node.declared_specificity().unwrap_or_else(|| IdSegmentSpecificity.score(id, node))
	}
}
