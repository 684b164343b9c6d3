use neurosnake_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::genetic::Individual;

/// Population-wide statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub fitness: DescriptiveStats,
    pub length: DescriptiveStats,
    pub moves: DescriptiveStats,
}

/// Result of one [`Evolution::evolve`](crate::evolution::Evolution::evolve) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    /// 1-based generation number, continuing across resumes.
    pub generation: usize,
    /// The generation's best individual as evaluated, before crossover and
    /// mutation.
    pub best_individual: Individual,
    pub time_spent_seconds: f64,
    pub stats: GenerationStats,
}
