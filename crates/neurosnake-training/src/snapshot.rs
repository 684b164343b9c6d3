use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{config::EvolutionConfig, genetic::Individual};

/// Saved population for backups and resuming.
///
/// ```json
/// { "generation": 40, "savedAt": "...", "config": { ... }, "individuals": [ ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSnapshot {
    /// Number of generations completed when the snapshot was taken.
    pub generation: usize,
    pub saved_at: DateTime<Utc>,
    pub config: EvolutionConfig,
    pub individuals: Vec<Individual>,
}
