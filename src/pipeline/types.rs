use std::time::Duration;

use serde::{Deserialize, Serialize};

/// State of an import batch, published on the coordinator's status channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportStatus {
    Idle,
    Progress {
        current: usize,
        total: usize,
        file_name: String,
    },
    Success {
        imported: usize,
    },
    Error {
        message: String,
    },
}

/// Tunables for the import coordinator.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Simultaneous in-flight items. Balances CPU-bound recognition against
    /// thermal/memory limits on small devices — a constant, not derived.
    pub max_concurrent_items: usize,
    /// Items per chunk; a yield point between chunks keeps large batches
    /// from starving other work.
    pub chunk_size: usize,
    /// How long `Success` stays visible before the channel returns to `Idle`.
    pub idle_reset_delay: Duration,
    /// Confidence recorded on classifier-assigned documents.
    pub default_confidence: f32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_items: 2,
            chunk_size: 50,
            idle_reset_delay: Duration::from_secs(3),
            default_confidence: 0.9,
        }
    }
}

/// Aggregate outcome of one `import_files` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub total: usize,
}

/// Outcome of a single item within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemOutcome {
    Imported,
    Duplicate,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.max_concurrent_items, 2);
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.idle_reset_delay, Duration::from_secs(3));
        assert!((config.default_confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn import_status_serde_is_tagged() {
        let status = ImportStatus::Progress {
            current: 3,
            total: 7,
            file_name: "scan.jpg".into(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"type\":\"Progress\""));
        assert!(json.contains("\"current\":3"));

        let parsed: ImportStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn batch_summary_default_is_zeroed() {
        let summary = BatchSummary::default();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.total, 0);
    }
}
