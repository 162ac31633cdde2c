use vitalproxy_core::domain::Metric;
use vitalproxy_core::error::{Result, VitalError};

use crate::config::MetricsStoreSection;

use super::memory::MemoryMetricStore;
use super::sqlite::SqliteMetricStore;

/// Which backend is active. Chosen once at boot, never re-probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTier {
    Durable,
    Memory,
    Disabled,
}

impl StoreTier {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreTier::Durable => "durable",
            StoreTier::Memory => "memory",
            StoreTier::Disabled => "disabled",
        }
    }
}

/// Closed set of metric backends.
#[derive(Debug)]
pub enum MetricStore {
    Durable(SqliteMetricStore),
    Memory(MemoryMetricStore),
    Disabled,
}

impl MetricStore {
    /// Storage cascade: durable (if configured and reachable) -> bounded
    /// memory (if enabled) -> disabled.
    pub async fn select(cfg: &MetricsStoreSection) -> Self {
        if let Some(url) = cfg.url.as_deref() {
            match SqliteMetricStore::connect(url).await {
                Ok(store) => {
                    tracing::info!(tier = "durable", "metrics store connected");
                    return MetricStore::Durable(store);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "metrics store unreachable");
                }
            }
        }

        if cfg.memory_fallback {
            tracing::warn!(
                tier = "memory",
                capacity = cfg.memory_capacity,
                "using in-memory metrics buffer (not durable)"
            );
            MetricStore::Memory(MemoryMetricStore::new(cfg.memory_capacity))
        } else {
            tracing::warn!(tier = "disabled", "no metrics store; metrics will only be logged");
            MetricStore::Disabled
        }
    }

    pub fn tier(&self) -> StoreTier {
        match self {
            MetricStore::Durable(_) => StoreTier::Durable,
            MetricStore::Memory(_) => StoreTier::Memory,
            MetricStore::Disabled => StoreTier::Disabled,
        }
    }

    pub async fn insert(&self, metric: Metric) -> Result<()> {
        match self {
            MetricStore::Durable(db) => db.insert(metric).await,
            MetricStore::Memory(buf) => {
                if buf.push(metric) {
                    Ok(())
                } else {
                    Err(VitalError::Internal("metrics buffer lock poisoned".into()))
                }
            }
            MetricStore::Disabled => Err(VitalError::StoreUnavailable),
        }
    }

    /// Newest first. `Disabled` yields an empty list.
    pub async fn list(&self) -> Result<Vec<Metric>> {
        match self {
            MetricStore::Durable(db) => db.list().await,
            MetricStore::Memory(buf) => Ok(buf.list()),
            MetricStore::Disabled => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(url: Option<String>, memory_fallback: bool) -> MetricsStoreSection {
        MetricsStoreSection {
            url,
            memory_fallback,
            memory_capacity: 1000,
        }
    }

    #[tokio::test]
    async fn reachable_durable_store_wins() {
        let store = MetricStore::select(&section(Some("sqlite::memory:".into()), true)).await;
        assert_eq!(store.tier(), StoreTier::Durable);
    }

    #[tokio::test]
    async fn unreachable_durable_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("no/such/dir.db").display());
        let store = MetricStore::select(&section(Some(url), true)).await;
        assert_eq!(store.tier(), StoreTier::Memory);
    }

    #[tokio::test]
    async fn unsupported_scheme_counts_as_unreachable() {
        let store =
            MetricStore::select(&section(Some("mongodb://localhost:27017".into()), false)).await;
        assert_eq!(store.tier(), StoreTier::Disabled);
    }

    #[tokio::test]
    async fn disabled_store_rejects_writes_and_lists_empty() {
        let store = MetricStore::select(&section(None, false)).await;
        assert_eq!(store.tier(), StoreTier::Disabled);
        let m = Metric::new(
            vitalproxy_core::domain::MetricStatus::Success,
            std::time::Duration::from_millis(3),
        );
        assert!(matches!(store.insert(m).await, Err(VitalError::StoreUnavailable)));
        assert!(store.list().await.unwrap().is_empty());
    }
}
