use crate::chain::{ChainSource, Observation};
use message::ChainId;
use num_bigint::BigUint;
use parking_lot::Mutex;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use std::collections::HashMap;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

/// Last recorded progress for one monitored chain.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    #[schema(value_type = u8)]
    pub chain_id: ChainId,
    /// Decimal string; heights exceed u64 on some chains.
    #[serde_as(as = "DisplayFromStr")]
    #[schema(value_type = String, example = "18293021")]
    pub height: BigUint,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = "date-time")]
    pub last_updated: OffsetDateTime,
}

/// Verdict for a single liveness observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The chain is progressing, or holding steady within the timeout.
    Healthy(ChainStats),
    /// No chain is registered under the requested name.
    NotFound,
    /// The height has not moved for at least the configured timeout.
    Stale {
        chain_id: ChainId,
        elapsed_secs: u64,
        height: BigUint,
    },
    /// The observed height is below the recorded one.
    Regression { previous: BigUint, current: BigUint },
}

struct ChainEntry {
    source: Arc<dyn ChainSource>,
    stats: Mutex<Option<ChainStats>>,
}

/// Tracks per-chain progress and classifies each incoming observation.
///
/// The chain set is fixed at construction and every entry carries its own
/// lock, so concurrent status requests for different chains never contend.
/// Stats are created lazily on the first observation and never removed;
/// Stale and Regression leave them untouched so a later observation can
/// recover to Healthy.
pub struct HealthMonitor {
    block_timeout: Duration,
    chains: HashMap<String, ChainEntry>,
}

impl HealthMonitor {
    /// `block_timeout` applies to every chain and stays fixed for the
    /// monitor's lifetime.
    pub fn new(chains: Vec<Arc<dyn ChainSource>>, block_timeout: Duration) -> Self {
        let chains = chains
            .into_iter()
            .map(|source| {
                let entry = ChainEntry {
                    source,
                    stats: Mutex::new(None),
                };
                (entry.source.name().to_owned(), entry)
            })
            .collect();
        Self {
            block_timeout,
            chains,
        }
    }

    /// Data source registered under `name`, if any.
    pub fn source(&self, name: &str) -> Option<&Arc<dyn ChainSource>> {
        self.chains.get(name).map(|entry| &entry.source)
    }

    pub fn block_timeout(&self) -> Duration {
        self.block_timeout
    }

    /// Classify `observation` against the recorded stats for `name`.
    pub fn classify(&self, name: &str, observation: Observation) -> Classification {
        self.classify_at(name, observation, OffsetDateTime::now_utc())
    }

    /// [`Self::classify`] with an explicit clock reading.
    ///
    /// A first observation for a chain is recorded verbatim and reported
    /// Healthy. After that: a higher height updates the stats, an equal
    /// height is Healthy until `block_timeout` has elapsed since the last
    /// recorded update and Stale from then on (without resetting the clock),
    /// and a lower height is a Regression. A regression is checked before
    /// the timeout when both would apply.
    pub fn classify_at(
        &self,
        name: &str,
        observation: Observation,
        now: OffsetDateTime,
    ) -> Classification {
        let Some(entry) = self.chains.get(name) else {
            return Classification::NotFound;
        };

        let mut slot = entry.stats.lock();
        let Some(stats) = slot.as_mut() else {
            // First observation for this chain, nothing to compare against.
            let stats = ChainStats {
                chain_id: entry.source.id(),
                height: observation.height,
                last_updated: observation.timestamp,
            };
            *slot = Some(stats.clone());
            return Classification::Healthy(stats);
        };

        if observation.height > stats.height {
            stats.height = observation.height;
            stats.last_updated = observation.timestamp;
            return Classification::Healthy(stats.clone());
        }

        if observation.height < stats.height {
            // A decrease points at a broken data source rather than an idle
            // chain, so it outranks the timeout.
            return Classification::Regression {
                previous: stats.height.clone(),
                current: observation.height,
            };
        }

        let elapsed = now - stats.last_updated;
        if elapsed >= self.block_timeout {
            return Classification::Stale {
                chain_id: stats.chain_id,
                elapsed_secs: elapsed.whole_seconds().max(0) as u64,
                height: observation.height,
            };
        }

        Classification::Healthy(stats.clone())
    }
}
