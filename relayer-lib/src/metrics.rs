use arc_swap::ArcSwap;
use num_bigint::BigUint;
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use utoipa::ToSchema;

/// A snapshot of one chain's relay counters as simple owned values.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct ChainMetricsSnapshot {
    /// Number of blocks the listener has fully processed
    pub blocks_processed: u64,
    /// Number of votes submitted by the writer
    pub votes_submitted: u64,
    /// Latest block height fully processed
    #[serde_as(as = "DisplayFromStr")]
    #[schema(value_type = String)]
    pub latest_processed_block: BigUint,
    /// Latest block height reported by the chain
    #[serde_as(as = "DisplayFromStr")]
    #[schema(value_type = String)]
    pub latest_known_block: BigUint,
}

impl Display for ChainMetricsSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Blocks processed: {}", self.blocks_processed)?;
        writeln!(f, "  Votes submitted: {}", self.votes_submitted)?;
        writeln!(
            f,
            "  Latest processed block: {}",
            self.latest_processed_block
        )?;
        writeln!(f, "  Latest known block: {}", self.latest_known_block)
    }
}

/// Per-chain counters reported by the relayer's processing loops.
///
/// Write-only from the core's point of view: nothing in the relayer reads
/// these back for decisions, they exist for the status endpoint and logs.
#[derive(Debug, Default)]
pub struct ChainMetrics {
    /// Number of blocks the listener has fully processed
    pub blocks_processed: AtomicU64,
    /// Number of votes submitted by the writer
    pub votes_submitted: AtomicU64,
    /// Latest block height fully processed
    pub latest_processed_block: ArcSwap<BigUint>,
    /// Latest block height reported by the chain
    pub latest_known_block: ArcSwap<BigUint>,
}

impl ChainMetrics {
    /// Create a new metrics instance with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot of the current counters
    pub fn snapshot(&self) -> ChainMetricsSnapshot {
        ChainMetricsSnapshot {
            blocks_processed: self.blocks_processed.load(Ordering::Relaxed),
            votes_submitted: self.votes_submitted.load(Ordering::Relaxed),
            latest_processed_block: self.latest_processed_block.load().as_ref().clone(),
            latest_known_block: self.latest_known_block.load().as_ref().clone(),
        }
    }

    /// Increment blocks processed count by 1
    pub fn increment_blocks_processed(&self) {
        self.blocks_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment votes submitted count by 1
    pub fn increment_votes_submitted(&self) {
        self.votes_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Set latest processed block height
    pub fn set_latest_processed_block(&self, height: BigUint) {
        self.latest_processed_block.store(Arc::new(height));
    }

    /// Set latest known block height
    pub fn set_latest_known_block(&self, height: BigUint) {
        self.latest_known_block.store(Arc::new(height));
    }
}

/// Shared metrics instance wrapped in Arc for use across multiple workers
pub type SharedMetrics = Arc<ChainMetrics>;

/// Create a new shared metrics instance
pub fn create_shared_metrics() -> SharedMetrics {
    Arc::new(ChainMetrics::new())
}

/// Counters for a fixed set of chains, keyed by chain name.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    chains: BTreeMap<String, SharedMetrics>,
}

impl MetricsRegistry {
    pub fn new<I, S>(chain_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chains = chain_names
            .into_iter()
            .map(|name| (name.into(), create_shared_metrics()))
            .collect();
        Self { chains }
    }

    /// Counters for `name`, if the chain is registered.
    pub fn chain(&self, name: &str) -> Option<SharedMetrics> {
        self.chains.get(name).cloned()
    }

    /// Snapshot every chain's counters.
    pub fn snapshot(&self) -> BTreeMap<String, ChainMetricsSnapshot> {
        self.chains
            .iter()
            .map(|(name, metrics)| (name.clone(), metrics.snapshot()))
            .collect()
    }
}
