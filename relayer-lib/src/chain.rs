use message::ChainId;
use num_bigint::BigUint;
use parking_lot::RwLock;
use time::OffsetDateTime;

/// A height reading taken from a chain listener, together with the moment the
/// listener took it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub height: BigUint,
    pub timestamp: OffsetDateTime,
}

/// A monitored chain as seen by the status endpoint.
///
/// `latest_block` is called on every status request, so implementations must
/// answer from local state and never block on network I/O.
pub trait ChainSource: Send + Sync {
    /// Stable name the chain is registered under.
    fn name(&self) -> &str;

    fn id(&self) -> ChainId;

    /// Current head height and the time it was last observed.
    fn latest_block(&self) -> Observation;
}

/// Head-of-chain slot shared between a listener loop (writer) and the
/// liveness monitor (reader).
#[derive(Debug)]
pub struct ChainHandle {
    name: String,
    id: ChainId,
    latest: RwLock<Observation>,
}

impl ChainHandle {
    /// Starts at height zero, observed now.
    pub fn new(name: impl Into<String>, id: ChainId) -> Self {
        Self {
            name: name.into(),
            id,
            latest: RwLock::new(Observation {
                height: BigUint::default(),
                timestamp: OffsetDateTime::now_utc(),
            }),
        }
    }

    /// Record a head height observed now.
    pub fn update(&self, height: BigUint) {
        self.update_at(height, OffsetDateTime::now_utc());
    }

    pub fn update_at(&self, height: BigUint, timestamp: OffsetDateTime) {
        *self.latest.write() = Observation { height, timestamp };
    }
}

impl ChainSource for ChainHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> ChainId {
        self.id
    }

    fn latest_block(&self) -> Observation {
        self.latest.read().clone()
    }
}
