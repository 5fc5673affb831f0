use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

pub mod transfer;

pub use transfer::{Message, TransferPayload};

/// Numeric identifier of a chain as assigned in the relayer configuration.
/// Embedded in every cross-chain message and in checkpoint file names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChainId(pub u8);

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ChainId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl FromStr for ChainId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Opaque 32-byte identifier of the resource a transfer refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceId(pub [u8; 32]);

impl ResourceId {
    /// Left-aligns `src` into a fresh identifier, zero-padding on the right.
    /// Input longer than 32 bytes is truncated.
    pub fn from_slice(src: &[u8]) -> Self {
        let mut id = [0u8; 32];
        let len = src.len().min(32);
        id[..len].copy_from_slice(&src[..len]);
        Self(id)
    }

    pub fn hex(&self) -> String {
        faster_hex::hex_string(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl From<[u8; 32]> for ResourceId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Per-source monotonic sequence number of a transfer message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Nonce(pub u64);

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<Nonce> for num_bigint::BigUint {
    fn from(n: Nonce) -> Self {
        num_bigint::BigUint::from(n.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_resource_id_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let id = ResourceId(bytes);
        assert_eq!(id.hex().len(), 64);
        assert!(id.hex().starts_with("ab"));
        assert!(id.hex().ends_with("01"));
    }

    #[test]
    fn test_resource_id_from_short_slice() {
        let id = ResourceId::from_slice(&[1, 2, 3]);
        assert_eq!(id.0[..3], [1, 2, 3]);
        assert_eq!(id.0[3..], [0u8; 29]);
    }

    #[test]
    fn test_resource_id_from_long_slice() {
        let src = [7u8; 40];
        let id = ResourceId::from_slice(&src);
        assert_eq!(id.0, [7u8; 32]);
    }

    #[test]
    fn test_chain_id_parse_and_display() {
        let id: ChainId = "42".parse().unwrap();
        assert_eq!(id, ChainId(42));
        assert_eq!(id.to_string(), "42");
        assert!("chain".parse::<ChainId>().is_err());
        assert!("300".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_nonce_to_biguint() {
        let nonce = Nonce(12345);
        assert_eq!(BigUint::from(nonce), BigUint::from(12345u64));
    }

    #[test]
    fn test_fungible_transfer_message() {
        let msg = Message::fungible_transfer(
            ChainId(1),
            ChainId(2),
            Nonce(7),
            BigUint::from(1_000u32),
            ResourceId::from_slice(b"token"),
            b"recipient".to_vec(),
        );
        assert_eq!(msg.source, ChainId(1));
        assert_eq!(msg.destination, ChainId(2));
        assert_eq!(msg.kind(), "FungibleTransfer");
        match msg.payload {
            TransferPayload::Fungible { amount, recipient } => {
                assert_eq!(amount, BigUint::from(1_000u32));
                assert_eq!(recipient, b"recipient");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_transfer_kind_names() {
        let rid = ResourceId::default();
        let ack = Message::ack_transfer(ChainId(1), ChainId(2), Nonce(0), rid, vec![]);
        let generic = Message::generic_transfer(ChainId(1), ChainId(2), Nonce(0), rid, vec![]);
        let nft = Message::nonfungible_transfer(
            ChainId(1),
            ChainId(2),
            Nonce(0),
            rid,
            BigUint::from(9u8),
            vec![],
            vec![],
        );
        assert_eq!(ack.kind(), "AckTransfer");
        assert_eq!(generic.kind(), "GenericTransfer");
        assert_eq!(nft.kind(), "NonFungibleTransfer");
    }
}
