use crate::{ChainId, Nonce, ResourceId};
use num_bigint::BigUint;

/// Payload of a cross-chain transfer, one variant per transfer kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPayload {
    Fungible {
        amount: BigUint,
        recipient: Vec<u8>,
    },
    NonFungible {
        token_id: BigUint,
        recipient: Vec<u8>,
        metadata: Vec<u8>,
    },
    Generic {
        metadata: Vec<u8>,
    },
    Ack {
        data: Vec<u8>,
    },
}

impl TransferPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            TransferPayload::Fungible { .. } => "FungibleTransfer",
            TransferPayload::NonFungible { .. } => "NonFungibleTransfer",
            TransferPayload::Generic { .. } => "GenericTransfer",
            TransferPayload::Ack { .. } => "AckTransfer",
        }
    }
}

/// Generic format used to communicate a transfer between chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: ChainId,
    pub destination: ChainId,
    pub nonce: Nonce,
    pub resource_id: ResourceId,
    pub payload: TransferPayload,
}

impl Message {
    pub fn fungible_transfer(
        source: ChainId,
        destination: ChainId,
        nonce: Nonce,
        amount: BigUint,
        resource_id: ResourceId,
        recipient: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            nonce,
            resource_id,
            payload: TransferPayload::Fungible { amount, recipient },
        }
    }

    pub fn nonfungible_transfer(
        source: ChainId,
        destination: ChainId,
        nonce: Nonce,
        resource_id: ResourceId,
        token_id: BigUint,
        recipient: Vec<u8>,
        metadata: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            nonce,
            resource_id,
            payload: TransferPayload::NonFungible {
                token_id,
                recipient,
                metadata,
            },
        }
    }

    pub fn generic_transfer(
        source: ChainId,
        destination: ChainId,
        nonce: Nonce,
        resource_id: ResourceId,
        metadata: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            nonce,
            resource_id,
            payload: TransferPayload::Generic { metadata },
        }
    }

    pub fn ack_transfer(
        source: ChainId,
        destination: ChainId,
        nonce: Nonce,
        resource_id: ResourceId,
        data: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            nonce,
            resource_id,
            payload: TransferPayload::Ack { data },
        }
    }

    /// Transfer kind name as carried on the wire by the bridge contracts.
    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}
