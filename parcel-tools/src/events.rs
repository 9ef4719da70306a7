// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Decoded transfer history entries.
//!
//! [`TransferRecord`] is the client-side view of the contract's
//! `TransferSingle`/`TransferBatch` logs. Records are immutable once
//! decoded; the scanner fills in the block timestamp after retrieval.

use alloy::{
    primitives::{Address, B256, U256},
    rpc::types::Log,
    sol,
};
use serde::Serialize;

// Mirrors of the events the collection contract emits.
sol! {
    event TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value);
    event TransferBatch(address indexed operator, address indexed from, address indexed to, uint256[] ids, uint256[] values);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Single,
    Batch,
}

/// One reconstructed transfer. Single transfers carry exactly one id/amount
/// pair; batch transfers carry parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRecord {
    pub kind: TransferKind,
    pub block_number: u64,
    /// Unix seconds of the containing block; zero until the scanner
    /// annotates the record.
    pub timestamp: u64,
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    pub ids: Vec<U256>,
    pub amounts: Vec<U256>,
    pub tx_hash: Option<B256>,
}

impl TransferRecord {
    /// Decodes a raw `TransferSingle` log.
    pub fn from_single_log(log: &Log) -> Result<Self, alloy::sol_types::Error> {
        let decoded = log.log_decode::<TransferSingle>()?;
        let event = decoded.inner.data;
        Ok(Self {
            kind: TransferKind::Single,
            block_number: log.block_number.unwrap_or_default(),
            timestamp: 0,
            operator: event.operator,
            from: event.from,
            to: event.to,
            ids: vec![event.id],
            amounts: vec![event.value],
            tx_hash: log.transaction_hash,
        })
    }

    /// Decodes a raw `TransferBatch` log.
    pub fn from_batch_log(log: &Log) -> Result<Self, alloy::sol_types::Error> {
        let decoded = log.log_decode::<TransferBatch>()?;
        let event = decoded.inner.data;
        Ok(Self {
            kind: TransferKind::Batch,
            block_number: log.block_number.unwrap_or_default(),
            timestamp: 0,
            operator: event.operator,
            from: event.from,
            to: event.to,
            ids: event.ids,
            amounts: event.values,
            tx_hash: log.transaction_hash,
        })
    }

    /// Whether `address` is the sender or the receiver.
    pub fn involves(&self, address: Address) -> bool {
        self.from == address || self.to == address
    }

    /// Whether the transfer touches token `id`.
    pub fn touches_token(&self, id: U256) -> bool {
        self.ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{primitives::LogData, sol_types::SolEvent};

    fn wrap(address: Address, data: LogData, block: u64) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            block_number: Some(block),
            transaction_hash: Some(B256::with_last_byte(0xee)),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_single_transfer_logs() {
        let contract = Address::with_last_byte(0x0c);
        let event = TransferSingle {
            operator: Address::with_last_byte(1),
            from: Address::with_last_byte(2),
            to: Address::with_last_byte(3),
            id: U256::from(7),
            value: U256::from(40),
        };
        let log = wrap(contract, event.encode_log_data(), 12);

        let record = TransferRecord::from_single_log(&log).unwrap();
        assert_eq!(record.kind, TransferKind::Single);
        assert_eq!(record.block_number, 12);
        assert_eq!(record.from, Address::with_last_byte(2));
        assert_eq!(record.ids, vec![U256::from(7)]);
        assert_eq!(record.amounts, vec![U256::from(40)]);
    }

    #[test]
    fn decodes_batch_transfer_logs() {
        let contract = Address::with_last_byte(0x0c);
        let event = TransferBatch {
            operator: Address::with_last_byte(1),
            from: Address::with_last_byte(2),
            to: Address::with_last_byte(3),
            ids: vec![U256::from(1), U256::from(2)],
            values: vec![U256::from(10), U256::from(20)],
        };
        let log = wrap(contract, event.encode_log_data(), 30);

        let record = TransferRecord::from_batch_log(&log).unwrap();
        assert_eq!(record.kind, TransferKind::Batch);
        assert!(record.touches_token(U256::from(2)));
        assert!(!record.touches_token(U256::from(3)));
        assert!(record.involves(Address::with_last_byte(3)));
        assert!(!record.involves(Address::with_last_byte(9)));
    }
}
