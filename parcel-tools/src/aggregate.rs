// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Summary statistics over reconstructed transfer history.

use std::collections::HashSet;

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::events::TransferRecord;

/// Aggregate view of a batch of transfers.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct TransferSummary {
    pub transfer_count: usize,
    /// Distinct senders and receivers, the zero address excluded (it only
    /// marks mints and burns).
    pub unique_participants: usize,
    /// Sum of all transferred amounts, batch entries included.
    pub total_volume: U256,
    pub first_timestamp: Option<u64>,
    pub last_timestamp: Option<u64>,
}

/// Single pass over `events`. An empty slice yields a zeroed summary.
pub fn summarize(events: &[TransferRecord]) -> TransferSummary {
    let mut participants: HashSet<Address> = HashSet::new();
    let mut total_volume = U256::ZERO;
    let mut first_timestamp: Option<u64> = None;
    let mut last_timestamp: Option<u64> = None;

    for event in events {
        for address in [event.from, event.to] {
            if !address.is_zero() {
                participants.insert(address);
            }
        }
        for amount in &event.amounts {
            total_volume += *amount;
        }
        first_timestamp = Some(first_timestamp.map_or(event.timestamp, |t| t.min(event.timestamp)));
        last_timestamp = Some(last_timestamp.map_or(event.timestamp, |t| t.max(event.timestamp)));
    }

    TransferSummary {
        transfer_count: events.len(),
        unique_participants: participants.len(),
        total_volume,
        first_timestamp,
        last_timestamp,
    }
}

/// Transfers touching token `id` (batch transfers count when their id set
/// contains it).
pub fn filter_by_token(events: &[TransferRecord], id: U256) -> Vec<TransferRecord> {
    events
        .iter()
        .filter(|event| event.touches_token(id))
        .cloned()
        .collect()
}

/// Transfers sent or received by `address`.
pub fn filter_by_address(events: &[TransferRecord], address: Address) -> Vec<TransferRecord> {
    events
        .iter()
        .filter(|event| event.involves(address))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TransferKind;

    fn transfer(from: Address, to: Address, ids: Vec<u64>, amounts: Vec<u64>, timestamp: u64) -> TransferRecord {
        TransferRecord {
            kind: if ids.len() == 1 {
                TransferKind::Single
            } else {
                TransferKind::Batch
            },
            block_number: timestamp / 10,
            timestamp,
            operator: from,
            from,
            to,
            ids: ids.into_iter().map(U256::from).collect(),
            amounts: amounts.into_iter().map(U256::from).collect(),
            tx_hash: None,
        }
    }

    #[test]
    fn empty_history_summarizes_to_zeroes() {
        let summary = summarize(&[]);
        assert_eq!(summary, TransferSummary::default());
        assert_eq!(summary.first_timestamp, None);
    }

    #[test]
    fn counts_participants_volume_and_date_range() {
        let a = Address::with_last_byte(1);
        let b = Address::with_last_byte(2);
        let c = Address::with_last_byte(3);
        let events = vec![
            // A mint: the zero sender must not count as a participant.
            transfer(Address::ZERO, a, vec![1], vec![100], 1_000),
            transfer(a, b, vec![1], vec![40], 2_000),
            transfer(b, c, vec![1, 2], vec![10, 5], 3_000),
        ];

        let summary = summarize(&events);
        assert_eq!(summary.transfer_count, 3);
        assert_eq!(summary.unique_participants, 3);
        assert_eq!(summary.total_volume, U256::from(155));
        assert_eq!(summary.first_timestamp, Some(1_000));
        assert_eq!(summary.last_timestamp, Some(3_000));
    }

    #[test]
    fn token_filter_looks_inside_batches() {
        let a = Address::with_last_byte(1);
        let b = Address::with_last_byte(2);
        let events = vec![
            transfer(a, b, vec![1], vec![1], 0),
            transfer(a, b, vec![2, 3], vec![1, 1], 0),
            transfer(a, b, vec![4], vec![1], 0),
        ];

        let hits = filter_by_token(&events, U256::from(3));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, TransferKind::Batch);
    }

    #[test]
    fn address_filter_matches_either_side() {
        let a = Address::with_last_byte(1);
        let b = Address::with_last_byte(2);
        let c = Address::with_last_byte(3);
        let events = vec![
            transfer(a, b, vec![1], vec![1], 0),
            transfer(b, c, vec![1], vec![1], 0),
            transfer(c, a, vec![1], vec![1], 0),
        ];

        assert_eq!(filter_by_address(&events, a).len(), 2);
        assert_eq!(filter_by_address(&events, b).len(), 2);
        assert_eq!(filter_by_address(&events, Address::with_last_byte(9)).len(), 0);
    }
}
