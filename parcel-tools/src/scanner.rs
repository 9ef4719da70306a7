// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Chunked historical transfer scanning.
//!
//! Providers cap how many blocks one `eth_getLogs` query may span, and the
//! cap differs per provider. The scanner walks a block range in fixed-size
//! chunks and reacts to "range too large" rejections by re-walking the same
//! sub-range with the chunk size divided by ten (never below
//! [`MIN_CHUNK_SIZE`]). Sub-ranges that keep failing are skipped rather
//! than aborting the scan; they are listed in [`ScanReport::skipped`] so
//! callers can tell a clean scan from a partial one.
//!
//! Queries are strictly sequential with a fixed pause between successful
//! chunks, and each retrieved record is annotated with its block timestamp
//! before the final stable sort by timestamp.

use std::{cmp::min, collections::HashMap, fmt, future::Future, pin::Pin, time::Duration};

use alloy::{providers::Provider, rpc::types::Filter, sol_types::SolEvent};
use log::{debug, warn};

use crate::{
    error::{Error, Result},
    events::{TransferBatch, TransferKind, TransferRecord, TransferSingle},
};

/// Blocks per `eth_getLogs` query until the provider objects.
pub const DEFAULT_CHUNK_SIZE: u64 = 100;
/// Floor for the divide-by-ten chunk reduction.
pub const MIN_CHUNK_SIZE: u64 = 10;
/// How far back a scan reaches when no start block is given.
pub const DEFAULT_LOOKBACK: u64 = 100_000;

/// Why a range query failed, as far as the retry policy cares.
#[derive(Debug)]
pub enum SourceError {
    /// The source rejected the span as too large.
    RangeTooLarge,
    /// Any other failure.
    Other(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RangeTooLarge => write!(f, "block range too large"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Where transfer history comes from. The production implementation is
/// [`RpcSource`]; tests drive the chunking policy through synthetic sources.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Current tip of the chain.
    async fn tip(&self) -> Result<u64, SourceError>;

    /// Decoded transfers of one kind within an inclusive block range.
    async fn transfers(
        &self,
        kind: TransferKind,
        from: u64,
        to: u64,
    ) -> Result<Vec<TransferRecord>, SourceError>;

    /// Wall-clock timestamp (unix seconds) of a block.
    async fn block_timestamp(&self, number: u64) -> Result<u64, SourceError>;
}

/// [`EventSource`] over a live JSON-RPC provider, filtered to one contract.
pub struct RpcSource<P> {
    provider: P,
    contract: alloy::primitives::Address,
}

impl<P: Provider> RpcSource<P> {
    pub fn new(provider: P, contract: alloy::primitives::Address) -> Self {
        Self { provider, contract }
    }

    /// Sorts a provider failure into the retry taxonomy. Providers phrase
    /// the range cap differently, so this matches on the usual wordings.
    fn classify(err: alloy::transports::RpcError<alloy::transports::TransportErrorKind>) -> SourceError {
        if let Some(payload) = err.as_error_resp() {
            let message = payload.message.to_lowercase();
            if message.contains("block range")
                || message.contains("too large")
                || message.contains("too many")
                || message.contains("limit exceeded")
                || payload.code == -32005
            {
                return SourceError::RangeTooLarge;
            }
        }
        SourceError::Other(err.to_string())
    }
}

impl<P: Provider> EventSource for RpcSource<P> {
    async fn tip(&self) -> Result<u64, SourceError> {
        self.provider.get_block_number().await.map_err(Self::classify)
    }

    async fn transfers(
        &self,
        kind: TransferKind,
        from: u64,
        to: u64,
    ) -> Result<Vec<TransferRecord>, SourceError> {
        let signature = match kind {
            TransferKind::Single => TransferSingle::SIGNATURE_HASH,
            TransferKind::Batch => TransferBatch::SIGNATURE_HASH,
        };
        let filter = Filter::new()
            .address(self.contract)
            .event_signature(signature)
            .from_block(from)
            .to_block(to);
        let logs = self.provider.get_logs(&filter).await.map_err(Self::classify)?;

        let mut records = Vec::with_capacity(logs.len());
        for log in &logs {
            let decoded = match kind {
                TransferKind::Single => TransferRecord::from_single_log(log),
                TransferKind::Batch => TransferRecord::from_batch_log(log),
            };
            match decoded {
                Ok(record) => records.push(record),
                // A log matching the signature topic but not the ABI is
                // not ours to interpret; drop it and keep scanning.
                Err(err) => warn!("undecodable log in block {:?}: {err}", log.block_number),
            }
        }
        Ok(records)
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, SourceError> {
        let block = self
            .provider
            .get_block_by_number(number.into())
            .await
            .map_err(Self::classify)?
            .ok_or_else(|| SourceError::Other(format!("block {number} not found")))?;
        Ok(block.header.timestamp)
    }
}

/// Scan parameters. `from_block: None` bounds the scan to the most recent
/// `lookback` blocks instead of the whole history.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
    pub chunk_size: u64,
    pub lookback: u64,
    /// Pause between successful chunk queries, for provider rate limits.
    pub throttle: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            from_block: None,
            to_block: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            lookback: DEFAULT_LOOKBACK,
            throttle: Duration::from_millis(200),
        }
    }
}

/// Everything one scan produced. `events` is sorted by block timestamp,
/// stable with respect to retrieval order on ties.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub events: Vec<TransferRecord>,
    /// Inclusive sub-ranges abandoned after the retry policy gave up.
    pub skipped: Vec<(u64, u64)>,
}

impl ScanReport {
    /// Whether the scan covered its whole range.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Walks `[start, end]` per the retry policy and returns the time-ordered
/// transfer history. Query failures never surface here; at worst the report
/// lists skipped sub-ranges.
pub async fn scan<S: EventSource>(source: &S, config: &ScanConfig) -> Result<ScanReport> {
    let tip = source
        .tip()
        .await
        .map_err(|err| Error::Source(err.to_string()))?;
    let end = config.to_block.unwrap_or(tip);
    let start = config
        .from_block
        .unwrap_or_else(|| end.saturating_sub(config.lookback));
    if start > end {
        return Err(Error::InvalidRange { start, end });
    }

    let mut report = ScanReport::default();
    let chunk = config.chunk_size.max(MIN_CHUNK_SIZE);
    debug!("scanning blocks {start}..={end} with chunk size {chunk}");
    scan_range(source, start, end, chunk, config.throttle, &mut report).await;

    annotate_timestamps(source, &mut report.events).await;
    report.events.sort_by_key(|event| event.timestamp);
    Ok(report)
}

/// One level of the chunk walk. A "range too large" rejection re-walks the
/// offending sub-range with a tenth of the chunk size; at the minimum size
/// (or on any other failure) the sub-range is skipped and the walk goes on.
fn scan_range<'a, S: EventSource>(
    source: &'a S,
    from: u64,
    to: u64,
    chunk: u64,
    throttle: Duration,
    report: &'a mut ScanReport,
) -> Pin<Box<dyn Future<Output = ()> + 'a>> {
    Box::pin(async move {
        let mut pos = from;
        while pos <= to {
            let chunk_end = min(pos.saturating_add(chunk - 1), to);
            match fetch_chunk(source, pos, chunk_end).await {
                Ok(mut records) => {
                    report.events.append(&mut records);
                    tokio::time::sleep(throttle).await;
                }
                Err(SourceError::RangeTooLarge) if chunk > MIN_CHUNK_SIZE => {
                    let reduced = (chunk / 10).max(MIN_CHUNK_SIZE);
                    debug!(
                        "blocks {pos}..={chunk_end}: range too large, retrying with chunk size {reduced}"
                    );
                    scan_range(source, pos, chunk_end, reduced, throttle, report).await;
                }
                Err(err) => {
                    warn!("skipping blocks {pos}..={chunk_end}: {err}");
                    report.skipped.push((pos, chunk_end));
                }
            }
            match chunk_end.checked_add(1) {
                Some(next) => pos = next,
                None => break,
            }
        }
    })
}

/// Both event kinds over one sub-range. Either query failing fails the
/// chunk as a whole so the retry policy sees a single outcome.
async fn fetch_chunk<S: EventSource>(
    source: &S,
    from: u64,
    to: u64,
) -> Result<Vec<TransferRecord>, SourceError> {
    let mut records = source.transfers(TransferKind::Single, from, to).await?;
    records.extend(source.transfers(TransferKind::Batch, from, to).await?);
    Ok(records)
}

/// Fills in block timestamps, querying each block at most once. A block
/// whose timestamp cannot be fetched keeps timestamp zero; losing the
/// annotation is not worth losing the record.
async fn annotate_timestamps<S: EventSource>(source: &S, events: &mut [TransferRecord]) {
    let mut cache: HashMap<u64, u64> = HashMap::new();
    for event in events {
        let timestamp = match cache.get(&event.block_number) {
            Some(timestamp) => *timestamp,
            None => {
                let timestamp = match source.block_timestamp(event.block_number).await {
                    Ok(timestamp) => timestamp,
                    Err(err) => {
                        warn!("no timestamp for block {}: {err}", event.block_number);
                        0
                    }
                };
                cache.insert(event.block_number, timestamp);
                timestamp
            }
        };
        event.timestamp = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use std::cell::RefCell;

    /// Synthetic source: events live at fixed blocks, spans wider than
    /// `max_span` blocks are rejected as too large, and every query is
    /// recorded for assertions.
    struct MockSource {
        tip: u64,
        max_span: u64,
        event_blocks: Vec<u64>,
        queries: RefCell<Vec<(u64, u64)>>,
        fail_all: bool,
    }

    impl MockSource {
        fn new(tip: u64, max_span: u64, event_blocks: Vec<u64>) -> Self {
            Self {
                tip,
                max_span,
                event_blocks,
                queries: RefCell::new(Vec::new()),
                fail_all: false,
            }
        }

        fn record_at(block: u64) -> TransferRecord {
            TransferRecord {
                kind: TransferKind::Single,
                block_number: block,
                timestamp: 0,
                operator: Address::with_last_byte(1),
                from: Address::with_last_byte(2),
                to: Address::with_last_byte(3),
                ids: vec![U256::from(1)],
                amounts: vec![U256::from(5)],
                tx_hash: None,
            }
        }
    }

    impl EventSource for MockSource {
        async fn tip(&self) -> Result<u64, SourceError> {
            Ok(self.tip)
        }

        async fn transfers(
            &self,
            kind: TransferKind,
            from: u64,
            to: u64,
        ) -> Result<Vec<TransferRecord>, SourceError> {
            self.queries.borrow_mut().push((from, to));
            if self.fail_all {
                return Err(SourceError::Other("synthetic outage".into()));
            }
            if to - from + 1 > self.max_span {
                return Err(SourceError::RangeTooLarge);
            }
            if kind == TransferKind::Batch {
                return Ok(vec![]);
            }
            Ok(self
                .event_blocks
                .iter()
                .filter(|block| (from..=to).contains(block))
                .map(|block| Self::record_at(*block))
                .collect())
        }

        async fn block_timestamp(&self, number: u64) -> Result<u64, SourceError> {
            Ok(number * 10)
        }
    }

    fn fast_config() -> ScanConfig {
        ScanConfig {
            from_block: Some(0),
            to_block: None,
            throttle: Duration::ZERO,
            ..ScanConfig::default()
        }
    }

    #[tokio::test]
    async fn splits_down_to_an_accepted_span() {
        // The source rejects anything over 20 blocks; a 100-block scan at
        // chunk size 100 must still find every event.
        let source = MockSource::new(99, 20, vec![3, 42, 77, 99]);
        let report = scan(&source, &fast_config()).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.events.len(), 4);
        let blocks: Vec<u64> = report.events.iter().map(|e| e.block_number).collect();
        assert_eq!(blocks, vec![3, 42, 77, 99]);

        // Every accepted query stayed within the span the source allows.
        let accepted = source
            .queries
            .borrow()
            .iter()
            .filter(|(from, to)| to - from + 1 <= 20)
            .count();
        assert!(accepted > 0);
    }

    #[tokio::test]
    async fn events_come_back_time_ordered() {
        let source = MockSource::new(99, 100, vec![90, 5, 60]);
        let report = scan(&source, &fast_config()).await.unwrap();
        let timestamps: Vec<u64> = report.events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![50, 600, 900]);
    }

    #[tokio::test]
    async fn default_range_is_a_bounded_recent_window() {
        let source = MockSource::new(100_500, 1_000, vec![100, 100_450]);
        let config = ScanConfig {
            lookback: 500,
            throttle: Duration::ZERO,
            ..ScanConfig::default()
        };
        let report = scan(&source, &config).await.unwrap();

        // Only the event inside [tip - lookback, tip] is visible.
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].block_number, 100_450);
        assert!(source.queries.borrow().iter().all(|(from, _)| *from >= 100_000));
    }

    #[tokio::test]
    async fn persistent_rejection_skips_but_terminates() {
        // Even the minimum chunk size is over this source's span cap, so
        // every sub-range ends up skipped, and the scan still finishes.
        let source = MockSource::new(99, 5, vec![10, 50]);
        let report = scan(&source, &fast_config()).await.unwrap();

        assert!(report.events.is_empty());
        assert!(!report.is_complete());
        let covered: u64 = report
            .skipped
            .iter()
            .map(|(from, to)| to - from + 1)
            .sum();
        assert_eq!(covered, 100);
    }

    #[tokio::test]
    async fn unclassified_failures_are_skipped_not_raised() {
        let mut source = MockSource::new(99, 100, vec![10]);
        source.fail_all = true;
        let report = scan(&source, &fast_config()).await.unwrap();

        assert!(report.events.is_empty());
        assert_eq!(report.skipped, vec![(0, 99)]);
    }

    #[tokio::test]
    async fn rejects_inverted_ranges() {
        let source = MockSource::new(99, 100, vec![]);
        let config = ScanConfig {
            from_block: Some(50),
            to_block: Some(10),
            ..ScanConfig::default()
        };
        let err = scan(&source, &config).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRange { start: 50, end: 10 }));
    }

    #[tokio::test]
    async fn ties_keep_retrieval_order() {
        // Two events in the same block share a timestamp; the one
        // retrieved first stays first.
        let source = MockSource::new(9, 100, vec![4, 4]);
        let report = scan(&source, &fast_config()).await.unwrap();
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].timestamp, report.events[1].timestamp);
    }
}
