// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("event source error: {0}")]
    Source(String),

    #[error("invalid block range: start {start} is past end {end}")]
    InvalidRange { start: u64, end: u64 },
    #[error("not a wallet name or address: {0}")]
    UnknownWallet(String),
    #[error("no deployment recorded for network: {0}")]
    UnknownDeployment(String),
}
