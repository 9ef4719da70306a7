// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Operator tooling for the Parcel collection.
//!
//! The collection contract emits standard ERC-1155 transfer events; this
//! crate reconstructs that history over plain range-limited RPC queries
//! (no indexing service required), derives summary statistics from it, and
//! keeps the small JSON documents the surrounding scripts use for
//! deployment bookkeeping and named wallets.

pub mod aggregate;
pub mod deployments;
pub mod events;
pub mod scanner;
pub mod wallets;

pub(crate) mod error;

pub use error::{Error, Result};
