// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Contract-wide error taxonomy.
//!
//! Every externally visible operation reverts with one of these Solidity
//! custom errors. The whole contract shares a single [`CollectionError`]
//! enum so that operations spanning the ledger and the treasury (such as
//! `payback`) revert with a uniform ABI.

use alloy_sol_types::sol;
use stylus_sdk::prelude::*;

sol! {
    // Caller lacks the role a gated operation requires.
    error Unauthorized(address caller);
    // Referenced token id was never created.
    error NotFound(uint256 id);
    // Token id is already in use.
    error AlreadyExists(uint256 id);
    // Zero amount, zero address or otherwise malformed input.
    error InvalidArgument();
    // Mint would push current supply past the cap.
    error SupplyExceeded(uint256 id, uint256 have, uint256 want);
    // Holder or treasury lacks the required quantity.
    error InsufficientBalance(address from, uint256 have, uint256 want);
    // Batch array lengths differ.
    error LengthMismatch(uint256 ids_length, uint256 values_length);
    // Receiving contract refused the transfer.
    error ReceiverRefused(address receiver, bytes4 returned);
    // The external stable-coin contract reported a failed transfer.
    error TransferFailed(address token);
}

/// Represents the ways methods may fail.
#[derive(SolidityError)]
pub enum CollectionError {
    Unauthorized(Unauthorized),
    NotFound(NotFound),
    AlreadyExists(AlreadyExists),
    InvalidArgument(InvalidArgument),
    SupplyExceeded(SupplyExceeded),
    InsufficientBalance(InsufficientBalance),
    LengthMismatch(LengthMismatch),
    ReceiverRefused(ReceiverRefused),
    TransferFailed(TransferFailed),
}
