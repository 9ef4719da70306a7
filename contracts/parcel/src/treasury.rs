// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! USDC treasury backing buy-backs and dividends.
//!
//! The treasury never caches its balance: every funds check is a live
//! `balanceOf` static call against the stable-coin contract, so external
//! deposits made with a plain ERC-20 `transfer` are spendable immediately.
//! All outbound movements verify funds before transferring.

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use core::borrow::{Borrow, BorrowMut};
use stylus_sdk::{evm, prelude::*, stylus_core::calls::Call};

use crate::errors::{CollectionError, InsufficientBalance, TransferFailed};

sol_storage! {
    /// Treasury holds the address of the external stable-coin ledger.
    pub struct Treasury {
        /// The USDC contract (6-decimal fixed point amounts)
        address usdc;
    }
}

// Declare events
sol! {
    event FundsDeposited(address indexed from, uint256 amount);
    event FundsWithdrawn(address indexed to, uint256 amount);
    event Payback(address indexed holder, uint256 indexed id, uint256 token_amount, uint256 usdc_amount);
    event DividendPaid(address indexed to, uint256 amount);
}

// External interfaces
sol_interface! {
    /// The slice of the ERC-20 surface the treasury drives.
    interface IErc20 {
        function transfer(address to, uint256 value) external returns (bool);
        function transferFrom(address from, address to, uint256 value) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

impl Treasury {
    /// Records the stable-coin contract address. Called once, at construction.
    pub fn init(&mut self, usdc: Address) {
        self.usdc.set(usdc);
    }

    /// The stable-coin contract address.
    pub fn usdc_address(&self) -> Address {
        self.usdc.get()
    }

    /// Live stable-coin balance held by this contract, read from the
    /// external ledger rather than any cached field.
    pub fn balance(&self) -> Result<U256, CollectionError> {
        let token = self.usdc.get();
        let account = self.vm().contract_address();
        IErc20::new(token)
            .balance_of(self.vm(), Call::new(), account)
            .map_err(|_e| CollectionError::TransferFailed(TransferFailed { token }))
    }

    /// Errors with `InsufficientBalance` unless the treasury holds `amount`.
    pub fn require_funds(&self, amount: U256) -> Result<(), CollectionError> {
        let have = self.balance()?;
        if have < amount {
            let account = self.vm().contract_address();
            return Err(CollectionError::InsufficientBalance(InsufficientBalance {
                from: account,
                have,
                want: amount,
            }));
        }
        Ok(())
    }

    /// Pulls `amount` from `from` into the treasury via `transferFrom`.
    /// The caller must have granted the contract an allowance beforehand.
    pub fn deposit<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        from: Address,
        amount: U256,
    ) -> Result<(), CollectionError> {
        let token = storage.borrow().usdc.get();
        let account = storage.borrow().vm().contract_address();
        let context = Call::new_mutating(storage);
        let ok = IErc20::new(token)
            .transfer_from(storage.borrow_mut().vm(), context, from, account, amount)
            .map_err(|_e| CollectionError::TransferFailed(TransferFailed { token }))?;
        if !ok {
            return Err(CollectionError::TransferFailed(TransferFailed { token }));
        }
        evm::log(storage.borrow().vm(), FundsDeposited { from, amount });
        Ok(())
    }

    /// Sends `amount` of treasury funds to `to`. Funds checks are the
    /// caller's responsibility; a failed or refused ERC-20 transfer reverts
    /// the whole call, so no partial movement survives.
    pub fn pay<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        to: Address,
        amount: U256,
    ) -> Result<(), CollectionError> {
        let token = storage.borrow().usdc.get();
        let context = Call::new_mutating(storage);
        let ok = IErc20::new(token)
            .transfer(storage.borrow_mut().vm(), context, to, amount)
            .map_err(|_e| CollectionError::TransferFailed(TransferFailed { token }))?;
        if !ok {
            return Err(CollectionError::TransferFailed(TransferFailed { token }));
        }
        Ok(())
    }
}
