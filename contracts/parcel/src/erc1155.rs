// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Implementation of the ERC-1155 style multi-token ledger.
//!
//! The eponymous [`Erc1155`] type keeps one [`TokenInfo`] record per token
//! id next to the holder balances, and is intended to be inherited by the
//! collection entrypoint. Token records carry a hard supply cap: minting
//! past `max_supply` is rejected, and `current_supply` always equals the sum
//! of holder balances for that id.
//!
//! Creation, minting and burning are deliberately *not* part of the
//! `#[public]` surface here; the entrypoint gates them behind its owner
//! checks and calls the crate-internal methods.

use alloc::{string::String, vec::Vec};
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_sol_types::sol;
use core::borrow::{Borrow, BorrowMut};
use stylus_sdk::{abi::Bytes, evm, prelude::*, stylus_core::calls::Call};

use crate::errors::{
    AlreadyExists, CollectionError, InsufficientBalance, InvalidArgument, LengthMismatch,
    NotFound, ReceiverRefused, SupplyExceeded, Unauthorized,
};
use crate::uri::replace_id_placeholder;

sol_storage! {
    /// Metadata and supply bounds for a single token id. `active` is set
    /// exactly once, at creation, and never unset.
    pub struct TokenInfo {
        string name;
        string description;
        uint256 max_supply;
        uint256 current_supply;
        bool active;
    }

    /// Erc1155 implements the multi-token ledger shared by all token ids.
    pub struct Erc1155 {
        /// Token id to record map
        mapping(uint256 => TokenInfo) tokens;
        /// Token id to holder balances map
        mapping(uint256 => mapping(address => uint256)) balances;
        /// Holder to operator map (the operator can move all of the holder's tokens)
        mapping(address => mapping(address => bool)) operator_approvals;
        /// Metadata URI template containing the `{id}` placeholder
        string base_uri;
    }
}

// Declare events
sol! {
    event TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value);
    event TransferBatch(address indexed operator, address indexed from, address indexed to, uint256[] ids, uint256[] values);
    event ApprovalForAll(address indexed account, address indexed operator, bool approved);
    event BaseUriUpdated(string value);
    event TokenCreated(uint256 indexed id, string name, uint256 max_supply);
    event TokenInfoUpdated(uint256 indexed id);
}

// External interfaces
sol_interface! {
    /// Acceptance hooks contracts implement to receive multi-token transfers.
    interface IERC1155TokenReceiver {
        function onERC1155Received(address operator, address from, uint256 id, uint256 value, bytes data) external returns (bytes4);
        function onERC1155BatchReceived(address operator, address from, uint256[] ids, uint256[] values, bytes data) external returns (bytes4);
    }
}

/// Selector returned by `onERC1155Received` on acceptance.
const ERC1155_RECEIVED_ID: u32 = 0xf23a6e61;
/// Selector returned by `onERC1155BatchReceived` on acceptance.
const ERC1155_BATCH_RECEIVED_ID: u32 = 0xbc197c81;

// These methods aren't exposed to other contracts. The entrypoint applies
// its authorization rules before calling them.
impl Erc1155 {
    /// Inserts a new token record. The id must be unused and the cap nonzero.
    pub fn create(
        &mut self,
        id: U256,
        name: String,
        description: String,
        max_supply: U256,
    ) -> Result<(), CollectionError> {
        if max_supply.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        if self.tokens.getter(id).active.get() {
            return Err(CollectionError::AlreadyExists(AlreadyExists { id }));
        }
        let mut record = self.tokens.setter(id);
        record.name.set_str(&name);
        record.description.set_str(&description);
        record.max_supply.set(max_supply);
        record.current_supply.set(U256::ZERO);
        record.active.set(true);
        evm::log(
            self.vm(),
            TokenCreated {
                id,
                name,
                max_supply,
            },
        );
        Ok(())
    }

    /// Rewrites a token's display metadata, leaving the supply fields alone.
    pub fn update_info(
        &mut self,
        id: U256,
        name: String,
        description: String,
    ) -> Result<(), CollectionError> {
        self.require_active(id)?;
        let mut record = self.tokens.setter(id);
        record.name.set_str(&name);
        record.description.set_str(&description);
        evm::log(self.vm(), TokenInfoUpdated { id });
        Ok(())
    }

    /// Reads a token record as `(name, description, max_supply, current_supply, active)`.
    pub fn token_info(
        &self,
        id: U256,
    ) -> Result<(String, String, U256, U256, bool), CollectionError> {
        self.require_active(id)?;
        let record = self.tokens.getter(id);
        Ok((
            record.name.get_string(),
            record.description.get_string(),
            record.max_supply.get(),
            record.current_supply.get(),
            record.active.get(),
        ))
    }

    /// Errors with `NotFound` unless `id` has been created.
    pub fn require_active(&self, id: U256) -> Result<(), CollectionError> {
        if !self.tokens.getter(id).active.get() {
            return Err(CollectionError::NotFound(NotFound { id }));
        }
        Ok(())
    }

    /// Whether `operator` may move `holder`'s tokens.
    pub fn is_authorized_for(&self, holder: Address, operator: Address) -> bool {
        holder == operator || self.operator_approvals.getter(holder).get(operator)
    }

    /// Mints `amount` of `id` to `to`, bounded by the token's supply cap.
    pub fn mint_to(&mut self, to: Address, id: U256, amount: U256) -> Result<(), CollectionError> {
        self.require_active(id)?;
        self.checked_supply_increase(id, amount)?;
        self.credit(to, id, amount);
        let operator = self.vm().msg_sender();
        evm::log(
            self.vm(),
            TransferSingle {
                operator,
                from: Address::ZERO,
                to,
                id,
                value: amount,
            },
        );
        Ok(())
    }

    /// Mints several (id, amount) pairs to `to` as a unit. Every pair is
    /// validated against the ledger before the first balance is touched, so
    /// a bad pair rejects the entire batch.
    pub fn mint_batch_to(
        &mut self,
        to: Address,
        ids: Vec<U256>,
        amounts: Vec<U256>,
    ) -> Result<(), CollectionError> {
        if ids.len() != amounts.len() {
            return Err(CollectionError::LengthMismatch(LengthMismatch {
                ids_length: U256::from(ids.len()),
                values_length: U256::from(amounts.len()),
            }));
        }
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            self.require_active(*id)?;
            let record = self.tokens.getter(*id);
            let headroom = record.max_supply.get() - record.current_supply.get();
            if *amount > headroom {
                return Err(CollectionError::SupplyExceeded(SupplyExceeded {
                    id: *id,
                    have: headroom,
                    want: *amount,
                }));
            }
        }
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            // Revalidated so repeated ids within one batch cannot slip past
            // the cap; a failure here reverts the whole call.
            self.checked_supply_increase(*id, *amount)?;
            self.credit(to, *id, *amount);
        }
        let operator = self.vm().msg_sender();
        evm::log(
            self.vm(),
            TransferBatch {
                operator,
                from: Address::ZERO,
                to,
                ids,
                values: amounts,
            },
        );
        Ok(())
    }

    /// Burns `amount` of `id` held by `from`, shrinking current supply.
    pub fn burn_from(
        &mut self,
        from: Address,
        id: U256,
        amount: U256,
    ) -> Result<(), CollectionError> {
        self.require_active(id)?;
        self.debit(from, id, amount)?;
        let mut record = self.tokens.setter(id);
        let supply = record.current_supply.get();
        record.current_supply.set(supply - amount);
        let operator = self.vm().msg_sender();
        evm::log(
            self.vm(),
            TransferSingle {
                operator,
                from,
                to: Address::ZERO,
                id,
                value: amount,
            },
        );
        Ok(())
    }

    /// Movement of tokens between two holders. Authorization is the
    /// caller's responsibility.
    fn do_transfer(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        id: U256,
        amount: U256,
    ) -> Result<(), CollectionError> {
        self.require_active(id)?;
        self.debit(from, id, amount)?;
        self.credit(to, id, amount);
        evm::log(
            self.vm(),
            TransferSingle {
                operator,
                from,
                to,
                id,
                value: amount,
            },
        );
        Ok(())
    }

    fn checked_supply_increase(&mut self, id: U256, amount: U256) -> Result<(), CollectionError> {
        let mut record = self.tokens.setter(id);
        let supply = record.current_supply.get();
        let max = record.max_supply.get();
        let exceeded = CollectionError::SupplyExceeded(SupplyExceeded {
            id,
            have: max - supply,
            want: amount,
        });
        let new_supply = supply.checked_add(amount).ok_or(exceeded)?;
        if new_supply > max {
            return Err(CollectionError::SupplyExceeded(SupplyExceeded {
                id,
                have: max - supply,
                want: amount,
            }));
        }
        record.current_supply.set(new_supply);
        Ok(())
    }

    fn credit(&mut self, to: Address, id: U256, amount: U256) {
        let mut holders = self.balances.setter(id);
        let mut balance = holders.setter(to);
        let new_balance = balance.get() + amount;
        balance.set(new_balance);
    }

    fn debit(&mut self, from: Address, id: U256, amount: U256) -> Result<(), CollectionError> {
        let mut holders = self.balances.setter(id);
        let mut balance = holders.setter(from);
        let old_balance = balance.get();
        if old_balance < amount {
            return Err(CollectionError::InsufficientBalance(InsufficientBalance {
                from,
                have: old_balance,
                want: amount,
            }));
        }
        balance.set(old_balance - amount);
        Ok(())
    }

    /// Calls the single-transfer acceptance hook when `to` is a contract.
    fn call_receiver<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        operator: Address,
        from: Address,
        to: Address,
        id: U256,
        amount: U256,
        data: Vec<u8>,
    ) -> Result<(), CollectionError> {
        if storage.borrow().vm().code_size(to) == 0 {
            return Ok(());
        }
        let receiver = IERC1155TokenReceiver::new(to);
        let context = Call::new_mutating(storage);
        let returned = receiver
            .on_erc_1155_received(
                storage.borrow_mut().vm(),
                context,
                operator,
                from,
                id,
                amount,
                data.into(),
            )
            .map_err(|_e| {
                CollectionError::ReceiverRefused(ReceiverRefused {
                    receiver: to,
                    returned: FixedBytes(0_u32.to_be_bytes()),
                })
            })?
            .0;
        if u32::from_be_bytes(returned) != ERC1155_RECEIVED_ID {
            return Err(CollectionError::ReceiverRefused(ReceiverRefused {
                receiver: to,
                returned: FixedBytes(returned),
            }));
        }
        Ok(())
    }

    /// Calls the batch acceptance hook when `to` is a contract.
    fn call_batch_receiver<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        operator: Address,
        from: Address,
        to: Address,
        ids: Vec<U256>,
        amounts: Vec<U256>,
        data: Vec<u8>,
    ) -> Result<(), CollectionError> {
        if storage.borrow().vm().code_size(to) == 0 {
            return Ok(());
        }
        let receiver = IERC1155TokenReceiver::new(to);
        let context = Call::new_mutating(storage);
        let returned = receiver
            .on_erc_1155_batch_received(
                storage.borrow_mut().vm(),
                context,
                operator,
                from,
                ids,
                amounts,
                data.into(),
            )
            .map_err(|_e| {
                CollectionError::ReceiverRefused(ReceiverRefused {
                    receiver: to,
                    returned: FixedBytes(0_u32.to_be_bytes()),
                })
            })?
            .0;
        if u32::from_be_bytes(returned) != ERC1155_BATCH_RECEIVED_ID {
            return Err(CollectionError::ReceiverRefused(ReceiverRefused {
                receiver: to,
                returned: FixedBytes(returned),
            }));
        }
        Ok(())
    }
}

// These methods are public to other contracts.
#[public]
impl Erc1155 {
    /// Quantity of `id` held by `account`.
    pub fn balance_of(&self, account: Address, id: U256) -> U256 {
        self.balances.getter(id).get(account)
    }

    /// Batched balance lookup over parallel account/id arrays.
    pub fn balance_of_batch(
        &self,
        accounts: Vec<Address>,
        ids: Vec<U256>,
    ) -> Result<Vec<U256>, CollectionError> {
        if accounts.len() != ids.len() {
            return Err(CollectionError::LengthMismatch(LengthMismatch {
                ids_length: U256::from(ids.len()),
                values_length: U256::from(accounts.len()),
            }));
        }
        Ok(accounts
            .iter()
            .zip(ids.iter())
            .map(|(account, id)| self.balances.getter(*id).get(*account))
            .collect())
    }

    /// Grants or revokes `operator`'s right to move all of the sender's tokens.
    pub fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
    ) -> Result<(), CollectionError> {
        let account = self.vm().msg_sender();
        if operator == account {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        self.operator_approvals
            .setter(account)
            .insert(operator, approved);
        evm::log(
            self.vm(),
            ApprovalForAll {
                account,
                operator,
                approved,
            },
        );
        Ok(())
    }

    /// Whether `operator` may manage all of `account`'s tokens.
    pub fn is_approved_for_all(&self, account: Address, operator: Address) -> bool {
        self.operator_approvals.getter(account).get(operator)
    }

    /// Metadata URI for `id`, resolved from the collection's URI template.
    pub fn uri(&self, id: U256) -> Result<String, CollectionError> {
        self.require_active(id)?;
        Ok(replace_id_placeholder(&self.base_uri.get_string(), id))
    }

    /// Moves `amount` of `id` from `from` to `to`, then checks the
    /// acceptance hook if `to` is a contract.
    pub fn safe_transfer_from<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        from: Address,
        to: Address,
        id: U256,
        amount: U256,
        data: Bytes,
    ) -> Result<(), CollectionError> {
        if to.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        let operator = storage.borrow().vm().msg_sender();
        if !storage.borrow().is_authorized_for(from, operator) {
            return Err(CollectionError::Unauthorized(Unauthorized {
                caller: operator,
            }));
        }
        storage
            .borrow_mut()
            .do_transfer(operator, from, to, id, amount)?;
        Self::call_receiver(storage, operator, from, to, id, amount, data.0)
    }

    /// Batched [`safe_transfer_from`]. All pairs are validated before any
    /// balance moves.
    pub fn safe_batch_transfer_from<S: TopLevelStorage + BorrowMut<Self>>(
        storage: &mut S,
        from: Address,
        to: Address,
        ids: Vec<U256>,
        amounts: Vec<U256>,
        data: Bytes,
    ) -> Result<(), CollectionError> {
        if to.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        if ids.len() != amounts.len() {
            return Err(CollectionError::LengthMismatch(LengthMismatch {
                ids_length: U256::from(ids.len()),
                values_length: U256::from(amounts.len()),
            }));
        }
        let operator = storage.borrow().vm().msg_sender();
        if !storage.borrow().is_authorized_for(from, operator) {
            return Err(CollectionError::Unauthorized(Unauthorized {
                caller: operator,
            }));
        }
        let this = storage.borrow_mut();
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            this.require_active(*id)?;
            let have = this.balances.getter(*id).get(from);
            if have < *amount {
                return Err(CollectionError::InsufficientBalance(InsufficientBalance {
                    from,
                    have,
                    want: *amount,
                }));
            }
        }
        for (id, amount) in ids.iter().zip(amounts.iter()) {
            this.debit(from, *id, *amount)?;
            this.credit(to, *id, *amount);
        }
        evm::log(
            this.vm(),
            TransferBatch {
                operator,
                from,
                to,
                ids: ids.clone(),
                values: amounts.clone(),
            },
        );
        Self::call_batch_receiver(storage, operator, from, to, ids, amounts, data.0)
    }
}
