// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Parcel: an ERC-1155 style multi-token collection with a USDC treasury.
//!
//! The collection keeps a capped-supply token record per id and a treasury
//! of USDC used for two owner-driven flows: `payback` (burn tokens in
//! exchange for USDC) and `pay_dividend` (USDC with no burn). The ledger
//! surface lives in [`erc1155`], the treasury in [`treasury`]; this module
//! wires both into the entrypoint and applies the owner authorization
//! rules.

// Only run this as a WASM if the export-abi feature is not set.
#![cfg_attr(not(any(feature = "export-abi", test)), no_main)]
extern crate alloc;

pub mod erc1155;
pub mod errors;
pub mod treasury;
pub mod uri;

use alloc::string::String;
use alloc::vec::Vec;
use alloy_primitives::{Address, U256};
use stylus_sdk::{evm, prelude::*};

use crate::erc1155::{BaseUriUpdated, Erc1155};
use crate::errors::{CollectionError, InvalidArgument, Unauthorized};
use crate::treasury::{DividendPaid, FundsWithdrawn, Payback, Treasury};

sol_storage! {
    /// The collection entrypoint: token ledger, treasury, and the mutable
    /// collection-level metadata.
    #[entrypoint]
    pub struct ParcelCollection {
        /// Allows erc1155 to access ParcelCollection's storage and make calls
        #[borrow]
        Erc1155 erc1155;
        /// Allows treasury to access ParcelCollection's storage and make calls
        #[borrow]
        Treasury treasury;
        /// The single authorized administrator
        address owner;
        /// Collection display name
        string name;
        /// Collection symbol
        string symbol;
        /// Collection-level metadata URI
        string contract_uri;
    }
}

impl ParcelCollection {
    fn require_owner(&self) -> Result<(), CollectionError> {
        let caller = self.vm().msg_sender();
        if caller != self.owner.get() {
            return Err(CollectionError::Unauthorized(Unauthorized { caller }));
        }
        Ok(())
    }
}

#[public]
#[inherit(Erc1155)]
impl ParcelCollection {
    /// Sets the deployer as owner and records the stable-coin contract and
    /// the initial metadata URI template.
    #[constructor]
    pub fn constructor(&mut self, usdc: Address, base_uri: String) {
        // Use tx_origin instead of msg_sender because we use a factory contract in deployment.
        self.owner.set(self.vm().tx_origin());
        self.treasury.init(usdc);
        self.erc1155.base_uri.set_str(&base_uri);
    }

    pub fn owner(&self) -> Address {
        self.owner.get()
    }

    /// Hands the owner role to `new_owner`.
    pub fn transfer_ownership(&mut self, new_owner: Address) -> Result<(), CollectionError> {
        self.require_owner()?;
        if new_owner.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        self.owner.set(new_owner);
        Ok(())
    }

    /// Mutable collection name.
    pub fn name(&self) -> String {
        self.name.get_string()
    }

    /// Mutable collection symbol.
    pub fn symbol(&self) -> String {
        self.symbol.get_string()
    }

    /// Collection-level metadata URI.
    #[selector(name = "contractURI")]
    pub fn contract_uri(&self) -> String {
        self.contract_uri.get_string()
    }

    /// The metadata URI template tokens resolve against.
    pub fn base_uri(&self) -> String {
        self.erc1155.base_uri.get_string()
    }

    pub fn set_name(&mut self, name: String) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.name.set_str(&name);
        Ok(())
    }

    pub fn set_symbol(&mut self, symbol: String) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.symbol.set_str(&symbol);
        Ok(())
    }

    pub fn set_contract_uri(&mut self, contract_uri: String) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.contract_uri.set_str(&contract_uri);
        Ok(())
    }

    /// Replaces the URI template every token id resolves against.
    pub fn set_base_uri(&mut self, base_uri: String) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.erc1155.base_uri.set_str(&base_uri);
        evm::log(self.vm(), BaseUriUpdated { value: base_uri });
        Ok(())
    }

    /// Creates a new token record with a hard supply cap.
    pub fn create_token(
        &mut self,
        id: U256,
        name: String,
        description: String,
        max_supply: U256,
    ) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.erc1155.create(id, name, description, max_supply)
    }

    /// Mints `amount` of `id` to `to`, bounded by the token's cap.
    pub fn mint(&mut self, to: Address, id: U256, amount: U256) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.erc1155.mint_to(to, id, amount)
    }

    /// Mints several (id, amount) pairs to `to`; rejects the whole batch if
    /// any pair fails validation.
    pub fn mint_batch(
        &mut self,
        to: Address,
        ids: Vec<U256>,
        amounts: Vec<U256>,
    ) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.erc1155.mint_batch_to(to, ids, amounts)
    }

    /// Burns `amount` of `id` from `from`. Callable by the holder, an
    /// approved operator of the holder, or the contract owner.
    pub fn burn(&mut self, from: Address, id: U256, amount: U256) -> Result<(), CollectionError> {
        let caller = self.vm().msg_sender();
        if caller != self.owner.get() && !self.erc1155.is_authorized_for(from, caller) {
            return Err(CollectionError::Unauthorized(Unauthorized { caller }));
        }
        self.erc1155.burn_from(from, id, amount)
    }

    /// Rewrites a token's display metadata. Supply fields are untouched.
    pub fn update_token_info(
        &mut self,
        id: U256,
        name: String,
        description: String,
    ) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.erc1155.update_info(id, name, description)
    }

    /// Token record as `(name, description, max_supply, current_supply, active)`.
    pub fn get_token_info(
        &self,
        id: U256,
    ) -> Result<(String, String, U256, U256, bool), CollectionError> {
        self.erc1155.token_info(id)
    }

    /// The external stable-coin contract address.
    pub fn usdc(&self) -> Address {
        self.treasury.usdc_address()
    }

    /// Live treasury balance, read from the stable-coin ledger.
    pub fn get_balance(&self) -> Result<U256, CollectionError> {
        self.treasury.balance()
    }

    /// Pulls `amount` USDC from the caller into the treasury. The caller
    /// must have approved the contract for at least `amount` beforehand.
    pub fn add_funds(&mut self, amount: U256) -> Result<(), CollectionError> {
        if amount.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        let from = self.vm().msg_sender();
        Treasury::deposit(self, from, amount)
    }

    /// Sends `amount` of treasury USDC to the owner.
    pub fn withdraw(&mut self, amount: U256) -> Result<(), CollectionError> {
        self.require_owner()?;
        if amount.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        self.treasury.require_funds(amount)?;
        let to = self.owner.get();
        Treasury::pay(self, to, amount)?;
        evm::log(self.vm(), FundsWithdrawn { to, amount });
        Ok(())
    }

    /// Buys back `token_amount` of `id` from `from` for `usdc_amount`:
    /// the tokens are burned and the USDC paid out within one call, so
    /// neither effect is observable without the other.
    pub fn payback(
        &mut self,
        from: Address,
        id: U256,
        token_amount: U256,
        usdc_amount: U256,
    ) -> Result<(), CollectionError> {
        self.require_owner()?;
        self.erc1155.require_active(id)?;
        if token_amount.is_zero() || usdc_amount.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        self.treasury.require_funds(usdc_amount)?;
        self.erc1155.burn_from(from, id, token_amount)?;
        Treasury::pay(self, from, usdc_amount)?;
        evm::log(
            self.vm(),
            Payback {
                holder: from,
                id,
                token_amount,
                usdc_amount,
            },
        );
        Ok(())
    }

    /// Sends `usdc_amount` of treasury USDC to `to` with no burn attached.
    pub fn pay_dividend(&mut self, to: Address, usdc_amount: U256) -> Result<(), CollectionError> {
        self.require_owner()?;
        if to.is_zero() || usdc_amount.is_zero() {
            return Err(CollectionError::InvalidArgument(InvalidArgument {}));
        }
        self.treasury.require_funds(usdc_amount)?;
        Treasury::pay(self, to, usdc_amount)?;
        evm::log(
            self.vm(),
            DividendPaid {
                to,
                amount: usdc_amount,
            },
        );
        Ok(())
    }
}
