// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Named wallet address book.
//!
//! A flat JSON map from memorable names to addresses so commands can take
//! `--holder alice` as well as a raw address. Raw addresses always resolve,
//! whatever their casing, because parsing normalizes them.

use std::{collections::BTreeMap, fs, path::Path};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    wallets: BTreeMap<String, Address>,
}

impl AddressBook {
    /// Reads the file at `path`; a missing file is an empty book.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn set(&mut self, name: impl Into<String>, address: Address) {
        self.wallets.insert(name.into(), address);
    }

    /// Turns a raw address or a stored wallet name into an address.
    pub fn resolve(&self, name_or_address: &str) -> Result<Address> {
        if let Ok(address) = name_or_address.parse::<Address>() {
            return Ok(address);
        }
        self.wallets
            .get(name_or_address)
            .copied()
            .ok_or_else(|| Error::UnknownWallet(name_or_address.into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Address)> {
        self.wallets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_raw_addresses() {
        let mut book = AddressBook::default();
        let alice = Address::with_last_byte(0xa1);
        book.set("alice", alice);

        assert_eq!(book.resolve("alice").unwrap(), alice);
        // Raw addresses resolve without an entry, in any casing.
        let raw = "0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF";
        assert_eq!(
            book.resolve(raw).unwrap(),
            book.resolve(&raw.to_lowercase()).unwrap(),
        );
        assert!(matches!(
            book.resolve("bob"),
            Err(Error::UnknownWallet(_))
        ));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");

        let mut book = AddressBook::load(&path).unwrap();
        book.set("deployer", Address::with_last_byte(7));
        book.save(&path).unwrap();

        let reloaded = AddressBook::load(&path).unwrap();
        assert_eq!(reloaded.resolve("deployer").unwrap(), Address::with_last_byte(7));
    }
}
