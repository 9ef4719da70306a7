// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Deployment bookkeeping.
//!
//! One JSON document, keyed by network name, recording where and when the
//! collection contract was deployed. The surrounding scripts read it to
//! find the contract without pasting addresses around.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: Address,
    pub network: String,
    /// Unix seconds at the time the record was written.
    pub deployed_at: u64,
}

/// The deployment file, network name to record.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments {
    records: BTreeMap<String, DeploymentRecord>,
}

impl Deployments {
    /// Reads the file at `path`; a missing file is an empty record set.
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

    /// Records (or overwrites) the deployment for `network`.
    pub fn record(&mut self, network: impl Into<String>, address: Address) {
        let network = network.into();
        let deployed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.records.insert(
            network.clone(),
            DeploymentRecord {
                address,
                network,
                deployed_at,
            },
        );
    }

    pub fn get(&self, network: &str) -> Result<&DeploymentRecord> {
        self.records
            .get(network)
            .ok_or_else(|| Error::UnknownDeployment(network.into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeploymentRecord)> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        let mut deployments = Deployments::load(&path).unwrap();
        deployments.record("arbitrum-sepolia", Address::with_last_byte(0x42));
        deployments.save(&path).unwrap();

        let reloaded = Deployments::load(&path).unwrap();
        let record = reloaded.get("arbitrum-sepolia").unwrap();
        assert_eq!(record.address, Address::with_last_byte(0x42));
        assert_eq!(record.network, "arbitrum-sepolia");
        assert!(record.deployed_at > 0);
    }

    #[test]
    fn unknown_network_is_an_error() {
        let deployments = Deployments::default();
        assert!(matches!(
            deployments.get("mainnet"),
            Err(Error::UnknownDeployment(_))
        ));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let deployments = Deployments::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(deployments.iter().count(), 0);
    }
}
