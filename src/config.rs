// Modern, minimalistic & standard-compliant cold wallet library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2020-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2020-2024 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2020-2024 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Caravan-style JSON wallet configuration files.

use std::str::FromStr;

use derive::{
    DerivationIndex, DerivationPath, HardenedIndex, Keychain, Network, Terminal, XpubFp,
};
use descriptors::ScriptType;

use crate::batch::BIP48_PURPOSE;
use crate::{
    Bip48Options, BuildOptions, CoinType, DerivedMultisig, MultisigContext, MultisigDeriver,
    MultisigError, MultisigResult,
};

/// Wallet client description; informational only.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate")]
pub struct WalletClient {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Signing quorum.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct Quorum {
    pub required_signers: usize,
    pub total_signers: usize,
}

/// Extended public key of a single cosigner.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct CosignerKey {
    pub name: String,
    /// Account derivation path from the cosigner master key.
    #[serde(rename = "bip32Path", default, skip_serializing_if = "Option::is_none")]
    pub bip32_path: Option<String>,
    /// Account-level key; SLIP-132 prefixes are accepted.
    pub xpub: String,
    /// Master key fingerprint, as 8 hex characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xfp: Option<XpubFp>,
}

impl CosignerKey {
    /// Parses the account derivation path, if present.
    pub fn path(&self) -> Result<Option<DerivationPath>, MultisigError> {
        self.bip32_path
            .as_deref()
            .map(|path| {
                DerivationPath::from_str(path).map_err(|err| {
                    MultisigError::InvalidConfig(format!("cosigner '{}' - {err}", self.name))
                })
            })
            .transpose()
    }
}

/// Multisig wallet configuration in the format of the Caravan coordinator.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct WalletConfig {
    pub name: String,
    pub address_type: ScriptType,
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<WalletClient>,
    pub quorum: Quorum,
    pub extended_public_keys: Vec<CosignerKey>,
    #[serde(default)]
    pub starting_address_index: u32,
}

impl FromStr for WalletConfig {
    type Err = MultisigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_json(s) }
}

impl WalletConfig {
    /// Parses and validates a JSON wallet configuration.
    pub fn from_json(json: &str) -> Result<Self, MultisigError> {
        let config: WalletConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, MultisigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the quorum against the key list and the key paths against the
    /// address type and the network.
    pub fn validate(&self) -> Result<(), MultisigError> {
        let Quorum {
            required_signers,
            total_signers,
        } = self.quorum;
        let keys = self.extended_public_keys.len();
        if total_signers != keys {
            return Err(MultisigError::InvalidConfig(format!(
                "quorum lists {total_signers} signers while {keys} extended public keys are given"
            )));
        }
        if required_signers == 0 || required_signers > total_signers {
            return Err(MultisigError::InvalidConfig(format!(
                "quorum of {required_signers} out of {total_signers} signers is inconsistent"
            )));
        }

        for key in &self.extended_public_keys {
            let Some(path) = key.path()? else { continue };
            let Some(bip48) = bip48_segments(&path) else { continue };
            if bip48.script_type != self.address_type.bip48_index() {
                return Err(MultisigError::InvalidConfig(format!(
                    "cosigner '{}' path {path:#} doesn't match {} address type",
                    key.name, self.address_type
                )));
            }
            if bip48.coin_type != CoinType::with(self.network).index() {
                return Err(MultisigError::InvalidConfig(format!(
                    "cosigner '{}' path {path:#} doesn't match {} network",
                    key.name, self.network
                )));
            }
        }
        Ok(())
    }

    /// Options for building addresses of this wallet.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::default()
            .with_network(self.network)
            .with_script_type(self.address_type)
    }

    /// BIP-48 options taken from the first cosigner with a BIP-48 path; the
    /// account defaults to `0'` otherwise.
    pub fn bip48_options(&self) -> Bip48Options {
        let account = self
            .extended_public_keys
            .iter()
            .filter_map(|key| key.path().ok().flatten())
            .find_map(|path| bip48_segments(&path))
            .map(|bip48| bip48.account)
            .unwrap_or(HardenedIndex::hardened(0));
        Bip48Options {
            account,
            script_type: self.address_type,
            coin_type: CoinType::with(self.network),
        }
    }

    /// Validated deriver over the wallet keys.
    pub fn deriver<'ctx>(
        &self,
        ctx: &'ctx MultisigContext,
    ) -> Result<MultisigDeriver<'ctx>, MultisigError> {
        self.validate()?;
        let xpubs = self
            .extended_public_keys
            .iter()
            .map(|key| key.xpub.as_str())
            .collect::<Vec<_>>();
        MultisigDeriver::new(ctx, self.quorum.required_signers, &xpubs, &self.build_options())
    }

    /// Derives the wallet output at the given terminal.
    pub fn derive(
        &self,
        ctx: &MultisigContext,
        terminal: Terminal,
    ) -> Result<MultisigResult, MultisigError> {
        self.deriver(ctx)?.derive(terminal)
    }

    /// Derives `count` outputs of the keychain starting from the wallet
    /// starting address index.
    pub fn derive_range(
        &self,
        ctx: &MultisigContext,
        keychain: Keychain,
        count: u32,
    ) -> Result<Vec<DerivedMultisig>, MultisigError> {
        self.deriver(ctx)?
            .range(keychain, self.starting_address_index, count, &self.bip48_options())?
            .collect()
    }
}

struct Bip48Segments {
    coin_type: HardenedIndex,
    account: HardenedIndex,
    script_type: HardenedIndex,
}

fn bip48_segments(path: &DerivationPath) -> Option<Bip48Segments> {
    let hardened = |index: &DerivationIndex| match index {
        DerivationIndex::Hardened(index) => Some(*index),
        DerivationIndex::Normal(_) => None,
    };
    match path.as_slice() {
        [purpose, coin_type, account, script_type, ..] if hardened(purpose)? == BIP48_PURPOSE => {
            Some(Bip48Segments {
                coin_type: hardened(coin_type)?,
                account: hardened(account)?,
                script_type: hardened(script_type)?,
            })
        }
        _ => None,
    }
}
