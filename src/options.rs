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

use derive::{HardenedIndex, Network};
use descriptors::ScriptType;

/// Options of a single multisig derivation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase", default)
)]
pub struct BuildOptions {
    /// Network to present addresses for; inferred from the keys when absent.
    pub network: Option<Network>,

    /// Report single-signature key prefixes as advisories.
    pub strict: bool,

    pub script_type: ScriptType,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            network: None,
            strict: true,
            script_type: ScriptType::P2wsh,
        }
    }
}

impl BuildOptions {
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_script_type(mut self, script_type: ScriptType) -> Self {
        self.script_type = script_type;
        self
    }

    pub fn non_strict(mut self) -> Self {
        self.strict = false;
        self
    }
}

/// BIP-44 coin type used at the second level of BIP-48 paths.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[display(lowercase)]
pub enum CoinType {
    /// `0'`
    Mainnet,

    /// `1'`, shared by all test networks.
    #[default]
    Testnet,
}

impl CoinType {
    pub const fn index(self) -> HardenedIndex {
        match self {
            CoinType::Mainnet => HardenedIndex::hardened(0),
            CoinType::Testnet => HardenedIndex::hardened(1),
        }
    }

    pub const fn with(network: Network) -> Self {
        match network {
            Network::Mainnet => CoinType::Mainnet,
            Network::Testnet | Network::Signet => CoinType::Testnet,
        }
    }
}

/// Parameters of the `m/48'/coin'/account'/script'` BIP-48 account path.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase", default)
)]
pub struct Bip48Options {
    pub account: HardenedIndex,
    pub script_type: ScriptType,
    pub coin_type: CoinType,
}

impl Default for Bip48Options {
    fn default() -> Self {
        Bip48Options {
            account: HardenedIndex::hardened(0),
            script_type: ScriptType::P2wsh,
            coin_type: CoinType::Testnet,
        }
    }
}

#[cfg(test)]
mod test {
    use derive::IdxBase;

    use super::*;

    #[test]
    fn defaults() {
        let options = BuildOptions::default();
        assert!(options.strict);
        assert_eq!(options.network, None);
        assert_eq!(options.script_type, ScriptType::P2wsh);

        let bip48 = Bip48Options::default();
        assert_eq!(bip48.account.child_number(), 0);
        assert_eq!(bip48.coin_type.index(), HardenedIndex::hardened(1));
        assert_eq!(bip48.script_type.bip48_index(), HardenedIndex::hardened(2));
    }

    #[test]
    fn coin_types() {
        assert_eq!(CoinType::with(Network::Mainnet), CoinType::Mainnet);
        assert_eq!(CoinType::with(Network::Signet), CoinType::Testnet);
        assert_eq!(CoinType::Mainnet.index().child_number(), 0);
    }

    #[test]
    fn builder_methods() {
        let options = BuildOptions::default()
            .with_network(Network::Signet)
            .with_script_type(ScriptType::P2shP2wsh)
            .non_strict();
        assert_eq!(options.network, Some(Network::Signet));
        assert_eq!(options.script_type, ScriptType::P2shP2wsh);
        assert!(!options.strict);
    }
}
