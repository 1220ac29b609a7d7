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

use std::str::FromStr;

use crate::AddressNetwork;

/// Bitcoin network used for presenting addresses.
///
/// Signet has no key versions or address prefixes of its own: it re-uses the
/// testnet ones, so it can't be detected from key material and must be
/// requested explicitly.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[display(lowercase)]
pub enum Network {
    /// Bitcoin mainnet
    #[cfg_attr(feature = "serde", serde(alias = "bitcoin"))]
    Mainnet,

    /// Bitcoin testnet3
    #[cfg_attr(feature = "serde", serde(alias = "testnet3"))]
    Testnet,

    /// Bitcoin signet
    Signet,
}

impl Network {
    /// Detects whether the network is a kind of test network (testnet,
    /// signet).
    pub fn is_testnet(self) -> bool { self != Self::Mainnet }

    /// Default presentation network for keys of the given address family.
    pub fn with_family(family: AddressNetwork) -> Self {
        match family {
            AddressNetwork::Mainnet => Network::Mainnet,
            AddressNetwork::Testnet => Network::Testnet,
        }
    }
}

impl From<Network> for AddressNetwork {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => AddressNetwork::Mainnet,
            Network::Testnet | Network::Signet => AddressNetwork::Testnet,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("unknown bitcoin network '{0}'")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "bitcoin" | "mainnet" => Network::Mainnet,
            "testnet" | "testnet3" => Network::Testnet,
            "signet" => Network::Signet,
            _ => return Err(UnknownNetwork(s.to_owned())),
        })
    }
}
